//! Graph helpers shared by the optimal strategies.

use std::collections::{BTreeMap, BTreeSet};

use crate::similarity::graph::SimilarityEdge;

/// Scores are turned into integers before optimisation so that sums and
/// comparisons are exact. Dice scores of fingerprints up to tens of thousands
/// of bits differ by far more than one part in a billion.
pub(crate) const WEIGHT_SCALE: f64 = 1_000_000_000.0;

/// Integer weight of a score in `[0, 1]`
#[inline]
pub(crate) fn scaled_weight(score: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    {
        (score * WEIGHT_SCALE).round() as i64
    }
}

/// A connected piece of the bipartite graph
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Component {
    /// Dataset-A indices, ascending
    pub sources: Vec<usize>,
    /// Dataset-B indices, ascending
    pub targets: Vec<usize>,
    /// Edges inside the component, in input order
    pub edges: Vec<SimilarityEdge>,
}

/// Split edges into connected components.
///
/// Components are ordered by their smallest source index. Matchings of
/// different components never interact, so each can be optimised alone.
pub(crate) fn connected_components(edges: &[SimilarityEdge]) -> Vec<Component> {
    let sources: BTreeSet<usize> = edges.iter().map(|e| e.index_a).collect();
    let targets: BTreeSet<usize> = edges.iter().map(|e| e.index_b).collect();
    let source_node: BTreeMap<usize, usize> =
        sources.iter().enumerate().map(|(i, &a)| (a, i)).collect();
    let target_node: BTreeMap<usize, usize> = targets
        .iter()
        .enumerate()
        .map(|(i, &b)| (b, sources.len() + i))
        .collect();

    let mut sets = DisjointSets::new(sources.len() + targets.len());
    for edge in edges {
        sets.union(source_node[&edge.index_a], target_node[&edge.index_b]);
    }

    // Sources are visited in ascending order, so the first source seen for a
    // root fixes that component's position.
    let mut slot_of_root: BTreeMap<usize, usize> = BTreeMap::new();
    let mut components: Vec<Component> = Vec::new();
    for (&a, &node) in &source_node {
        let root = sets.find(node);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push(Component {
                sources: Vec::new(),
                targets: Vec::new(),
                edges: Vec::new(),
            });
            components.len() - 1
        });
        components[slot].sources.push(a);
    }
    for (&b, &node) in &target_node {
        let slot = slot_of_root[&sets.find(node)];
        components[slot].targets.push(b);
    }
    for edge in edges {
        let slot = slot_of_root[&sets.find(source_node[&edge.index_a])];
        components[slot].edges.push(*edge);
    }

    components
}

/// Union-find with path halving and union by size
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let (mut rx, mut ry) = (self.find(x), self.find(y));
        if rx == ry {
            return;
        }
        if self.size[rx] < self.size[ry] {
            std::mem::swap(&mut rx, &mut ry);
        }
        self.parent[ry] = rx;
        self.size[rx] += self.size[ry];
    }
}
