use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::core::types::MatchMethod;
use crate::similarity::graph::SimilarityEdge;

/// A target record chosen for some source record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedTarget {
    /// Index into dataset B
    pub index_b: usize,
    /// Similarity score of the pair
    pub score: f64,
}

/// Result of resolving a similarity graph.
///
/// Maps a subset of dataset-A indices to dataset-B indices. Mappings from the
/// four strategies are injective with exactly one target per source. A
/// pass-through mapping (no strategy, top-K graph) may carry several ranked
/// targets per source and may reuse targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Strategy that produced the mapping; `None` for top-K pass-through
    method: Option<MatchMethod>,

    /// Source index -> targets, best first
    links: BTreeMap<usize, Vec<MatchedTarget>>,
}

impl Mapping {
    /// Build a one-target-per-source mapping from chosen edges
    pub(crate) fn from_edges(
        method: Option<MatchMethod>,
        edges: impl IntoIterator<Item = SimilarityEdge>,
    ) -> Self {
        let links = edges
            .into_iter()
            .map(|e| {
                (
                    e.index_a,
                    vec![MatchedTarget {
                        index_b: e.index_b,
                        score: e.score,
                    }],
                )
            })
            .collect();
        Self { method, links }
    }

    pub(crate) fn from_links(
        method: Option<MatchMethod>,
        links: BTreeMap<usize, Vec<MatchedTarget>>,
    ) -> Self {
        Self { method, links }
    }

    #[must_use]
    pub fn method(&self) -> Option<MatchMethod> {
        self.method
    }

    /// Best target for a source, if it was mapped
    #[must_use]
    pub fn get(&self, index_a: usize) -> Option<usize> {
        self.links
            .get(&index_a)
            .and_then(|targets| targets.first())
            .map(|t| t.index_b)
    }

    /// All targets kept for a source, best first
    #[must_use]
    pub fn candidates(&self, index_a: usize) -> &[MatchedTarget] {
        self.links
            .get(&index_a)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, index_a: usize, index_b: usize) -> bool {
        self.candidates(index_a).iter().any(|t| t.index_b == index_b)
    }

    /// Number of mapped source records
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Mapped source indices, ascending
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.links.keys().copied()
    }

    /// `(index_a, targets)` for each mapped source, ascending by `index_a`
    pub fn links(&self) -> impl Iterator<Item = (usize, &[MatchedTarget])> + '_ {
        self.links.iter().map(|(a, t)| (*a, t.as_slice()))
    }

    /// Every `(index_a, index_b)` pair, ascending by `index_a` then rank
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges().map(|e| (e.index_a, e.index_b))
    }

    /// Every mapped pair with its score
    pub fn edges(&self) -> impl Iterator<Item = SimilarityEdge> + '_ {
        self.links.iter().flat_map(|(a, targets)| {
            targets
                .iter()
                .map(move |t| SimilarityEdge::new(*a, t.index_b, t.score))
        })
    }

    /// Sum of the scores of every mapped pair
    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.edges().map(|e| e.score).sum()
    }

    /// Whether any source carries more than one target
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        self.links.values().any(|t| t.len() > 1)
    }

    /// True when every source has one target and no target is shared
    #[must_use]
    pub fn is_injective(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.links.len());
        self.links
            .values()
            .all(|targets| targets.len() == 1 && seen.insert(targets[0].index_b))
    }

    /// Source -> best target, the shape most callers want
    #[must_use]
    pub fn to_index_map(&self) -> BTreeMap<usize, usize> {
        self.links
            .iter()
            .filter_map(|(a, t)| t.first().map(|t| (*a, t.index_b)))
            .collect()
    }
}
