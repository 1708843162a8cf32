//! Optimal strategy on sparse graphs: min-cost flow through a unit network.
//!
//! ```text
//!            cost 0          cost -w(a,b)         cost 0
//!   source ---------> a_i ----------------> b_j ---------> sink
//!            cap 1             cap 1                cap 1
//! ```
//!
//! Successive shortest paths with Dijkstra on reduced costs. Each augmenting
//! path adds one matched pair; augmentation stops once the cheapest path no
//! longer lowers total cost, leaving a maximum-weight matching. Work per path
//! is `O(E log V)`, so sparse graphs stay cheap.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use tracing::debug;

use crate::core::types::MatchMethod;
use crate::matching::mapping::Mapping;
use crate::matching::network::scaled_weight;
use crate::similarity::graph::{SimilarityEdge, SimilarityGraph};

const INF: i64 = i64::MAX / 4;

#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    cap: u32,
    cost: i64,
    /// Position of the paired reverse arc in `adj[to]`
    rev: usize,
    /// Index into the edge list for forward source->target arcs
    edge: Option<usize>,
}

struct FlowNetwork {
    adj: Vec<Vec<Arc>>,
}

impl FlowNetwork {
    fn new(nodes: usize) -> Self {
        Self {
            adj: vec![Vec::new(); nodes],
        }
    }

    fn add_arc(&mut self, from: usize, to: usize, cost: i64, edge: Option<usize>) {
        let rev_from = self.adj[to].len();
        let rev_to = self.adj[from].len();
        self.adj[from].push(Arc {
            to,
            cap: 1,
            cost,
            rev: rev_from,
            edge,
        });
        self.adj[to].push(Arc {
            to: from,
            cap: 0,
            cost: -cost,
            rev: rev_to,
            edge: None,
        });
    }

    /// Shortest reduced-cost distances from `start`, plus the arc used to
    /// reach each node as `(previous node, arc index)`.
    fn dijkstra(&self, start: usize, potential: &[i64]) -> (Vec<i64>, Vec<Option<(usize, usize)>>) {
        let n = self.adj.len();
        let mut dist = vec![INF; n];
        let mut prev = vec![None; n];
        let mut heap = BinaryHeap::new();
        dist[start] = 0;
        heap.push(Reverse((0i64, start)));

        while let Some(Reverse((d, u))) = heap.pop() {
            if d > dist[u] {
                continue;
            }
            for (i, arc) in self.adj[u].iter().enumerate() {
                if arc.cap == 0 {
                    continue;
                }
                let next = d + arc.cost + potential[u] - potential[arc.to];
                if next < dist[arc.to] {
                    dist[arc.to] = next;
                    prev[arc.to] = Some((u, i));
                    heap.push(Reverse((next, arc.to)));
                }
            }
        }

        (dist, prev)
    }
}

/// Maximise the summed score of an injective mapping with min-cost flow.
pub(crate) fn resolve(graph: &SimilarityGraph, threshold: f64) -> Mapping {
    let edges: Vec<SimilarityEdge> = graph.edges_at_least(threshold).copied().collect();

    // Compact node ids: 0 = source, then sources, then targets, then sink
    let mut source_node: BTreeMap<usize, usize> = BTreeMap::new();
    let mut target_node: BTreeMap<usize, usize> = BTreeMap::new();
    for edge in &edges {
        source_node.entry(edge.index_a).or_insert(0);
        target_node.entry(edge.index_b).or_insert(0);
    }
    for (i, node) in source_node.values_mut().enumerate() {
        *node = 1 + i;
    }
    let first_target = 1 + source_node.len();
    for (i, node) in target_node.values_mut().enumerate() {
        *node = first_target + i;
    }
    let source = 0;
    let sink = first_target + target_node.len();

    let mut network = FlowNetwork::new(sink + 1);
    for &node in source_node.values() {
        network.add_arc(source, node, 0, None);
    }
    // Seed potentials with exact initial distances: arc costs are negative,
    // but the network is layered so one pass suffices.
    let mut potential = vec![0i64; sink + 1];
    for (i, edge) in edges.iter().enumerate() {
        let (a, b) = (source_node[&edge.index_a], target_node[&edge.index_b]);
        let cost = -scaled_weight(edge.score);
        network.add_arc(a, b, cost, Some(i));
        potential[b] = potential[b].min(cost);
    }
    for &node in target_node.values() {
        network.add_arc(node, sink, 0, None);
        potential[sink] = potential[sink].min(potential[node]);
    }

    let mut augmentations = 0usize;
    loop {
        let (dist, prev) = network.dijkstra(source, &potential);
        if dist[sink] >= INF {
            break;
        }
        // Nodes unreachable now stay unreachable, so their potentials can lag
        for (p, d) in potential.iter_mut().zip(&dist) {
            if *d < INF {
                *p += d;
            }
        }
        // potential[sink] is now the true cost of the cheapest path
        if potential[sink] > 0 {
            break;
        }

        let mut node = sink;
        while let Some((from, arc_index)) = prev[node] {
            let rev = {
                let arc = &mut network.adj[from][arc_index];
                arc.cap -= 1;
                arc.rev
            };
            network.adj[node][rev].cap += 1;
            node = from;
        }
        augmentations += 1;
    }

    let matched: Vec<SimilarityEdge> = source_node
        .values()
        .flat_map(|&a| network.adj[a].iter())
        .filter(|arc| arc.cap == 0)
        .filter_map(|arc| arc.edge.map(|i| edges[i]))
        .collect();

    debug!(
        "Flow matching over {} edges: {} augmenting paths, {} pairs",
        edges.len(),
        augmentations,
        matched.len()
    );
    Mapping::from_edges(Some(MatchMethod::Weighted), matched)
}
