//! Greedy strategy: accept edges in descending score while both ends are free.

use tracing::debug;

use crate::core::types::MatchMethod;
use crate::matching::claims::ClaimState;
use crate::matching::mapping::Mapping;
use crate::similarity::graph::{SimilarityEdge, SimilarityGraph};

/// Single pass over all surviving edges sorted by descending score, ties by
/// ascending `(index_a, index_b)`. An edge whose source or target is already
/// claimed is dropped for good. At least half the optimal total score.
pub(crate) fn resolve(graph: &SimilarityGraph, threshold: f64) -> Mapping {
    let mut edges: Vec<SimilarityEdge> = graph.edges_at_least(threshold).copied().collect();
    edges.sort_unstable_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| x.index_a.cmp(&y.index_a))
            .then_with(|| x.index_b.cmp(&y.index_b))
    });

    let mut claims = ClaimState::new();
    for edge in edges {
        if claims.is_free(edge.index_a, edge.index_b) {
            claims.claim(edge);
        }
    }

    debug!("Greedy pass kept {} pairs", claims.len());
    claims.into_mapping(MatchMethod::Greedy)
}
