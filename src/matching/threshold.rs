//! Default strategy: each source takes its best target unless a stronger claim holds it.

use tracing::debug;

use crate::core::types::MatchMethod;
use crate::matching::claims::ClaimState;
use crate::matching::mapping::Mapping;
use crate::similarity::graph::SimilarityGraph;

/// Resolve each source to its single best surviving target.
///
/// Sources are visited in ascending index. A source whose best target is
/// already held by an equal-or-better claim stays unmapped. A source that
/// strictly beats the current holder takes the target over and the earlier
/// holder is left unmapped; displaced sources are not revisited.
pub(crate) fn resolve(graph: &SimilarityGraph, threshold: f64) -> Mapping {
    let mut claims = ClaimState::new();
    let mut displaced = 0usize;

    for edge in graph.best_per_source_at_least(threshold) {
        let held_at = claims.holder(edge.index_b).map(|holder| holder.score);
        match held_at {
            None => claims.claim(edge),
            Some(score) if score >= edge.score => {}
            Some(_) => {
                claims.release(edge.index_b);
                claims.claim(edge);
                displaced += 1;
            }
        }
    }

    debug!(
        "Threshold pass kept {} pairs ({} displaced)",
        claims.len(),
        displaced
    );
    claims.into_mapping(MatchMethod::Threshold)
}
