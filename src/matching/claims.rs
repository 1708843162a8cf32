use std::collections::{HashMap, HashSet};

use crate::core::types::MatchMethod;
use crate::matching::mapping::Mapping;
use crate::similarity::graph::SimilarityEdge;

/// Claimed source and target indices for the sequential strategies.
///
/// Owned by a single matching run and threaded through its pass, so two runs
/// never share state.
#[derive(Debug, Default)]
pub(crate) struct ClaimState {
    claimed_a: HashSet<usize>,
    /// Target -> the edge that claimed it
    claimed_b: HashMap<usize, SimilarityEdge>,
}

impl ClaimState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Both endpoints still unclaimed
    pub(crate) fn is_free(&self, index_a: usize, index_b: usize) -> bool {
        !self.claimed_a.contains(&index_a) && !self.claimed_b.contains_key(&index_b)
    }

    /// Edge currently holding `index_b`
    pub(crate) fn holder(&self, index_b: usize) -> Option<&SimilarityEdge> {
        self.claimed_b.get(&index_b)
    }

    /// Record `edge` as a match. Callers check [`ClaimState::is_free`] first.
    pub(crate) fn claim(&mut self, edge: SimilarityEdge) {
        debug_assert!(self.is_free(edge.index_a, edge.index_b));
        self.claimed_a.insert(edge.index_a);
        self.claimed_b.insert(edge.index_b, edge);
    }

    /// Drop the claim on `index_b` and free its source
    pub(crate) fn release(&mut self, index_b: usize) -> Option<SimilarityEdge> {
        let edge = self.claimed_b.remove(&index_b)?;
        self.claimed_a.remove(&edge.index_a);
        Some(edge)
    }

    pub(crate) fn len(&self) -> usize {
        self.claimed_b.len()
    }

    pub(crate) fn into_mapping(self, method: MatchMethod) -> Mapping {
        Mapping::from_edges(Some(method), self.claimed_b.into_values())
    }
}
