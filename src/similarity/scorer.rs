use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::fingerprint::Fingerprint;
use crate::core::store::{BitLength, FingerprintStore};
use crate::similarity::dice::{dice_coefficient, dice_from_counts, dice_upper_bound};
use crate::similarity::graph::{GraphKind, SimilarityEdge, SimilarityGraph};
use crate::utils::validation::{validate_k, validate_threshold};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Fingerprint length mismatch: expected {expected} bits, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    #[error("Invalid minimum score: {0} (must be within [0, 1])")]
    InvalidThreshold(f64),
}

/// Default number of source rows handed to each parallel task
pub const DEFAULT_CHUNK_ROWS: usize = 256;

/// Configuration for the similarity scorer
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Edges scoring below this are not emitted
    pub min_score: f64,
    /// Spread rows of dataset A across the rayon thread pool
    pub parallel: bool,
    /// Rows of dataset A per parallel task
    pub chunk_rows: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            parallel: true,
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }
}

impl ScoringConfig {
    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }
}

/// Scores fingerprints of dataset A against dataset B
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    config: ScoringConfig,
}

impl SimilarityScorer {
    /// Create a scorer with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with custom configuration
    #[must_use]
    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every pair of fingerprints.
    ///
    /// The graph holds one edge per `(index_a, index_b)` pair scoring at least
    /// `min_score`, ordered by `index_a` then `index_b`.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::DimensionMismatch` if the fingerprints do not all
    /// share one bit length, or `ScoringError::InvalidThreshold` if the
    /// configured `min_score` is outside `[0, 1]`.
    pub fn score_all(
        &self,
        store_a: &FingerprintStore,
        store_b: &FingerprintStore,
    ) -> Result<SimilarityGraph, ScoringError> {
        self.validate(store_a, store_b)?;
        debug!(
            "Dense scoring {} x {} fingerprints",
            store_a.len(),
            store_b.len()
        );

        let min_score = self.config.min_score;
        let targets = store_b.fingerprints();
        let edges = self.score_rows(store_a.fingerprints(), |index_a, source, out| {
            for (index_b, target) in targets.iter().enumerate() {
                let score = dice_coefficient(source, target);
                if score >= min_score {
                    out.push(SimilarityEdge::new(index_a, index_b, score));
                }
            }
        });

        debug!("Dense scoring produced {} edges", edges.len());
        Ok(SimilarityGraph::from_scored(
            store_a.len(),
            store_b.len(),
            GraphKind::Dense,
            edges,
        ))
    }

    /// Keep only the `k` best targets for every source fingerprint.
    ///
    /// Each row is accumulated in a heap bounded at `k` entries, so memory
    /// stays at `O(n * k)`. Rows are ordered by descending score with ties
    /// going to the lower target index. Targets whose popcounts make it
    /// impossible to beat the current k-th best are skipped without comparing
    /// bits.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::InvalidK` if `k` is zero, plus the errors of
    /// [`SimilarityScorer::score_all`].
    pub fn score_top_k(
        &self,
        store_a: &FingerprintStore,
        store_b: &FingerprintStore,
        k: usize,
    ) -> Result<SimilarityGraph, ScoringError> {
        validate_k(k).map_err(|_| ScoringError::InvalidK(k))?;
        self.validate(store_a, store_b)?;
        debug!(
            "Top-{} scoring {} x {} fingerprints",
            k,
            store_a.len(),
            store_b.len()
        );

        let min_score = self.config.min_score;
        let targets = store_b.fingerprints();
        let edges = self.score_rows(store_a.fingerprints(), |index_a, source, out| {
            let mut best = TopK::new(k.min(targets.len()));
            for (index_b, target) in targets.iter().enumerate() {
                let bound = dice_upper_bound(source.popcount(), target.popcount());
                if bound < min_score || !best.could_admit(bound) {
                    continue;
                }
                let score = dice_from_counts(
                    source.intersection_count(target),
                    source.popcount(),
                    target.popcount(),
                );
                if score >= min_score {
                    best.offer(Ranked { score, index_b });
                }
            }
            out.extend(
                best.into_ranked()
                    .map(|r| SimilarityEdge::new(index_a, r.index_b, r.score)),
            );
        });

        debug!("Top-{} scoring produced {} edges", k, edges.len());
        Ok(SimilarityGraph::from_scored(
            store_a.len(),
            store_b.len(),
            GraphKind::TopK { k },
            edges,
        ))
    }

    fn validate(
        &self,
        store_a: &FingerprintStore,
        store_b: &FingerprintStore,
    ) -> Result<(), ScoringError> {
        validate_threshold(self.config.min_score)
            .map_err(|_| ScoringError::InvalidThreshold(self.config.min_score))?;
        common_bit_length(store_a, store_b)?;
        if store_a.is_empty() || store_b.is_empty() {
            warn!(
                "Scoring with an empty dataset ({} x {} fingerprints)",
                store_a.len(),
                store_b.len()
            );
        }
        Ok(())
    }

    /// Run `score_row` over every source, split into row ranges.
    ///
    /// Each task fills its own edge vector; vectors are concatenated in row
    /// order, so the result is the same whether or not rows run in parallel.
    fn score_rows<F>(&self, sources: &[Fingerprint], score_row: F) -> Vec<SimilarityEdge>
    where
        F: Fn(usize, &Fingerprint, &mut Vec<SimilarityEdge>) + Sync,
    {
        let chunk_rows = self.config.chunk_rows.max(1);
        let score_chunk = |(chunk_index, chunk): (usize, &[Fingerprint])| {
            let mut out = Vec::new();
            for (offset, source) in chunk.iter().enumerate() {
                score_row(chunk_index * chunk_rows + offset, source, &mut out);
            }
            out
        };

        let chunks: Vec<Vec<SimilarityEdge>> = if self.config.parallel {
            sources
                .par_chunks(chunk_rows)
                .enumerate()
                .map(score_chunk)
                .collect()
        } else {
            sources
                .chunks(chunk_rows)
                .enumerate()
                .map(score_chunk)
                .collect()
        };

        chunks.concat()
    }
}

/// Shared bit length of both stores, or `None` if either side is empty
///
/// # Errors
///
/// Returns `ScoringError::DimensionMismatch` if any two fingerprints across
/// the stores differ in length.
pub fn common_bit_length(
    store_a: &FingerprintStore,
    store_b: &FingerprintStore,
) -> Result<Option<usize>, ScoringError> {
    let len_a = uniform_length(store_a)?;
    let len_b = uniform_length(store_b)?;
    match (len_a, len_b) {
        (Some(expected), Some(found)) if expected != found => {
            Err(ScoringError::DimensionMismatch { expected, found })
        }
        (Some(len), _) | (_, Some(len)) => Ok(Some(len)),
        (None, None) => Ok(None),
    }
}

fn uniform_length(store: &FingerprintStore) -> Result<Option<usize>, ScoringError> {
    match store.bit_length() {
        BitLength::Empty => Ok(None),
        BitLength::Uniform(len) => Ok(Some(len)),
        BitLength::Mixed { expected, found } => {
            Err(ScoringError::DimensionMismatch { expected, found })
        }
    }
}

/// A candidate target within one source row
#[derive(Debug, Clone, Copy)]
struct Ranked {
    score: f64,
    index_b: usize,
}

// Ordered so that the *worse* candidate compares greater: the max-heap then
// keeps the weakest kept entry on top, ready for eviction.
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.index_b.cmp(&other.index_b))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Bounded accumulator of the best `capacity` candidates for one row
struct TopK {
    capacity: usize,
    heap: BinaryHeap<Ranked>,
}

impl TopK {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    /// Whether a candidate scoring `bound` could still enter.
    ///
    /// Targets are offered in ascending index, so a later candidate that only
    /// ties the current worst loses the tie.
    fn could_admit(&self, bound: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.heap.peek() {
            Some(worst) if self.heap.len() >= self.capacity => bound > worst.score,
            _ => true,
        }
    }

    fn offer(&mut self, candidate: Ranked) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
        } else if self.heap.peek().is_some_and(|worst| candidate < *worst) {
            self.heap.pop();
            self.heap.push(candidate);
        }
    }

    /// Kept candidates, best first
    fn into_ranked(self) -> impl Iterator<Item = Ranked> {
        self.heap.into_sorted_vec().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(bit_len: usize, rows: &[&[usize]]) -> FingerprintStore {
        rows.iter()
            .map(|bits| Fingerprint::from_positions(bit_len, bits.iter().copied()).unwrap())
            .collect()
    }

    #[test]
    fn test_score_all_is_dense_and_row_major() {
        let a = store(64, &[&[0, 1], &[2, 3]]);
        let b = store(64, &[&[0, 1], &[1, 2], &[9]]);
        let graph = SimilarityScorer::new().score_all(&a, &b).unwrap();

        assert_eq!(graph.kind(), GraphKind::Dense);
        assert_eq!(graph.len(), 6);
        let pairs: Vec<_> = graph.edges().iter().map(|e| (e.index_a, e.index_b)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert!((graph.score(0, 0).unwrap() - 1.0).abs() < 1e-12);
        assert!((graph.score(1, 1).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_min_score_floors_dense_edges() {
        let a = store(64, &[&[0, 1]]);
        let b = store(64, &[&[0, 1], &[1, 2], &[9]]);
        let scorer = SimilarityScorer::with_config(ScoringConfig::default().with_min_score(0.5));
        let graph = scorer.score_all(&a, &b).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.score(0, 2).is_none());
    }

    #[test]
    fn test_dimension_mismatch_between_stores() {
        let a = store(64, &[&[0]]);
        let b = store(128, &[&[0]]);
        let err = SimilarityScorer::new().score_all(&a, &b).unwrap_err();
        assert_eq!(
            err,
            ScoringError::DimensionMismatch {
                expected: 64,
                found: 128
            }
        );
    }

    #[test]
    fn test_dimension_mismatch_within_store() {
        let a: FingerprintStore = vec![
            Fingerprint::from_positions(64, [0]).unwrap(),
            Fingerprint::from_positions(32, [0]).unwrap(),
        ]
        .into();
        let b = store(64, &[&[0]]);
        let err = SimilarityScorer::new().score_top_k(&a, &b, 1).unwrap_err();
        assert!(matches!(err, ScoringError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_invalid_k_and_min_score() {
        let a = store(64, &[&[0]]);
        assert_eq!(
            SimilarityScorer::new().score_top_k(&a, &a, 0).unwrap_err(),
            ScoringError::InvalidK(0)
        );

        let scorer = SimilarityScorer::with_config(ScoringConfig::default().with_min_score(1.5));
        assert_eq!(
            scorer.score_all(&a, &a).unwrap_err(),
            ScoringError::InvalidThreshold(1.5)
        );
    }

    #[test]
    fn test_top_k_keeps_best_with_index_tie_break() {
        let a = store(64, &[&[0, 1, 2, 3]]);
        // Scores: b0 = 0.5, b1 = 0.5, b2 = 1.0, b3 = 0.0
        let b = store(64, &[&[0, 1, 8, 9], &[2, 3, 10, 11], &[0, 1, 2, 3], &[20]]);
        let graph = SimilarityScorer::new().score_top_k(&a, &b, 2).unwrap();

        assert_eq!(graph.kind(), GraphKind::TopK { k: 2 });
        let row: Vec<_> = graph.edges().iter().map(|e| e.index_b).collect();
        assert_eq!(row, vec![2, 0]);
    }

    #[test]
    fn test_top_k_larger_than_width() {
        let a = store(64, &[&[0], &[1]]);
        let b = store(64, &[&[0], &[1]]);
        let graph = SimilarityScorer::new().score_top_k(&a, &b, 10).unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let rows: Vec<Vec<usize>> = (0..40)
            .map(|i| (0..8).map(|j| (i * 7 + j * 13) % 128).collect())
            .collect();
        let refs: Vec<&[usize]> = rows.iter().map(Vec::as_slice).collect();
        let a = store(128, &refs);
        let b = store(128, &refs[5..30]);

        let serial = SimilarityScorer::with_config(ScoringConfig::default().with_parallel(false));
        let parallel = SimilarityScorer::with_config(
            ScoringConfig::default().with_parallel(true).with_chunk_rows(3),
        );

        assert_eq!(
            serial.score_all(&a, &b).unwrap(),
            parallel.score_all(&a, &b).unwrap()
        );
        assert_eq!(
            serial.score_top_k(&a, &b, 3).unwrap(),
            parallel.score_top_k(&a, &b, 3).unwrap()
        );
    }

    #[test]
    fn test_empty_stores() {
        let empty = FingerprintStore::default();
        let b = store(64, &[&[0]]);
        let graph = SimilarityScorer::new().score_all(&empty, &b).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.n_b(), 1);
    }
}
