use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Edge ({index_a}, {index_b}) outside {n_a}x{n_b} graph")]
    IndexOutOfRange {
        index_a: usize,
        index_b: usize,
        n_a: usize,
        n_b: usize,
    },

    #[error("Edge ({index_a}, {index_b}) has score {score} outside [0, 1]")]
    InvalidScore {
        index_a: usize,
        index_b: usize,
        score: f64,
    },

    #[error("Duplicate edge ({index_a}, {index_b})")]
    DuplicateEdge { index_a: usize, index_b: usize },

    #[error("Invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    #[error("Source {index_a} has more than {k} top-k edges")]
    RowExceedsK { index_a: usize, k: usize },
}

/// One scored candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    /// Index into dataset A
    pub index_a: usize,
    /// Index into dataset B
    pub index_b: usize,
    /// Dice coefficient in [0, 1]
    pub score: f64,
}

impl SimilarityEdge {
    #[must_use]
    pub fn new(index_a: usize, index_b: usize, score: f64) -> Self {
        Self {
            index_a,
            index_b,
            score,
        }
    }
}

/// How a similarity graph was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// Every pair scored (possibly floored by a minimum score)
    Dense,
    /// At most `k` best edges per source index
    TopK { k: usize },
    /// Assembled from caller-supplied edges
    Sparse,
}

/// Scored edges between dataset A (`n_a` records) and dataset B (`n_b` records).
///
/// Holds at most one edge per `(index_a, index_b)` pair. Graphs built by the
/// scorer are row-major; within a row, dense graphs ascend by `index_b` and
/// top-K graphs descend by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGraph {
    n_a: usize,
    n_b: usize,
    kind: GraphKind,
    edges: Vec<SimilarityEdge>,
}

impl SimilarityGraph {
    /// Build from edges the scorer already knows to be valid
    pub(crate) fn from_scored(
        n_a: usize,
        n_b: usize,
        kind: GraphKind,
        edges: Vec<SimilarityEdge>,
    ) -> Self {
        Self {
            n_a,
            n_b,
            kind,
            edges,
        }
    }

    /// Build a sparse graph from caller-supplied edges.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::IndexOutOfRange` for indices outside `n_a`/`n_b`,
    /// `GraphError::InvalidScore` for scores outside `[0, 1]` (or NaN), and
    /// `GraphError::DuplicateEdge` if a pair appears twice.
    pub fn from_edges(
        n_a: usize,
        n_b: usize,
        edges: Vec<SimilarityEdge>,
    ) -> Result<Self, GraphError> {
        Self::validated(n_a, n_b, GraphKind::Sparse, edges)
    }

    /// Like [`SimilarityGraph::from_edges`] but tagged as a top-K graph, for
    /// candidate lists computed outside this crate.
    ///
    /// # Errors
    ///
    /// Same as [`SimilarityGraph::from_edges`], plus `GraphError::InvalidK` for
    /// `k == 0` and `GraphError::RowExceedsK` if a source has more than `k` edges.
    pub fn from_top_k_edges(
        n_a: usize,
        n_b: usize,
        k: usize,
        edges: Vec<SimilarityEdge>,
    ) -> Result<Self, GraphError> {
        Self::validated(n_a, n_b, GraphKind::TopK { k }, edges)
    }

    fn validated(
        n_a: usize,
        n_b: usize,
        kind: GraphKind,
        edges: Vec<SimilarityEdge>,
    ) -> Result<Self, GraphError> {
        let row_limit = match kind {
            GraphKind::TopK { k: 0 } => return Err(GraphError::InvalidK(0)),
            GraphKind::TopK { k } => Some(k),
            GraphKind::Dense | GraphKind::Sparse => None,
        };

        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edges.len());
        let mut row_len: HashMap<usize, usize> = HashMap::new();
        for edge in &edges {
            if edge.index_a >= n_a || edge.index_b >= n_b {
                return Err(GraphError::IndexOutOfRange {
                    index_a: edge.index_a,
                    index_b: edge.index_b,
                    n_a,
                    n_b,
                });
            }
            if !(0.0..=1.0).contains(&edge.score) {
                return Err(GraphError::InvalidScore {
                    index_a: edge.index_a,
                    index_b: edge.index_b,
                    score: edge.score,
                });
            }
            if !seen.insert((edge.index_a, edge.index_b)) {
                return Err(GraphError::DuplicateEdge {
                    index_a: edge.index_a,
                    index_b: edge.index_b,
                });
            }
            if let Some(k) = row_limit {
                let len = row_len.entry(edge.index_a).or_insert(0);
                *len += 1;
                if *len > k {
                    return Err(GraphError::RowExceedsK {
                        index_a: edge.index_a,
                        k,
                    });
                }
            }
        }

        Ok(Self {
            n_a,
            n_b,
            kind,
            edges,
        })
    }

    /// Number of records in dataset A
    #[must_use]
    pub fn n_a(&self) -> usize {
        self.n_a
    }

    /// Number of records in dataset B
    #[must_use]
    pub fn n_b(&self) -> usize {
        self.n_b
    }

    #[must_use]
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    #[must_use]
    pub fn is_top_k(&self) -> bool {
        matches!(self.kind, GraphKind::TopK { .. })
    }

    #[must_use]
    pub fn edges(&self) -> &[SimilarityEdge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges with `score >= threshold`, in graph order
    pub fn edges_at_least(&self, threshold: f64) -> impl Iterator<Item = &SimilarityEdge> + '_ {
        self.edges.iter().filter(move |e| e.score >= threshold)
    }

    /// Score of the edge between `index_a` and `index_b`, if present
    #[must_use]
    pub fn score(&self, index_a: usize, index_b: usize) -> Option<f64> {
        self.edges
            .iter()
            .find(|e| e.index_a == index_a && e.index_b == index_b)
            .map(|e| e.score)
    }

    /// Highest-scoring edge for each source index that has one.
    ///
    /// Ties go to the lower `index_b`. Returned in ascending `index_a`.
    #[must_use]
    pub fn best_per_source(&self) -> Vec<SimilarityEdge> {
        self.best_per_source_at_least(f64::NEG_INFINITY)
    }

    /// [`SimilarityGraph::best_per_source`] over edges with `score >= threshold`
    #[must_use]
    pub fn best_per_source_at_least(&self, threshold: f64) -> Vec<SimilarityEdge> {
        let mut best: std::collections::BTreeMap<usize, SimilarityEdge> =
            std::collections::BTreeMap::new();
        for edge in self.edges_at_least(threshold) {
            best.entry(edge.index_a)
                .and_modify(|current| {
                    if ranks_before(edge, current) {
                        *current = *edge;
                    }
                })
                .or_insert(*edge);
        }
        best.into_values().collect()
    }
}

/// Row order used everywhere: higher score first, then lower target index
#[inline]
pub(crate) fn ranks_before(a: &SimilarityEdge, b: &SimilarityEdge) -> bool {
    match b.score.total_cmp(&a.score) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.index_b < b.index_b,
    }
}
