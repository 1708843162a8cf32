use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::MatchMethod;
use crate::matching::mapping::{MatchedTarget, Mapping};
use crate::matching::{bipartite, flow, greedy, threshold};
use crate::similarity::graph::{GraphKind, SimilarityGraph};
use crate::utils::validation::validate_threshold;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid threshold: {0} (must be within [0, 1])")]
    InvalidThreshold(f64),

    #[error("Unknown matching method: '{0}' (expected threshold, bipartite, weighted or greedy)")]
    UnknownMethod(String),

    #[error("Pass-through matching needs a top-k graph, got a {0:?} graph")]
    MethodGraphMismatch(GraphKind),
}

/// Default similarity threshold for accepting a pair
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Configuration for the matcher
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Edges scoring below this are ignored; an edge scoring exactly this is kept
    pub threshold: f64,
    /// Resolution strategy; `None` passes top-k candidates straight through
    pub method: Option<MatchMethod>,
    /// In pass-through mode, keep every surviving candidate instead of the best
    pub multi_valued: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            method: Some(MatchMethod::default()),
            multi_valued: false,
        }
    }
}

impl MatchingConfig {
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Option<MatchMethod>) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }
}

/// Resolves similarity graphs into mappings
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchingConfig,
}

impl Matcher {
    /// Create a matcher with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidThreshold` if the threshold is outside `[0, 1]`.
    pub fn with_config(config: MatchingConfig) -> Result<Self, MatchError> {
        validate_threshold(config.threshold)
            .map_err(|_| MatchError::InvalidThreshold(config.threshold))?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Resolve a graph with the configured threshold and strategy.
    ///
    /// The graph is only read. The same graph and configuration always yield
    /// the same mapping.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::MethodGraphMismatch` when no strategy is set and the
    /// graph was not produced by top-k scoring.
    pub fn map(&self, graph: &SimilarityGraph) -> Result<Mapping, MatchError> {
        let threshold = self.config.threshold;
        debug!(
            "Matching {} edges ({} x {}) at threshold {} with {}",
            graph.len(),
            graph.n_a(),
            graph.n_b(),
            threshold,
            self.config
                .method
                .map_or("pass-through", MatchMethod::as_str)
        );

        let mapping = match self.config.method {
            Some(MatchMethod::Threshold) => threshold::resolve(graph, threshold),
            Some(MatchMethod::Bipartite) => bipartite::resolve(graph, threshold),
            Some(MatchMethod::Weighted) => flow::resolve(graph, threshold),
            Some(MatchMethod::Greedy) => greedy::resolve(graph, threshold),
            None => pass_through(graph, threshold, self.config.multi_valued)?,
        };

        info!(
            "Mapped {} of {} records (total score {:.4})",
            mapping.len(),
            graph.n_a(),
            mapping.total_score()
        );
        Ok(mapping)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            config: MatchingConfig::default(),
        }
    }
}

/// Resolve a similarity graph into a mapping.
///
/// `method = None` is only valid for graphs from top-k scoring and keeps each
/// source's best surviving candidate without any conflict resolution.
///
/// # Errors
///
/// Returns `MatchError::InvalidThreshold` for thresholds outside `[0, 1]` and
/// `MatchError::MethodGraphMismatch` for `None` on a non-top-k graph.
///
/// # Examples
///
/// ```
/// use bloomlink::core::MatchMethod;
/// use bloomlink::matching::map_entities;
/// use bloomlink::similarity::{SimilarityEdge, SimilarityGraph};
///
/// let graph = SimilarityGraph::from_edges(
///     2,
///     1,
///     vec![SimilarityEdge::new(0, 0, 0.9), SimilarityEdge::new(1, 0, 0.9)],
/// )
/// .unwrap();
///
/// let mapping = map_entities(&graph, 0.8, Some(MatchMethod::Greedy)).unwrap();
/// assert_eq!(mapping.get(0), Some(0));
/// assert_eq!(mapping.get(1), None);
/// ```
pub fn map_entities(
    graph: &SimilarityGraph,
    threshold: f64,
    method: Option<MatchMethod>,
) -> Result<Mapping, MatchError> {
    let config = MatchingConfig::default()
        .with_threshold(threshold)
        .with_method(method);
    Matcher::with_config(config)?.map(graph)
}

/// [`map_entities`] with the strategy given by name.
///
/// Accepts `threshold`, `bipartite`, `weighted` (or `weighted-flow`) and
/// `greedy`; `None` selects top-k pass-through.
///
/// # Errors
///
/// Returns `MatchError::UnknownMethod` for any other name, plus the errors of
/// [`map_entities`].
pub fn map_entities_by_name(
    graph: &SimilarityGraph,
    threshold: f64,
    method: Option<&str>,
) -> Result<Mapping, MatchError> {
    let method = method
        .map(|name| {
            name.parse::<MatchMethod>()
                .map_err(|e| MatchError::UnknownMethod(e.0))
        })
        .transpose()?;
    map_entities(graph, threshold, method)
}

/// Keep each source's surviving top-k candidates as they are
fn pass_through(
    graph: &SimilarityGraph,
    threshold: f64,
    multi_valued: bool,
) -> Result<Mapping, MatchError> {
    if !graph.is_top_k() {
        return Err(MatchError::MethodGraphMismatch(graph.kind()));
    }

    let links: BTreeMap<usize, Vec<MatchedTarget>> = if multi_valued {
        let mut links: BTreeMap<usize, Vec<(usize, f64)>> = BTreeMap::new();
        for edge in graph.edges_at_least(threshold) {
            links
                .entry(edge.index_a)
                .or_default()
                .push((edge.index_b, edge.score));
        }
        links
            .into_iter()
            .map(|(a, mut targets)| {
                targets.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(&y.0)));
                let ranked = targets
                    .into_iter()
                    .map(|(index_b, score)| MatchedTarget { index_b, score })
                    .collect();
                (a, ranked)
            })
            .collect()
    } else {
        graph
            .best_per_source_at_least(threshold)
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
            .collect()
    };

    Ok(Mapping::from_links(None, links))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::graph::SimilarityEdge;

    fn sparse(edges: &[(usize, usize, f64)]) -> SimilarityGraph {
        SimilarityGraph::from_edges(
            3,
            3,
            edges
                .iter()
                .map(|&(a, b, s)| SimilarityEdge::new(a, b, s))
                .collect(),
        )
        .unwrap()
    }

    fn top_k(edges: &[(usize, usize, f64)]) -> SimilarityGraph {
        SimilarityGraph::from_top_k_edges(
            3,
            3,
            2,
            edges
                .iter()
                .map(|&(a, b, s)| SimilarityEdge::new(a, b, s))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_threshold() {
        let g = sparse(&[]);
        assert_eq!(
            map_entities(&g, 1.5, Some(MatchMethod::Greedy)).unwrap_err(),
            MatchError::InvalidThreshold(1.5)
        );
        assert!(map_entities(&g, -0.01, None).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let g = sparse(&[]);
        assert_eq!(
            map_entities_by_name(&g, 0.5, Some("hungarian")).unwrap_err(),
            MatchError::UnknownMethod("hungarian".to_string())
        );
        assert!(map_entities_by_name(&g, 0.5, Some("weighted-flow")).is_ok());
    }

    #[test]
    fn test_pass_through_requires_top_k_graph() {
        let g = sparse(&[(0, 0, 0.9)]);
        assert_eq!(
            map_entities(&g, 0.5, None).unwrap_err(),
            MatchError::MethodGraphMismatch(GraphKind::Sparse)
        );
    }

    #[test]
    fn test_pass_through_best_only() {
        let g = top_k(&[(0, 1, 0.9), (0, 0, 0.85), (1, 1, 0.95), (2, 2, 0.3)]);
        let mapping = map_entities(&g, 0.8, None).unwrap();
        assert_eq!(mapping.method(), None);
        // Target 1 is reused: pass-through does no conflict resolution
        assert_eq!(mapping.pairs().collect::<Vec<_>>(), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_pass_through_multi_valued() {
        let g = top_k(&[(0, 1, 0.9), (0, 0, 0.85), (1, 1, 0.95), (1, 2, 0.5)]);
        let matcher = Matcher::with_config(
            MatchingConfig::default()
                .with_threshold(0.8)
                .with_method(None)
                .with_multi_valued(true),
        )
        .unwrap();
        let mapping = matcher.map(&g).unwrap();
        assert_eq!(mapping.candidates(0).len(), 2);
        assert_eq!(mapping.candidates(0)[0].index_b, 1);
        assert_eq!(mapping.candidates(1).len(), 1);
        assert!(mapping.is_multi_valued());
    }

    #[test]
    fn test_strategies_leave_graph_untouched() {
        let g = sparse(&[(0, 0, 0.9), (1, 0, 0.9), (1, 1, 0.6), (2, 2, 0.99)]);
        let before = g.clone();
        for method in MatchMethod::ALL {
            let first = map_entities(&g, 0.5, Some(method)).unwrap();
            let second = map_entities(&g, 0.5, Some(method)).unwrap();
            assert_eq!(first, second, "{method} is not deterministic");
            assert!(first.is_injective(), "{method} is not injective");
        }
        assert_eq!(g, before);
    }

    #[test]
    fn test_default_config() {
        let config = MatchingConfig::default();
        assert!((config.threshold - DEFAULT_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(config.method, Some(MatchMethod::Threshold));
        let mapping = Matcher::default().map(&sparse(&[(0, 0, 0.96)])).unwrap();
        assert_eq!(mapping.len(), 1);
    }
}
