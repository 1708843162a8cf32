//! Entity resolution over a similarity graph.
//!
//! This module turns scored candidate pairs into a final mapping:
//!
//! - [`map_entities`]: Main entry point, one call per matching run
//! - [`Matcher`]: The same, driven by a reusable [`MatchingConfig`]
//! - [`Mapping`]: The resulting source -> target correspondence
//!
//! ## Strategies
//!
//! Every strategy first drops edges scoring below the threshold (an edge equal
//! to the threshold is kept), never modifies the graph, and is deterministic.
//!
//! | Method      | Result                          | Cost                    |
//! |-------------|---------------------------------|-------------------------|
//! | `threshold` | Best target per source, higher score keeps it | sort + linear pass |
//! | `greedy`    | Descending-score pass, ≥ ½ optimal | `O(E log E)`          |
//! | `bipartite` | Optimal (Hungarian, per component) | cubic in component size |
//! | `weighted`  | Optimal (min-cost flow)         | `O(V · E log V)`        |
//!
//! With no method, a graph from top-k scoring is passed straight through:
//! each source keeps its best candidate (or all of them with
//! `multi_valued`), and targets may repeat.
//!
//! ## Example
//!
//! ```rust
//! use bloomlink::core::{FingerprintStore, MatchMethod};
//! use bloomlink::matching::map_entities;
//! use bloomlink::similarity::SimilarityScorer;
//!
//! let a = FingerprintStore::from_hex(["ff00ff00", "0f0f0f0f"]).unwrap();
//! let b = FingerprintStore::from_hex(["0f0f0f0f", "ff00ff01"]).unwrap();
//!
//! let graph = SimilarityScorer::new().score_all(&a, &b).unwrap();
//! let mapping = map_entities(&graph, 0.9, Some(MatchMethod::Weighted)).unwrap();
//!
//! assert_eq!(mapping.get(0), Some(1));
//! assert_eq!(mapping.get(1), Some(0));
//! ```

mod bipartite;
mod claims;
pub mod engine;
mod flow;
mod greedy;
pub mod mapping;
mod network;
mod threshold;

pub use engine::{
    map_entities, map_entities_by_name, MatchError, Matcher, MatchingConfig, DEFAULT_THRESHOLD,
};
pub use mapping::{MatchedTarget, Mapping};
