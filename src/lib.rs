//! # bloomlink
//!
//! A library for privacy-preserving record linkage over Bloom-filter fingerprints.
//!
//! Two parties each encode their records into fixed-length bit vectors so that
//! raw values never have to be exchanged. Given the two sets of fingerprints,
//! `bloomlink` works out which fingerprint in dataset A most plausibly stands
//! for the same entity as which fingerprint in dataset B.
//!
//! ## Features
//!
//! - **Dice scoring**: Word-at-a-time popcounts with cached per-fingerprint counts
//! - **Top-k scoring**: Bounded per-record candidate lists without an `n×m` matrix
//! - **Parallel scoring**: Rows of A spread across a rayon thread pool
//! - **Four matching strategies**: threshold, greedy, bipartite (Hungarian)
//!   and weighted (min-cost flow)
//! - **Pass-through mode**: Ranked top-k candidates without conflict resolution
//!
//! ## Example
//!
//! ```rust
//! use bloomlink::{map_entities, FingerprintStore, MatchMethod, SimilarityScorer};
//!
//! let a = FingerprintStore::from_hex(["ffff0000", "00ff00ff", "0000ffff"]).unwrap();
//! let b = FingerprintStore::from_hex(["0000ffff", "ffff0001"]).unwrap();
//!
//! let graph = SimilarityScorer::new().score_all(&a, &b).unwrap();
//! let mapping = map_entities(&graph, 0.9, Some(MatchMethod::Greedy)).unwrap();
//!
//! for (index_a, index_b) in mapping.pairs() {
//!     println!("A[{index_a}] <-> B[{index_b}]");
//! }
//! assert_eq!(mapping.get(0), Some(1));
//! assert_eq!(mapping.get(2), Some(0));
//! assert_eq!(mapping.get(1), None);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Fingerprints, fingerprint stores and strategy names
//! - [`similarity`]: Dice scoring and the similarity graph
//! - [`matching`]: Matching strategies and the resulting mapping
//! - [`parsing`]: Reader for hex fingerprint files
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod similarity;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::fingerprint::Fingerprint;
pub use core::store::FingerprintStore;
pub use core::types::MatchMethod;
pub use matching::engine::{map_entities, map_entities_by_name, MatchError, Matcher, MatchingConfig};
pub use matching::mapping::Mapping;
pub use similarity::graph::{SimilarityEdge, SimilarityGraph};
pub use similarity::scorer::{ScoringConfig, ScoringError, SimilarityScorer};
