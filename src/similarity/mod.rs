//! Similarity scoring between fingerprint datasets.
//!
//! - [`SimilarityScorer`]: Dense all-pairs and top-K scoring
//! - [`SimilarityGraph`]: The scored edges handed to the matchers
//! - [`dice_coefficient`]: Pairwise Dice similarity
//!
//! ## Scoring
//!
//! The Dice coefficient of two fingerprints is `2|A ∩ B| / (|A| + |B|)`. The
//! popcounts `|A|` and `|B|` are cached on each fingerprint, so a comparison
//! only has to count the intersection, one 64-bit word at a time.
//!
//! Top-K scoring keeps the best `k` targets per source in a bounded heap, and
//! skips targets whose best possible score `2·min(|A|,|B|)/(|A|+|B|)` cannot
//! displace the current k-th entry.
//!
//! ## Example
//!
//! ```rust
//! use bloomlink::core::FingerprintStore;
//! use bloomlink::similarity::SimilarityScorer;
//!
//! let a = FingerprintStore::from_hex(["ff00", "00ff"]).unwrap();
//! let b = FingerprintStore::from_hex(["00ff", "ff0f"]).unwrap();
//!
//! let scorer = SimilarityScorer::new();
//! let graph = scorer.score_top_k(&a, &b, 1).unwrap();
//!
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.edges()[1].index_b, 0);
//! ```

pub mod dice;
pub mod graph;
pub mod scorer;

pub use dice::{dice_coefficient, dice_from_counts, dice_upper_bound};
pub use graph::{GraphError, GraphKind, SimilarityEdge, SimilarityGraph};
pub use scorer::{ScoringConfig, ScoringError, SimilarityScorer};
