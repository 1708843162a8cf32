//! Core data types for fingerprint linkage.
//!
//! - [`Fingerprint`]: An immutable bit vector with its popcount cached at construction
//! - [`FingerprintStore`]: The ordered fingerprints of one dataset
//! - [`MatchMethod`]: The matching strategies
//!
//! ## Bit Layout
//!
//! Fingerprints are stored as little-endian 64-bit words: bit `i` is bit
//! `i % 64` of word `i / 64`. Hex input is read byte by byte, so the first two
//! hex digits hold bits 0-7. Bits beyond the declared length are always zero,
//! which lets the scorer popcount whole words without masking.
//!
//! | Input            | Bit length |
//! |------------------|------------|
//! | `from_bytes`     | 8 × bytes  |
//! | `from_hex`       | 4 × digits |
//! | `from_words`     | explicit   |
//! | `from_positions` | explicit   |

pub mod fingerprint;
pub mod store;
pub mod types;

pub use fingerprint::{Fingerprint, FingerprintError};
pub use store::{BitLength, FingerprintStore};
pub use types::MatchMethod;
