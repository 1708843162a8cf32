//! Readers for fingerprint files handed over by the encoding side.
//!
//! Fingerprints arrive as text, one hex-encoded bit vector per line:
//!
//! ```text
//! # dataset A, 16-bit fingerprints
//! ff00
//! 0x0f0f
//! 00ff
//! ```
//!
//! Blank lines and `#` comments are ignored. Every fingerprint in a file must
//! have the same length; the line position (ignoring skipped lines) is the
//! record index used throughout matching.
//!
//! ## Example
//!
//! ```rust
//! use bloomlink::parsing::fingerprints::parse_fingerprint_text;
//!
//! let store = parse_fingerprint_text("ff00\n0f0f\n").unwrap();
//! assert_eq!(store.len(), 2);
//! ```

pub mod fingerprints;

pub use fingerprints::{parse_fingerprint_file, parse_fingerprint_text, ParseError};
