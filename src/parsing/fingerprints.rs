use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::core::fingerprint::Fingerprint;
use crate::core::store::FingerprintStore;
use crate::utils::validation::{check_fingerprint_limit, is_valid_hex, MAX_BIT_LENGTH};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fingerprint file: {0}")]
    InvalidFormat(String),

    #[error("Too many fingerprints: {0} exceeds maximum allowed")]
    TooManyFingerprints(usize),
}

/// Parse a fingerprint file: one hex-encoded fingerprint per line
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_fingerprint_file(path: &Path) -> Result<FingerprintStore, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_fingerprint_text(&content)
}

/// Parse fingerprint text: one hex-encoded fingerprint per line.
///
/// Blank lines and lines starting with `#` are skipped. An optional leading
/// `0x` is accepted. Line order is record order.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for malformed hex, fingerprints longer
/// than the maximum bit length, or lines of differing length, and
/// `ParseError::TooManyFingerprints` if the limit is exceeded.
pub fn parse_fingerprint_text(text: &str) -> Result<FingerprintStore, ParseError> {
    let mut fingerprints: Vec<Fingerprint> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        let hex = line
            .strip_prefix("0x")
            .or_else(|| line.strip_prefix("0X"))
            .unwrap_or(line);

        if !is_valid_hex(hex) {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} is not an even-length hex string"
            )));
        }
        if hex.len() * 4 > MAX_BIT_LENGTH {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} bits, more than the maximum of {MAX_BIT_LENGTH}",
                hex.len() * 4
            )));
        }

        let fingerprint = Fingerprint::from_hex(hex)
            .map_err(|e| ParseError::InvalidFormat(format!("Line {line_num}: {e}")))?;

        if let Some(first) = fingerprints.first() {
            if first.bit_len() != fingerprint.bit_len() {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num} has {} bits but earlier fingerprints have {}",
                    fingerprint.bit_len(),
                    first.bit_len()
                )));
            }
        }

        // Check fingerprint limit for DOS protection
        if check_fingerprint_limit(fingerprints.len()).is_some() {
            return Err(ParseError::TooManyFingerprints(fingerprints.len()));
        }

        fingerprints.push(fingerprint);
    }

    if fingerprints.is_empty() {
        warn!("No fingerprints found in input");
    }

    Ok(FingerprintStore::new(fingerprints))
}
