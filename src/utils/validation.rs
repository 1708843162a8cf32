//! Centralized validation and helper functions.

/// Maximum number of fingerprints read from a single file (DOS protection)
pub const MAX_FINGERPRINTS: usize = 1_000_000;

/// Maximum fingerprint length in bits accepted from input files
pub const MAX_BIT_LENGTH: usize = 65_536;

/// Validation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
    #[error("k must be at least 1, got {0}")]
    KTooSmall(usize),
}

/// Validate that a string is a hex-encoded fingerprint (even number of hex digits).
///
/// # Examples
///
/// ```
/// use bloomlink::utils::validation::is_valid_hex;
///
/// assert!(is_valid_hex("ff00a1"));
/// assert!(!is_valid_hex("ff0"));      // odd length
/// assert!(!is_valid_hex("not-hex!"));
/// assert!(!is_valid_hex(""));
/// ```
#[must_use]
pub fn is_valid_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Check that a similarity threshold lies in `[0, 1]`.
///
/// NaN is rejected.
///
/// # Errors
///
/// Returns `ValidationError::ThresholdOutOfRange` otherwise.
pub fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange(threshold))
    }
}

/// Check that a top-K width is at least 1.
///
/// # Errors
///
/// Returns `ValidationError::KTooSmall` for `k == 0`.
pub fn validate_k(k: usize) -> Result<(), ValidationError> {
    if k >= 1 {
        Ok(())
    } else {
        Err(ValidationError::KTooSmall(k))
    }
}

/// Check if adding another fingerprint would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new fingerprint.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_fingerprint_limit(count: usize) -> Option<String> {
    if count >= MAX_FINGERPRINTS {
        Some(format!(
            "Too many fingerprints: adding another would exceed maximum of {MAX_FINGERPRINTS}"
        ))
    } else {
        None
    }
}
