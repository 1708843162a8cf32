use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of bits held by one storage word
pub const WORD_BITS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Invalid hex fingerprint: {0}")]
    InvalidHex(String),

    #[error("Bit position {position} out of range for {bit_len}-bit fingerprint")]
    BitOutOfRange { position: usize, bit_len: usize },

    #[error("Expected {expected} words for {bit_len} bits, got {found}")]
    WordCountMismatch {
        bit_len: usize,
        expected: usize,
        found: usize,
    },
}

/// Number of 64-bit words needed to hold `bit_len` bits
#[must_use]
pub fn words_for_bits(bit_len: usize) -> usize {
    bit_len.div_ceil(WORD_BITS)
}

/// Population count over a word slice
#[inline]
#[must_use]
pub fn popcount_words(words: &[u64]) -> u32 {
    words.iter().map(|w| w.count_ones()).sum()
}

/// A fixed-length bit-vector encoding of one record.
///
/// The popcount is computed once at construction and reused by every
/// comparison. There is no mutating API; bits past `bit_len` are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FingerprintRepr", into = "FingerprintRepr")]
pub struct Fingerprint {
    words: Box<[u64]>,
    bit_len: usize,
    popcount: u32,
}

impl Fingerprint {
    /// Build from 64-bit words. Bit `i` lives in word `i / 64`, position `i % 64`.
    ///
    /// Any bits set past `bit_len` in the final word are cleared.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::WordCountMismatch` if `words.len()` does not
    /// equal `ceil(bit_len / 64)`.
    pub fn from_words(mut words: Vec<u64>, bit_len: usize) -> Result<Self, FingerprintError> {
        let expected = words_for_bits(bit_len);
        if words.len() != expected {
            return Err(FingerprintError::WordCountMismatch {
                bit_len,
                expected,
                found: words.len(),
            });
        }

        let tail = bit_len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }

        let popcount = popcount_words(&words);
        Ok(Self {
            words: words.into_boxed_slice(),
            bit_len,
            popcount,
        })
    }

    /// Build from raw bytes; the bit length is `8 * bytes.len()`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bit_len = bytes.len() * 8;
        let words: Vec<u64> = bytes
            .chunks(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..chunk.len()].copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect();

        let popcount = popcount_words(&words);
        Self {
            words: words.into_boxed_slice(),
            bit_len,
            popcount,
        }
    }

    /// Parse a hex string (two characters per byte, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::InvalidHex` for odd-length input or
    /// non-hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, FingerprintError> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 {
            return Err(FingerprintError::InvalidHex(format!(
                "odd number of hex digits ({})",
                hex.len()
            )));
        }

        let bytes = hex
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let hi = hex_value(pair[0])?;
                let lo = hex_value(pair[1])?;
                Some((hi << 4) | lo)
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| FingerprintError::InvalidHex(truncate_for_error(hex)))?;

        Ok(Self::from_bytes(&bytes))
    }

    /// Build a `bit_len`-bit fingerprint with the given bit positions set.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::BitOutOfRange` if any position is `>= bit_len`.
    pub fn from_positions(
        bit_len: usize,
        positions: impl IntoIterator<Item = usize>,
    ) -> Result<Self, FingerprintError> {
        let mut words = vec![0u64; words_for_bits(bit_len)];
        for position in positions {
            if position >= bit_len {
                return Err(FingerprintError::BitOutOfRange { position, bit_len });
            }
            words[position / WORD_BITS] |= 1u64 << (position % WORD_BITS);
        }
        Self::from_words(words, bit_len)
    }

    /// Length in bits
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Cached number of set bits
    #[must_use]
    pub fn popcount(&self) -> u32 {
        self.popcount
    }

    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.popcount == 0
    }

    /// Whether bit `position` is set. Out-of-range positions read as unset.
    #[must_use]
    pub fn bit(&self, position: usize) -> bool {
        if position >= self.bit_len {
            return false;
        }
        self.words[position / WORD_BITS] & (1u64 << (position % WORD_BITS)) != 0
    }

    /// Number of bits set in both fingerprints.
    ///
    /// Fingerprints of different lengths are compared over their common prefix;
    /// the scorer rejects such pairs before getting here.
    #[inline]
    #[must_use]
    pub fn intersection_count(&self, other: &Self) -> u32 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a & b).count_ones())
            .sum()
    }

    /// Lowercase hex encoding, inverse of [`Fingerprint::from_hex`] for
    /// byte-aligned fingerprints.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let n_bytes = self.bit_len.div_ceil(8);
        let mut out = String::with_capacity(n_bytes * 2);
        for (i, word) in self.words.iter().enumerate() {
            for (j, byte) in word.to_le_bytes().iter().enumerate() {
                if i * 8 + j >= n_bytes {
                    break;
                }
                out.push_str(&format!("{byte:02x}"));
            }
        }
        out
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn truncate_for_error(s: &str) -> String {
    const MAX_SHOWN: usize = 32;
    if s.chars().count() <= MAX_SHOWN {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(MAX_SHOWN).collect::<String>())
    }
}

/// Serialized form: bit length plus hex payload
#[derive(Serialize, Deserialize)]
struct FingerprintRepr {
    bits: usize,
    hex: String,
}

impl From<Fingerprint> for FingerprintRepr {
    fn from(fp: Fingerprint) -> Self {
        Self {
            bits: fp.bit_len,
            hex: fp.to_hex(),
        }
    }
}

impl TryFrom<FingerprintRepr> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(repr: FingerprintRepr) -> Result<Self, Self::Error> {
        let parsed = Fingerprint::from_hex(&repr.hex)?;
        if parsed.bit_len < repr.bits {
            return Err(FingerprintError::InvalidHex(format!(
                "{} hex bits shorter than declared {}",
                parsed.bit_len, repr.bits
            )));
        }
        let mut words = parsed.words.into_vec();
        words.truncate(words_for_bits(repr.bits));
        Fingerprint::from_words(words, repr.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::FingerprintStore;

    #[test]
    fn test_from_words_masks_tail_bits() {
        let fp = Fingerprint::from_words(vec![u64::MAX], 10).unwrap();
        assert_eq!(fp.popcount(), 10);
        assert_eq!(fp.words()[0], 0x3ff);
        assert!(!fp.bit(10));
    }

    #[test]
    fn test_from_words_rejects_wrong_word_count() {
        let err = Fingerprint::from_words(vec![0, 0], 64).unwrap_err();
        assert_eq!(
            err,
            FingerprintError::WordCountMismatch {
                bit_len: 64,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_from_positions() {
        let fp = Fingerprint::from_positions(128, [0, 63, 64, 127]).unwrap();
        assert_eq!(fp.popcount(), 4);
        assert!(fp.bit(63));
        assert!(fp.bit(64));
        assert!(!fp.bit(1));

        let err = Fingerprint::from_positions(8, [8]).unwrap_err();
        assert!(matches!(err, FingerprintError::BitOutOfRange { position: 8, .. }));
    }

    #[test]
    fn test_hex_roundtrip_and_popcount() {
        let fp = Fingerprint::from_hex("ff00F00f").unwrap();
        assert_eq!(fp.bit_len(), 32);
        assert_eq!(fp.popcount(), 16);
        assert_eq!(fp.to_hex(), "ff00f00f");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(
            Fingerprint::from_hex("abc"),
            Err(FingerprintError::InvalidHex(_))
        ));
        assert!(matches!(
            Fingerprint::from_hex("zz"),
            Err(FingerprintError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_non_ascii_hex_is_rejected() {
        let euros = "€".repeat(12);
        match Fingerprint::from_hex(&euros) {
            Err(FingerprintError::InvalidHex(shown)) => assert!(shown.starts_with('€')),
            other => panic!("expected InvalidHex, got {other:?}"),
        }
        assert!(matches!(
            FingerprintStore::from_hex(["ff", euros.as_str()]),
            Err(FingerprintError::InvalidHex(_))
        ));

        // Long enough to be truncated in the message
        let long = "ü".repeat(40);
        match Fingerprint::from_hex(&long) {
            Err(FingerprintError::InvalidHex(shown)) => {
                assert_eq!(shown, format!("{}...", "ü".repeat(32)));
            }
            other => panic!("expected InvalidHex, got {other:?}"),
        }

        let json = format!(r#"{{"bits":8,"hex":"{euros}"}}"#);
        assert!(serde_json::from_str::<Fingerprint>(&json).is_err());
    }

    #[test]
    fn test_intersection_count() {
        let a = Fingerprint::from_positions(200, [1, 2, 3, 150]).unwrap();
        let b = Fingerprint::from_positions(200, [2, 3, 4, 150, 199]).unwrap();
        assert_eq!(a.intersection_count(&b), 3);
        assert_eq!(b.intersection_count(&a), 3);
    }

    #[test]
    fn test_serde_roundtrip_keeps_bit_length() {
        let fp = Fingerprint::from_positions(12, [0, 11]).unwrap();
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert_eq!(back.bit_len(), 12);
    }
}
