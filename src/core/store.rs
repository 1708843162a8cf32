use serde::{Deserialize, Serialize};

use crate::core::fingerprint::{Fingerprint, FingerprintError};

/// An ordered, immutable collection of fingerprints for one dataset.
///
/// Position in the store is the record's identity everywhere downstream;
/// fingerprints are never reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintStore {
    fingerprints: Vec<Fingerprint>,
}

/// Outcome of checking that every fingerprint in a store has the same length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitLength {
    /// The store holds no fingerprints
    Empty,
    /// All fingerprints share this length
    Uniform(usize),
    /// Two lengths were found; the first is the store's leading length
    Mixed { expected: usize, found: usize },
}

impl FingerprintStore {
    #[must_use]
    pub fn new(fingerprints: Vec<Fingerprint>) -> Self {
        Self { fingerprints }
    }

    /// Parse one hex string per record
    ///
    /// # Errors
    ///
    /// Returns the first `FingerprintError` encountered.
    pub fn from_hex<S: AsRef<str>>(
        encoded: impl IntoIterator<Item = S>,
    ) -> Result<Self, FingerprintError> {
        let fingerprints = encoded
            .into_iter()
            .map(|s| Fingerprint::from_hex(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(fingerprints))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fingerprint> {
        self.fingerprints.get(index)
    }

    #[must_use]
    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fingerprint> {
        self.fingerprints.iter()
    }

    /// Cached popcount of every fingerprint, in store order
    #[must_use]
    pub fn popcounts(&self) -> Vec<u32> {
        self.fingerprints.iter().map(Fingerprint::popcount).collect()
    }

    /// Check that every fingerprint shares the bit length of the first one
    #[must_use]
    pub fn bit_length(&self) -> BitLength {
        let Some(first) = self.fingerprints.first() else {
            return BitLength::Empty;
        };
        let expected = first.bit_len();
        match self.fingerprints.iter().find(|fp| fp.bit_len() != expected) {
            Some(odd) => BitLength::Mixed {
                expected,
                found: odd.bit_len(),
            },
            None => BitLength::Uniform(expected),
        }
    }
}

impl From<Vec<Fingerprint>> for FingerprintStore {
    fn from(fingerprints: Vec<Fingerprint>) -> Self {
        Self::new(fingerprints)
    }
}

impl FromIterator<Fingerprint> for FingerprintStore {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FingerprintStore {
    type Item = &'a Fingerprint;
    type IntoIter = std::slice::Iter<'a, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.fingerprints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_length_uniform_and_empty() {
        assert_eq!(FingerprintStore::default().bit_length(), BitLength::Empty);

        let store = FingerprintStore::from_hex(["ff00", "0f0f", "0000"]).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.bit_length(), BitLength::Uniform(16));
        assert_eq!(store.popcounts(), vec![8, 8, 0]);
    }

    #[test]
    fn test_bit_length_mixed() {
        let store = FingerprintStore::from_hex(["ff00", "ff", "0000"]).unwrap();
        assert_eq!(
            store.bit_length(),
            BitLength::Mixed {
                expected: 16,
                found: 8
            }
        );
    }

    #[test]
    fn test_from_hex_propagates_error() {
        assert!(FingerprintStore::from_hex(["ff", "xyz1"]).is_err());
    }
}
