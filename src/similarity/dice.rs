use crate::core::fingerprint::Fingerprint;

/// Dice coefficient from an intersection count and the two popcounts.
///
/// Two empty fingerprints score 0.0 rather than NaN so they can never
/// produce a match.
#[inline]
#[must_use]
pub fn dice_from_counts(intersection: u32, popcount_a: u32, popcount_b: u32) -> f64 {
    let total = popcount_a + popcount_b;
    if total == 0 {
        0.0
    } else {
        2.0 * f64::from(intersection) / f64::from(total)
    }
}

/// Dice coefficient `2|A ∩ B| / (|A| + |B|)` of two fingerprints.
///
/// Uses the popcounts cached on each fingerprint; only the intersection is
/// counted here, a word at a time.
///
/// # Examples
///
/// ```
/// use bloomlink::core::Fingerprint;
/// use bloomlink::similarity::dice_coefficient;
///
/// let a = Fingerprint::from_hex("f0").unwrap();
/// let b = Fingerprint::from_hex("3c").unwrap();
/// assert!((dice_coefficient(&a, &b) - 0.5).abs() < 1e-12);
/// assert!((dice_coefficient(&a, &a) - 1.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn dice_coefficient(a: &Fingerprint, b: &Fingerprint) -> f64 {
    dice_from_counts(a.intersection_count(b), a.popcount(), b.popcount())
}

/// Largest Dice coefficient two fingerprints with these popcounts could reach.
///
/// The intersection can never exceed the smaller popcount, so any pair whose
/// bound is below a cut-off can be skipped without touching the bit data.
/// Shares the denominator with [`dice_from_counts`], so the real score never
/// exceeds it even after rounding.
#[inline]
#[must_use]
pub fn dice_upper_bound(popcount_a: u32, popcount_b: u32) -> f64 {
    dice_from_counts(popcount_a.min(popcount_b), popcount_a, popcount_b)
}
