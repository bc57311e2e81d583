//! Trait vectors and cosine similarity.

use serde::Serialize;

use crate::catalog::{DIMENSION_COUNT, Dimension, ReferenceProfile};

/// Weight a profile's lower trigram contributes to its own dimension.
pub const LOWER_TRIGRAM_WEIGHT: f64 = 1.0;

/// Weight a profile's upper trigram contributes to its own dimension.
pub const UPPER_TRIGRAM_WEIGHT: f64 = 0.75;

/// An 8-dimensional trait vector in canonical dimension order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TraitVector([f64; DIMENSION_COUNT]);

impl TraitVector {
    pub fn new(values: [f64; DIMENSION_COUNT]) -> Self {
        Self(values)
    }

    /// Derived vector for a reference profile.
    ///
    /// The lower trigram anchors the profile at full weight and the upper
    /// trigram adds a smaller share, so a profile doubling one trigram peaks on
    /// that single dimension.
    pub fn for_profile(profile: &ReferenceProfile) -> Self {
        let mut v = Self::default();
        v.add(profile.lower().dimension(), LOWER_TRIGRAM_WEIGHT);
        v.add(profile.upper().dimension(), UPPER_TRIGRAM_WEIGHT);
        v
    }

    pub fn add(&mut self, dimension: Dimension, weight: f64) {
        self.0[dimension.index()] += weight;
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension.index()]
    }

    pub fn as_array(&self) -> &[f64; DIMENSION_COUNT] {
        &self.0
    }

    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        max_abs(&self.0)
    }

    /// True only when every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.max_abs() == 0.0
    }

    /// First non-finite component, if any.
    pub fn non_finite(&self) -> Option<(Dimension, f64)> {
        Dimension::ALL
            .into_iter()
            .map(|d| (d, self.get(d)))
            .find(|(_, v)| !v.is_finite())
    }

    /// Dimension with the largest component; the earliest dimension wins ties.
    pub fn dominant(&self) -> Dimension {
        let mut best = Dimension::ALL[0];
        for dim in Dimension::ALL {
            if self.get(dim) > self.get(best) {
                best = dim;
            }
        }
        best
    }
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
}

/// Cosine similarity clamped to `[-1, 1]`. Returns 0.0 when either vector has
/// no magnitude or a non-finite component.
///
/// Each vector is divided by its largest absolute component first. Cosine is
/// scale invariant, and the scaled components lie in `[-1, 1]`, so squaring
/// them can neither overflow nor underflow to zero.
pub fn cosine_similarity<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 || !scale_a.is_finite() || !scale_b.is_finite() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for i in 0..N {
        let x = a[i] / scale_a;
        let y = b[i] / scale_b;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(-1.0, 1.0)
    }
}

/// Linear rescale of a similarity from `[-1, 1]` to `[0, 100]`.
pub fn match_percentage(similarity: f64) -> f64 {
    (similarity + 1.0) / 2.0 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceCatalog;

    #[test]
    fn test_identical_vectors_are_fully_similar() {
        let a = [1.0, 2.0, 0.0, 0.5];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_opposite_and_orthogonal() {
        let a = [1.0, 0.0];
        assert!((cosine_similarity(&a, &[-2.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&a, &[0.0, 3.0]), 0.0);
    }

    #[test]
    fn test_zero_vector_yields_zero() {
        assert_eq!(cosine_similarity(&[0.0; 3], &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_extreme_magnitudes_keep_their_direction() {
        let axis = [0.0, 1.0, 0.0];
        assert!((cosine_similarity(&[0.0, 1e200, 0.0], &axis) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[0.0, 1e-200, 0.0], &axis) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[1e300, -1e300], &[1.0, 1.0])).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_input_yields_zero() {
        assert_eq!(cosine_similarity(&[f64::INFINITY, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[f64::NAN, 1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_tiny_vector_is_not_zero() {
        let mut v = TraitVector::default();
        v.add(Dimension::Action, 1e-17);
        assert!(!v.is_zero());
        assert!(TraitVector::default().is_zero());
    }

    #[test]
    fn test_match_percentage_endpoints() {
        assert_eq!(match_percentage(-1.0), 0.0);
        assert_eq!(match_percentage(0.0), 50.0);
        assert_eq!(match_percentage(1.0), 100.0);
        assert!(match_percentage(0.3) < match_percentage(0.31));
    }

    #[test]
    fn test_profile_vectors() {
        let catalog = ReferenceCatalog::builtin();

        let qian = TraitVector::for_profile(catalog.profile(1).unwrap());
        assert_eq!(qian.get(Dimension::Creativity), 1.75);
        assert_eq!(qian.dominant(), Dimension::Creativity);

        // 水雷屯: thunder below, water above.
        let tun = TraitVector::for_profile(catalog.profile(3).unwrap());
        assert_eq!(tun.get(Dimension::Action), LOWER_TRIGRAM_WEIGHT);
        assert_eq!(tun.get(Dimension::Exploration), UPPER_TRIGRAM_WEIGHT);
        assert_eq!(tun.dominant(), Dimension::Action);
    }

    #[test]
    fn test_profile_vectors_are_distinct() {
        let catalog = ReferenceCatalog::builtin();
        let vectors: Vec<TraitVector> = catalog.iter().map(TraitVector::for_profile).collect();
        for (i, a) in vectors.iter().enumerate() {
            for b in &vectors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
