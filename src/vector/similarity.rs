//! Vector Similarity Functions
//!
//! Dot product, magnitude, cosine similarity and negation kernels.

/// Dot product of two equal-length vectors
///
/// Four independent lanes let the compiler vectorize the main loop.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut lanes_a = a.chunks_exact(4);
    let mut lanes_b = b.chunks_exact(4);
    let mut acc = [0.0f32; 4];

    for (xa, xb) in (&mut lanes_a).zip(&mut lanes_b) {
        for ((lane, x), y) in acc.iter_mut().zip(xa).zip(xb) {
            *lane += x * y;
        }
    }

    let tail: f32 = lanes_a
        .remainder()
        .iter()
        .zip(lanes_b.remainder())
        .map(|(x, y)| x * y)
        .sum();

    acc.iter().sum::<f32>() + tail
}

/// L2 norm of a vector
#[inline]
pub fn magnitude(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// Cosine similarity from a dot product and the two magnitudes
///
/// Returns 0.0 when either magnitude is zero, and clamps the result into
/// `[-1, 1]` so rounding never pushes a score past the valid range.
/// Overflowed inputs (inf / inf) also score 0.0.
#[inline]
pub fn cosine_from_parts(dot: f32, mag_a: f32, mag_b: f32) -> f32 {
    let denom = mag_a * mag_b;
    if denom > 0.0 {
        let score = dot / denom;
        if score.is_nan() {
            0.0
        } else {
            score.clamp(-1.0, 1.0)
        }
    } else {
        0.0
    }
}

/// Compute cosine similarity between two vectors
///
/// Returns value in range [-1, 1] where 1 means identical direction.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    cosine_from_parts(dot_product(a, b), magnitude(a), magnitude(b))
}

/// Component-wise negation into a new vector
pub fn negate(v: &[f32]) -> Vec<f32> {
    v.iter().map(|x| -x).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        assert!((dot_product(&a, &b) - 32.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_product_unrolled_remainder() {
        let a = vec![1.0; 9];
        let b = vec![2.0; 9];
        assert!((dot_product(&a, &b) - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_product_matches_naive_sum() {
        for len in 0..13 {
            let a: Vec<f32> = (0..len).map(|i| i as f32 - 3.0).collect();
            let b: Vec<f32> = (0..len).map(|i| 0.5 * i as f32).collect();
            let naive: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
            assert!((dot_product(&a, &b) - naive).abs() < 1e-4, "len {}", len);
        }
    }

    #[test]
    fn test_magnitude() {
        assert!((magnitude(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
        assert_eq!(magnitude(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&[1.0, -2.0, 0.5]), vec![-1.0, 2.0, -0.5]);
        assert!(negate(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn negate_is_an_involution(v in prop::collection::vec(-1e6f32..1e6, 0..64)) {
            prop_assert_eq!(negate(&negate(&v)), v);
        }

        #[test]
        fn cosine_stays_in_range(
            pair in (1usize..32).prop_flat_map(|d| (
                prop::collection::vec(-1e3f32..1e3, d),
                prop::collection::vec(-1e3f32..1e3, d),
            ))
        ) {
            let (a, b) = pair;
            let score = cosine_similarity(&a, &b);
            prop_assert!((-1.0..=1.0).contains(&score));
        }
    }
}
