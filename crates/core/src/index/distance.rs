//! Vector math for cosine similarity over unit-normalized vectors.
//!
//! Both stored and query vectors are normalized with the same epsilon guard,
//! so cosine similarity reduces to [`dot_product`]. The dot product uses
//! four independent accumulators to let the compiler vectorize the loop.

use crate::config::NORM_EPSILON;

/// Dot product of two equal-length slices.
///
/// Extra trailing elements of the longer slice are ignored; callers check
/// dimensions before scoring.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let mut acc = [0.0f32; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let rem_a = chunks_a.remainder();
    let rem_b = chunks_b.remainder();
    for (ca, cb) in chunks_a.zip(chunks_b) {
        acc[0] += ca[0] * cb[0];
        acc[1] += ca[1] * cb[1];
        acc[2] += ca[2] * cb[2];
        acc[3] += ca[3] * cb[3];
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (x, y) in rem_a.iter().zip(rem_b) {
        sum += x * y;
    }
    sum
}

/// Euclidean (L2) norm.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// Scales `v` to unit length: `v / (‖v‖ + ε)`.
///
/// A zero vector stays zero instead of producing NaN.
pub fn normalize_in_place(v: &mut [f32]) {
    let denom = l2_norm(v) + NORM_EPSILON;
    for x in v.iter_mut() {
        *x /= denom;
    }
}

/// Returns a unit-length copy of `v`.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product_with_remainder() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let d = dot_product(&a, &b);
        assert!((d - 56.0).abs() < 1e-5, "expected 56, got {d}");
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = normalized(&[3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_stays_finite() {
        let v = normalized(&[0.0, 0.0, 0.0]);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        let a = normalized(&[1.0, 0.0, 0.0]);
        let b = normalized(&[0.0, 2.0, 0.0]);
        let c = normalized(&[-5.0, 0.0, 0.0]);
        assert!(dot_product(&a, &b).abs() < 1e-6);
        assert!((dot_product(&a, &c) + 1.0).abs() < 1e-6);
    }
}
