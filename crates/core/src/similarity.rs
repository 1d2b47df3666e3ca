//! Similarity functions used by the scoring engine.
//!
//! Vectors are stored as f32; products and norms are accumulated in f64 so that
//! 1536-dimension sums keep their precision. Cosine takes precomputed norms because
//! the query norm is computed once per query and entry norms once at ingestion.

use crate::tokenizer::TokenSet;

/// Euclidean norm of a vector.
#[inline]
pub fn norm(v: &[f32]) -> f64 {
    dot(v, v).sqrt()
}

/// Dot product of two equal-length vectors.
///
/// Four independent accumulators let the compiler vectorize the loop.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = [0.0f64; 4];
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_rem = a_chunks.remainder();
    let b_rem = b_chunks.remainder();
    for (ca, cb) in a_chunks.zip(b_chunks) {
        acc[0] += f64::from(ca[0]) * f64::from(cb[0]);
        acc[1] += f64::from(ca[1]) * f64::from(cb[1]);
        acc[2] += f64::from(ca[2]) * f64::from(cb[2]);
        acc[3] += f64::from(ca[3]) * f64::from(cb[3]);
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (x, y) in a_rem.iter().zip(b_rem) {
        sum += f64::from(*x) * f64::from(*y);
    }
    sum
}

/// Cosine similarity with both norms already known.
///
/// Returns 0.0 when either norm is zero or the result is not finite, so a
/// degenerate vector can never push NaN into a ranking.
#[inline]
pub fn cosine_prenorm(a: &[f32], b: &[f32], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot(a, b) / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Cosine similarity of two vectors. Mismatched dimensions score 0.0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    cosine_prenorm(a, b, norm(a), norm(b))
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`; 0.0 when both sets are empty.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = smaller.iter().filter(|t| larger.contains(t)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
