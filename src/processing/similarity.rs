//! Cosine similarity shared by the lexical and semantic scorers

use crate::error::{Result, ScanError};

/// `dot(a, b) / (|a| * |b|)`, defined as 0.0 when either vector has zero norm.
///
/// Accumulates in f64 and clamps to [-1, 1] so identical vectors score exactly 1.0
/// and rounding never escapes the cosine range.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScanError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        return Ok(0.0);
    }
    Ok(score.clamp(-1.0, 1.0) as f32)
}
