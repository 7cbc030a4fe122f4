//! Mathematical utilities (activation functions, safe normalization, 2D geometry).

use nalgebra::{Vector2, Vector3};

/// Epsilon used when normalizing camera basis vectors.
pub const BASIS_EPS: f32 = 1e-5;

/// Sigmoid activation function: σ(x) = 1 / (1 + e^(-x))
///
/// Maps R → (0, 1)
/// Used to turn a signed distance into a soft coverage probability.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Inverse sigmoid (logit): logit(p) = log(p / (1-p))
///
/// Used to turn the negligible-coverage probability into a distance cutoff.
pub fn inverse_sigmoid(p: f32) -> f32 {
    // Clamp to avoid log(0) or division by zero
    let p_clamped = p.clamp(1e-6, 1.0 - 1e-6);
    (p_clamped / (1.0 - p_clamped)).ln()
}

/// Normalize `v`, dividing by `max(|v|, eps)`.
///
/// A zero vector stays zero instead of turning into NaN; callers that build a
/// basis from it get a degenerate (but finite) rotation.
pub fn normalize_eps(v: &Vector3<f32>, eps: f32) -> Vector3<f32> {
    v / v.norm().max(eps)
}

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross2(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Squared distance from `p` to the segment `[a, b]`.
pub fn point_segment_distance_sq(p: &Vector2<f32>, a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    let t = if len_sq > 0.0 {
        (ap.dot(&ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (ap - ab * t).norm_squared()
}

/// Clip barycentric coordinates into the triangle: clamp to [0, 1] and renormalize.
pub fn barycentric_clip(w: &Vector3<f32>) -> Vector3<f32> {
    let clamped = w.map(|c| c.clamp(0.0, 1.0));
    let sum = clamped.sum();
    if sum > 0.0 {
        clamped / sum
    } else {
        Vector3::repeat(1.0 / 3.0)
    }
}
