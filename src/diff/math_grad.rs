//! Scalar derivatives of the coverage sigmoid.
//!
//! Coverage is `D = sigmoid(s · d² / σ)` with `s = ±1`; everything here is a
//! function of the already computed `D`, so no exponentials are re-evaluated.

/// dσ/dx = σ(x) (1 - σ(x)).
pub fn sigmoid_grad_from_sigmoid(sigmoid_x: f32) -> f32 {
    sigmoid_x * (1.0 - sigmoid_x)
}

/// dD/d(d²) for a pixel inside (`sign = 1`) or outside (`sign = -1`).
pub fn coverage_grad_distance(coverage: f32, sign: f32, sigma: f32) -> f32 {
    sigmoid_grad_from_sigmoid(coverage) * sign / sigma
}

/// dD/dσ given the signed squared distance `s · d²`.
///
/// Raising σ pulls every coverage towards 1/2.
pub fn coverage_grad_sigma(coverage: f32, signed_distance: f32, sigma: f32) -> f32 {
    -sigmoid_grad_from_sigmoid(coverage) * signed_distance / (sigma * sigma)
}

/// d/dp logit(p) = 1 / (p (1 - p)).
///
/// `inverse_sigmoid` clamps `p` into [1e-6, 1 - 1e-6]; this does not.
pub fn inverse_sigmoid_grad(p: f32) -> f32 {
    1.0 / (p * (1.0 - p))
}
