//! Differentiable operations (backward passes).
//!
//! Analytic derivatives of the soft rasterizer's smooth pieces, checked against
//! finite differences in `tests/gradient_check.rs`.

pub mod coverage_grad;
pub mod math_grad;

pub use coverage_grad::{coverage_with_grads, prod_alpha_backward, CoverageGrads};
