//! Gradients of soft coverage with respect to triangle geometry.
//!
//! Forward (euclidean distance, one triangle, one pixel p):
//!   c_e  = a_e + t_e (b_e - a_e),  t_e = clamp(((p - a_e)·(b_e - a_e)) / |b_e - a_e|², 0, 1)
//!   d²   = min_e |p - c_e|²
//!   D    = sigmoid(s · d² / σ),     s = +1 inside, -1 outside
//!
//! For the nearest edge (a, b), t is optimal, so its own derivative drops out:
//!   ∂d²/∂a = -2 (1 - t) (p - c)
//!   ∂d²/∂b = -2 t (p - c)
//! The inside/outside sign is piecewise constant and D is continuous across the
//! boundary (d² = 0 there), so it contributes no gradient. Through the sigmoid,
//! dD/d(d²) = D (1 - D) · s / σ.
//!
//! Also provides the backward pass of the `prod` alpha aggregation.

use super::math_grad::{coverage_grad_distance, coverage_grad_sigma};
use crate::core::math::{cross2, sigmoid};
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug)]
pub struct CoverageGrads {
    /// Soft coverage D.
    pub value: f32,

    /// Signed squared distance s · d².
    pub signed_distance: f32,

    /// dD/d(vertex k).
    pub d_vertices: [Vector2<f32>; 3],

    /// dD/dσ.
    pub d_sigma: f32,
}

/// Soft coverage of `pixel` by triangle `p` and its gradient w.r.t. the corners.
///
/// Assumes a non-degenerate triangle.
pub fn coverage_with_grads(p: &[Vector2<f32>; 3], pixel: &Vector2<f32>, sigma: f32) -> CoverageGrads {
    let area2 = cross2(&(p[1] - p[0]), &(p[2] - p[0]));
    let w0 = cross2(&(p[1] - pixel), &(p[2] - pixel)) / area2;
    let w1 = cross2(&(p[2] - pixel), &(p[0] - pixel)) / area2;
    let w2 = 1.0 - w0 - w1;
    let inside = w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0;
    let sign = if inside { 1.0 } else { -1.0 };

    // Nearest edge and its closest point.
    let mut best = (f32::INFINITY, 0usize, 0.0f32, Vector2::zeros());
    for e in 0..3 {
        let a = p[e];
        let b = p[(e + 1) % 3];
        let ab = b - a;
        let len_sq = ab.norm_squared();
        let t = if len_sq > 0.0 {
            ((pixel - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let diff = pixel - (a + ab * t);
        let dist = diff.norm_squared();
        if dist < best.0 {
            best = (dist, e, t, diff);
        }
    }
    let (dist, edge, t, diff) = best;

    let signed_distance = sign * dist;
    let value = sigmoid(signed_distance / sigma);

    let d_value_d_dist = coverage_grad_distance(value, sign, sigma);

    let mut d_vertices = [Vector2::zeros(); 3];
    d_vertices[edge] = diff * (-2.0 * (1.0 - t) * d_value_d_dist);
    d_vertices[(edge + 1) % 3] = diff * (-2.0 * t * d_value_d_dist);

    CoverageGrads {
        value,
        signed_distance,
        d_vertices,
        d_sigma: coverage_grad_sigma(value, signed_distance, sigma),
    }
}

/// Backward pass of `alpha = 1 - Π (1 - D_i)`.
///
/// Returns dL/dD_i given the upstream dL/d(alpha).
pub fn prod_alpha_backward(coverages: &[f32], d_alpha: f32) -> Vec<f32> {
    (0..coverages.len())
        .map(|i| {
            let others: f32 = coverages
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, d)| 1.0 - d)
                .product();
            d_alpha * others
        })
        .collect()
}
