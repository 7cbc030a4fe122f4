//! Aggregation of per-triangle fragments into one pixel value.
//!
//! Forward (per pixel, over the fragments of every triangle that reaches it):
//!   D_i   = sigmoid(±d_i / σ)        soft coverage
//!   z_i   = perspective-correct depth
//!   c_i   = texture sample
//!
//! Color policies combine (D_i, z_i, c_i) and the background; alpha policies
//! combine the D_i alone. Both are chosen by name when the renderer is built.

use nalgebra::Vector3;
use std::fmt::Debug;

/// One triangle's contribution to one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    /// Soft coverage in (0, 1).
    pub coverage: f32,

    /// Camera-space depth at the pixel.
    pub depth: f32,

    /// Whether the pixel center lies inside the triangle.
    pub inside: bool,

    /// Texture color at the pixel.
    pub color: Vector3<f32>,
}

/// Scalars shared by the color policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregationParams {
    pub near: f32,
    pub far: f32,

    /// Softmax temperature over normalized depth.
    pub gamma: f32,

    /// Normalized depth assigned to the background in the softmax.
    pub background_eps: f32,
}

pub trait ColorAggregation: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn aggregate(
        &self,
        fragments: &[Fragment],
        background: &Vector3<f32>,
        params: &AggregationParams,
    ) -> Vector3<f32>;
}

pub trait AlphaAggregation: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn aggregate(&self, fragments: &[Fragment]) -> f32;
}

/// Coverage-weighted softmax over normalized inverse depth.
///
///   w_i  = D_i exp(z̃_i / γ),  z̃_i = (far - z_i) / (far - near)
///   w_bg = exp(ε / γ)
///   out  = (Σ w_i c_i + w_bg bg) / (Σ w_i + w_bg)
///
/// As γ → 0 the nearest covering triangle wins; large γ blends everything.
/// Evaluated with a running maximum so the exponentials never overflow.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftmaxColor;

impl ColorAggregation for SoftmaxColor {
    fn name(&self) -> &'static str {
        "softmax"
    }

    fn aggregate(
        &self,
        fragments: &[Fragment],
        background: &Vector3<f32>,
        params: &AggregationParams,
    ) -> Vector3<f32> {
        if fragments.is_empty() {
            return *background;
        }

        let gamma = params.gamma;
        let mut z_max = params.background_eps;
        let mut weight_sum = 0.0f32;
        let mut color = Vector3::<f32>::zeros();

        for f in fragments {
            let z_norm = (params.far - f.depth) / (params.far - params.near);
            let mut rescale = 1.0f32;
            if z_norm > z_max {
                rescale = ((z_max - z_norm) / gamma).exp();
                z_max = z_norm;
            }
            let weight = ((z_norm - z_max) / gamma).exp() * f.coverage;
            weight_sum = rescale * weight_sum + weight;
            color = color * rescale + f.color * weight;
        }

        let background_weight = ((params.background_eps - z_max) / gamma).exp();
        (color + background * background_weight) / (weight_sum + background_weight)
    }
}

/// Color of the nearest triangle containing the pixel center; background otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct HardColor;

impl ColorAggregation for HardColor {
    fn name(&self) -> &'static str {
        "hard"
    }

    fn aggregate(
        &self,
        fragments: &[Fragment],
        background: &Vector3<f32>,
        _params: &AggregationParams,
    ) -> Vector3<f32> {
        fragments
            .iter()
            .filter(|f| f.inside)
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
            .map_or(*background, |f| f.color)
    }
}

/// Probabilistic union: `1 - Π (1 - D_i)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProdAlpha;

impl AlphaAggregation for ProdAlpha {
    fn name(&self) -> &'static str {
        "prod"
    }

    fn aggregate(&self, fragments: &[Fragment]) -> f32 {
        1.0 - fragments.iter().map(|f| 1.0 - f.coverage).product::<f32>()
    }
}

/// Saturating sum: `clamp(Σ D_i, 0, 1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumAlpha;

impl AlphaAggregation for SumAlpha {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn aggregate(&self, fragments: &[Fragment]) -> f32 {
        fragments.iter().map(|f| f.coverage).sum::<f32>().clamp(0.0, 1.0)
    }
}

type ColorCtor = fn() -> Box<dyn ColorAggregation>;
type AlphaCtor = fn() -> Box<dyn AlphaAggregation>;

fn softmax_color() -> Box<dyn ColorAggregation> {
    Box::new(SoftmaxColor)
}

fn hard_color() -> Box<dyn ColorAggregation> {
    Box::new(HardColor)
}

fn prod_alpha() -> Box<dyn AlphaAggregation> {
    Box::new(ProdAlpha)
}

fn sum_alpha() -> Box<dyn AlphaAggregation> {
    Box::new(SumAlpha)
}

const COLOR_REGISTRY: &[(&str, ColorCtor)] = &[("softmax", softmax_color), ("hard", hard_color)];
const ALPHA_REGISTRY: &[(&str, AlphaCtor)] = &[("prod", prod_alpha), ("sum", sum_alpha)];

/// Look up a color aggregation policy by name.
pub fn color_aggregation(name: &str) -> Option<Box<dyn ColorAggregation>> {
    COLOR_REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ctor)| ctor())
}

/// Look up an alpha aggregation policy by name.
pub fn alpha_aggregation(name: &str) -> Option<Box<dyn AlphaAggregation>> {
    ALPHA_REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ctor)| ctor())
}

pub fn color_aggregation_names() -> Vec<&'static str> {
    COLOR_REGISTRY.iter().map(|(n, _)| *n).collect()
}

pub fn alpha_aggregation_names() -> Vec<&'static str> {
    ALPHA_REGISTRY.iter().map(|(n, _)| *n).collect()
}
