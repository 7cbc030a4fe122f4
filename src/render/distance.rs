//! Distance functions: how far a pixel lies from a triangle's boundary.
//!
//! Each function returns an unsigned *squared* distance in normalized image
//! units; the rasterizer attaches the sign (positive inside, negative outside)
//! from the barycentric inside test. Functions are looked up by name once, when
//! the renderer is built.

use super::triangle::ScreenTriangle;
use crate::core::math::{barycentric_clip, point_segment_distance_sq};
use nalgebra::{Vector2, Vector3};
use std::fmt::Debug;

/// Squared distance from a pixel center to a triangle boundary.
pub trait DistanceFunction: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// `w` are the (unclipped) barycentric coordinates of `pixel`; `inside`
    /// tells whether they are all non-negative.
    fn squared_distance(
        &self,
        tri: &ScreenTriangle,
        pixel: &Vector2<f32>,
        w: &Vector3<f32>,
        inside: bool,
    ) -> f32;
}

/// Exact distance to the nearest edge segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl DistanceFunction for Euclidean {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    fn squared_distance(
        &self,
        tri: &ScreenTriangle,
        pixel: &Vector2<f32>,
        _w: &Vector3<f32>,
        _inside: bool,
    ) -> f32 {
        let [a, b, c] = &tri.p;
        point_segment_distance_sq(pixel, a, b)
            .min(point_segment_distance_sq(pixel, b, c))
            .min(point_segment_distance_sq(pixel, c, a))
    }
}

/// Distance derived from barycentric coordinates.
///
/// Inside, `w_k` times the altitude onto edge k is the distance to that edge's
/// line. Outside, the distance runs to the point at the clipped coordinates,
/// which is cheaper than the exact segment test but overestimates near corners.
#[derive(Clone, Copy, Debug, Default)]
pub struct Barycentric;

impl DistanceFunction for Barycentric {
    fn name(&self) -> &'static str {
        "barycentric"
    }

    fn squared_distance(
        &self,
        tri: &ScreenTriangle,
        pixel: &Vector2<f32>,
        w: &Vector3<f32>,
        inside: bool,
    ) -> f32 {
        if inside {
            let [a, b, c] = &tri.p;
            // Edge opposite corner k.
            let edges = [(c - b).norm(), (a - c).norm(), (b - a).norm()];
            let area2 = tri.area2.abs();
            (0..3)
                .map(|k| {
                    let d = w[k] * area2 / edges[k];
                    d * d
                })
                .fold(f32::INFINITY, f32::min)
        } else {
            let q = tri.point_at(&barycentric_clip(w));
            (pixel - q).norm_squared()
        }
    }
}

type DistanceCtor = fn() -> Box<dyn DistanceFunction>;

fn euclidean() -> Box<dyn DistanceFunction> {
    Box::new(Euclidean)
}

fn barycentric() -> Box<dyn DistanceFunction> {
    Box::new(Barycentric)
}

const REGISTRY: &[(&str, DistanceCtor)] = &[("euclidean", euclidean), ("barycentric", barycentric)];

/// Look up a distance function by name.
pub fn distance_function(name: &str) -> Option<Box<dyn DistanceFunction>> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ctor)| ctor())
}

/// Names accepted by `distance_function`.
pub fn distance_function_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(n, _)| *n).collect()
}
