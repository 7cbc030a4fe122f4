//! Image-space triangles prepared for rasterization.

use crate::core::math::cross2;
use crate::core::FaceCorners;
use nalgebra::{Vector2, Vector3};

/// Twice the signed area below which a triangle is treated as degenerate.
pub const DEGENERATE_AREA: f32 = 1e-10;

/// A triangle in normalized image coordinates with per-corner depth.
#[derive(Clone, Debug)]
pub struct ScreenTriangle {
    /// Corner positions (x_ndc, y_ndc).
    pub p: [Vector2<f32>; 3],

    /// Camera-space depth of each corner.
    pub z: [f32; 3],

    /// Twice the signed area; the sign encodes the winding.
    pub area2: f32,

    /// Index of the face within its batch item.
    pub face: usize,
}

impl ScreenTriangle {
    pub fn from_corners(corners: &FaceCorners, face: usize) -> Self {
        let p = corners.map(|c| Vector2::new(c.x, c.y));
        let z = corners.map(|c| c.z);
        let area2 = cross2(&(p[1] - p[0]), &(p[2] - p[0]));
        Self { p, z, area2, face }
    }

    /// Zero-area or non-finite triangles cover nothing.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.p.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            && self.z.iter().all(|z| z.is_finite());
        !finite || !(self.area2.abs() >= DEGENERATE_AREA)
    }

    /// Barycentric coordinates of `q`. Independent of winding.
    pub fn barycentric(&self, q: &Vector2<f32>) -> Vector3<f32> {
        let [a, b, c] = &self.p;
        let w0 = cross2(&(b - q), &(c - q)) / self.area2;
        let w1 = cross2(&(c - q), &(a - q)) / self.area2;
        Vector3::new(w0, w1, 1.0 - w0 - w1)
    }

    /// Axis-aligned bounds (min, max) grown by `margin` on every side.
    pub fn bounds(&self, margin: f32) -> (Vector2<f32>, Vector2<f32>) {
        let [a, b, c] = &self.p;
        let min = Vector2::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y));
        let max = Vector2::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y));
        (min.add_scalar(-margin), max.add_scalar(margin))
    }

    /// Perspective-correct depth at (clipped) barycentric coordinates `w`.
    pub fn depth_at(&self, w: &Vector3<f32>) -> f32 {
        1.0 / (w.x / self.z[0] + w.y / self.z[1] + w.z / self.z[2])
    }

    /// Point at barycentric coordinates `w`.
    pub fn point_at(&self, w: &Vector3<f32>) -> Vector2<f32> {
        self.p[0] * w.x + self.p[1] * w.y + self.p[2] * w.z
    }
}

/// True when all barycentric coordinates are non-negative.
#[inline]
pub fn is_inside(w: &Vector3<f32>) -> bool {
    w.x >= 0.0 && w.y >= 0.0 && w.z >= 0.0
}
