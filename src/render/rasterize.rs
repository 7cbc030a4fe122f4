//! Soft rasterization of image-space triangles.
//!
//! For every pixel and every triangle the rasterizer computes a soft coverage
//!
//!   D = sigmoid(sign * d² / σ)
//!
//! where d is the distance from the pixel center to the triangle boundary
//! (sign: + inside, - outside). Coverages, depths and texture colors of all
//! triangles reaching a pixel are then combined by the configured color and
//! alpha aggregation policies, and the nearest fragment provides the depth.
//!
//! Fragments with coverage below `dist_eps` are dropped. In distance terms this
//! is `d² > σ · ln(1 / dist_eps - 1)` outside the triangle, which also gives a
//! conservative bounding box per triangle.
//!
//! Image layout: pixel (row, col) of an S x S image has its center at
//! x = (2 col + 1 - S) / S, y = (S - 1 - 2 row) / S, so row 0 is the top.

use super::aggregate::{
    alpha_aggregation, alpha_aggregation_names, color_aggregation, color_aggregation_names,
    AggregationParams, AlphaAggregation, ColorAggregation, Fragment,
};
use super::config::{ConfigError, RendererConfig};
use super::distance::{distance_function, distance_function_names, DistanceFunction};
use super::triangle::{is_inside, ScreenTriangle};
use crate::core::math::{barycentric_clip, sigmoid};
use crate::core::{
    sample_face_texture, FaceCorners, ImageBatch, ShapeError, TextureType, Textures,
};
use nalgebra::{Vector2, Vector3};
use rayon::prelude::*;

/// Rasterized buffers: rgb is B x 3 x H x W, depth and alpha B x 1 x H x W.
#[derive(Clone, Debug)]
pub struct RasterOutput {
    pub rgb: ImageBatch,
    pub depth: ImageBatch,
    pub alpha: ImageBatch,
}

/// Per-pixel result before it is scattered into the output buffers.
#[derive(Clone, Copy, Debug)]
struct PixelValue {
    rgb: Vector3<f32>,
    depth: f32,
    alpha: f32,
}

/// A triangle ready for the per-pixel loop.
struct Prepared<'a> {
    tri: ScreenTriangle,
    min: Vector2<f32>,
    max: Vector2<f32>,
    samples: Option<&'a [Vector3<f32>]>,
}

/// The soft rasterizer with its strategies resolved.
#[derive(Debug)]
pub struct SoftRasterizer {
    image_size: usize,
    anti_aliasing: bool,
    background: Vector3<f32>,
    near: f32,
    far: f32,
    sigma: f32,
    dist_eps: f32,
    params: AggregationParams,
    distance: Box<dyn DistanceFunction>,
    color: Box<dyn ColorAggregation>,
    alpha: Box<dyn AlphaAggregation>,
}

impl SoftRasterizer {
    /// Build from a renderer configuration, resolving function names.
    pub fn from_config(config: &RendererConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let distance = distance_function(&config.dist_func).ok_or_else(|| {
            ConfigError::UnknownFunction {
                kind: "distance function",
                name: config.dist_func.clone(),
                available: distance_function_names().join(", "),
            }
        })?;
        let color = color_aggregation(&config.aggr_func_rgb).ok_or_else(|| {
            ConfigError::UnknownFunction {
                kind: "rgb aggregation function",
                name: config.aggr_func_rgb.clone(),
                available: color_aggregation_names().join(", "),
            }
        })?;
        let alpha = alpha_aggregation(&config.aggr_func_alpha).ok_or_else(|| {
            ConfigError::UnknownFunction {
                kind: "alpha aggregation function",
                name: config.aggr_func_alpha.clone(),
                available: alpha_aggregation_names().join(", "),
            }
        })?;

        Ok(Self {
            image_size: config.image_size,
            anti_aliasing: config.anti_aliasing,
            background: config.background_color,
            near: config.near,
            far: config.far,
            sigma: config.sigma_val,
            dist_eps: config.dist_eps,
            params: AggregationParams {
                near: config.near,
                far: config.far,
                gamma: config.gamma_val,
                background_eps: config.background_eps,
            },
            distance,
            color,
            alpha,
        })
    }

    /// Squared distance beyond which an outside fragment is negligible:
    /// `σ · ln(1 / dist_eps - 1)`, evaluated in f64 so tiny `dist_eps` stay exact.
    pub fn distance_threshold(&self) -> f32 {
        let eps = self.dist_eps as f64;
        let logit = (1.0 / eps - 1.0).ln();
        ((self.sigma as f64) * logit).max(0.0) as f32
    }

    /// Rasterize image-space face corners (x_ndc, y_ndc, depth).
    ///
    /// `textures` must match the face layout; without textures the rgb buffer is
    /// the background color everywhere.
    pub fn rasterize(
        &self,
        face_vertices: &[Vec<FaceCorners>],
        textures: Option<&Textures>,
    ) -> Result<RasterOutput, ShapeError> {
        let face_counts: Vec<usize> = face_vertices.iter().map(Vec::len).collect();
        let textures = match textures {
            Some(t) => Some((t, t.validate(&face_counts)?)),
            None => None,
        };
        Ok(self.rasterize_validated(face_vertices, textures))
    }

    /// Rasterize with textures already checked against the face layout,
    /// paired with their surface resolution.
    pub(crate) fn rasterize_validated(
        &self,
        face_vertices: &[Vec<FaceCorners>],
        textures: Option<(&Textures, usize)>,
    ) -> RasterOutput {
        let size = if self.anti_aliasing {
            2 * self.image_size
        } else {
            self.image_size
        };

        let resolution = textures.map_or(1, |(_, r)| r);
        let out = self.rasterize_at(size, face_vertices, textures.map(|(t, _)| t), resolution);
        if self.anti_aliasing {
            RasterOutput {
                rgb: out.rgb.avg_pool2x2(),
                depth: out.depth.avg_pool2x2(),
                alpha: out.alpha.avg_pool2x2(),
            }
        } else {
            out
        }
    }

    fn rasterize_at(
        &self,
        size: usize,
        face_vertices: &[Vec<FaceCorners>],
        textures: Option<&Textures>,
        resolution: usize,
    ) -> RasterOutput {
        let batch = face_vertices.len();
        let mut rgb = ImageBatch::zeros(batch, 3, size, size);
        let mut depth = ImageBatch::zeros(batch, 1, size, size);
        let mut alpha = ImageBatch::zeros(batch, 1, size, size);

        let threshold = self.distance_threshold();
        let margin = threshold.sqrt();

        for (b, faces) in face_vertices.iter().enumerate() {
            let prepared: Vec<Prepared> = faces
                .iter()
                .enumerate()
                .map(|(f, corners)| ScreenTriangle::from_corners(corners, f))
                .filter(|tri| !tri.is_degenerate())
                .map(|tri| {
                    let (min, max) = tri.bounds(margin);
                    let samples = textures.map(|t| t.data[b][tri.face].as_slice());
                    Prepared {
                        tri,
                        min,
                        max,
                        samples,
                    }
                })
                .collect();

            let skipped = faces.len() - prepared.len();
            if skipped > 0 {
                log::warn!("batch item {b}: skipped {skipped} degenerate faces");
            }

            let texture_type = textures.map(|t| t.texture_type);
            let rows: Vec<Vec<PixelValue>> = (0..size)
                .into_par_iter()
                .map(|row| {
                    let mut fragments: Vec<Fragment> = Vec::new();
                    (0..size)
                        .map(|col| {
                            let pixel = pixel_center(row, col, size);
                            fragments.clear();
                            for p in &prepared {
                                if let Some(fragment) =
                                    self.fragment(p, &pixel, threshold, texture_type, resolution)
                                {
                                    fragments.push(fragment);
                                }
                            }
                            self.shade(&fragments, texture_type.is_some())
                        })
                        .collect()
                })
                .collect();

            for (row, values) in rows.iter().enumerate() {
                for (col, v) in values.iter().enumerate() {
                    for c in 0..3 {
                        rgb.set(b, c, row, col, v.rgb[c]);
                    }
                    depth.set(b, 0, row, col, v.depth);
                    alpha.set(b, 0, row, col, v.alpha);
                }
            }
        }

        RasterOutput { rgb, depth, alpha }
    }

    /// Soft fragment of one triangle at one pixel, or `None` if negligible or clipped.
    fn fragment(
        &self,
        p: &Prepared,
        pixel: &Vector2<f32>,
        threshold: f32,
        texture_type: Option<TextureType>,
        resolution: usize,
    ) -> Option<Fragment> {
        if pixel.x < p.min.x || pixel.x > p.max.x || pixel.y < p.min.y || pixel.y > p.max.y {
            return None;
        }

        let w = p.tri.barycentric(pixel);
        let inside = is_inside(&w);
        let dist = self.distance.squared_distance(&p.tri, pixel, &w, inside);
        if !inside && dist > threshold {
            return None;
        }

        let w_clip = barycentric_clip(&w);
        let depth = p.tri.depth_at(&w_clip);
        if !(depth >= self.near && depth <= self.far) {
            return None;
        }

        let sign = if inside { 1.0 } else { -1.0 };
        let coverage = sigmoid(sign * dist / self.sigma);

        let color = match (p.samples, texture_type) {
            (Some(samples), Some(tt)) => sample_face_texture(samples, tt, resolution, &w_clip),
            _ => Vector3::zeros(),
        };

        Some(Fragment {
            coverage,
            depth,
            inside,
            color,
        })
    }

    fn shade(&self, fragments: &[Fragment], textured: bool) -> PixelValue {
        let rgb = if textured {
            self.color
                .aggregate(fragments, &self.background, &self.params)
        } else {
            self.background
        };
        let depth = fragments
            .iter()
            .map(|f| f.depth)
            .fold(f32::INFINITY, f32::min)
            .min(self.far);
        let alpha = self.alpha.aggregate(fragments);

        PixelValue { rgb, depth, alpha }
    }
}

/// Center of pixel (row, col) in normalized image coordinates.
pub fn pixel_center(row: usize, col: usize, size: usize) -> Vector2<f32> {
    let s = size as f32;
    Vector2::new(
        (2.0 * col as f32 + 1.0 - s) / s,
        (s - 1.0 - 2.0 * row as f32) / s,
    )
}
