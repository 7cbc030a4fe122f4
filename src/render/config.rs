//! Renderer configuration.
//!
//! Everything here is fixed when a `SoftRenderer` is built. Names (camera mode,
//! distance function, aggregation policies, texture type) are resolved and
//! validated eagerly, so a bad configuration never reaches a render call.

use super::lighting::LightingConfig;
use crate::core::camera::{default_eye, DEFAULT_AT, DEFAULT_DIRECTION, DEFAULT_UP};
use crate::core::{Camera, Projector};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors detected while building a renderer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported camera mode '{0}' (expected projection, look or look_at)")]
    UnsupportedCameraMode(String),

    #[error("unsupported texture type '{0}' (expected surface or vertex)")]
    UnsupportedTextureType(String),

    #[error("unknown {kind} '{name}' (available: {available})")]
    UnknownFunction {
        kind: &'static str,
        name: String,
        available: String,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Camera placement, as configured.
///
/// Only the fields relevant to `mode` are read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// One of `projection`, `look`, `look_at`.
    pub mode: String,

    /// Projection intrinsics. May instead be supplied per render call.
    pub k: Option<Matrix3<f32>>,

    /// Projection rotation (identity when absent).
    pub rmat: Option<Matrix3<f32>>,

    /// Projection translation (zero when absent).
    pub tvec: Option<Vector3<f32>>,

    /// Look / look-at eye (derived from `viewing_angle` when absent).
    pub eye: Option<Vector3<f32>>,

    /// Look-at target.
    pub at: Option<Vector3<f32>>,

    /// Look direction.
    pub direction: Option<Vector3<f32>>,

    pub up: Option<Vector3<f32>>,

    /// Use field-of-view foreshortening (look / look-at); orthographic otherwise.
    pub perspective_distort: bool,

    /// Degrees.
    pub viewing_angle: f32,

    /// Orthographic scale.
    pub viewing_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: "look_at".to_string(),
            k: None,
            rmat: None,
            tvec: None,
            eye: None,
            at: None,
            direction: None,
            up: None,
            perspective_distort: true,
            viewing_angle: 30.0,
            viewing_scale: 1.0,
        }
    }
}

/// Projection camera whose intrinsics may arrive with each render call.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionDefaults {
    pub k: Option<Matrix3<f32>>,
    pub rotation: Matrix3<f32>,
    pub translation: Vector3<f32>,
}

/// Camera strategy selected at construction.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraSetup {
    Projection(ProjectionDefaults),

    /// Look and look-at cameras are complete at construction.
    Fixed(Camera),
}

impl CameraConfig {
    pub fn look_at(eye: Vector3<f32>, at: Vector3<f32>, up: Vector3<f32>) -> Self {
        Self {
            mode: "look_at".to_string(),
            eye: Some(eye),
            at: Some(at),
            up: Some(up),
            ..Self::default()
        }
    }

    pub fn look(eye: Vector3<f32>, direction: Vector3<f32>, up: Vector3<f32>) -> Self {
        Self {
            mode: "look".to_string(),
            eye: Some(eye),
            direction: Some(direction),
            up: Some(up),
            ..Self::default()
        }
    }

    pub fn projection(k: Matrix3<f32>, rmat: Matrix3<f32>, tvec: Vector3<f32>) -> Self {
        Self {
            mode: "projection".to_string(),
            k: Some(k),
            rmat: Some(rmat),
            tvec: Some(tvec),
            ..Self::default()
        }
    }

    /// Resolve the configured mode into a camera strategy.
    pub fn resolve(&self) -> Result<CameraSetup, ConfigError> {
        let projector = || -> Result<Projector, ConfigError> {
            if self.perspective_distort {
                if !(self.viewing_angle > 0.0 && self.viewing_angle < 90.0) {
                    return Err(ConfigError::InvalidValue {
                        field: "camera.viewing_angle",
                        reason: format!("{} is outside (0, 90) degrees", self.viewing_angle),
                    });
                }
                Ok(Projector::Perspective {
                    viewing_angle: self.viewing_angle,
                })
            } else {
                Ok(Projector::Orthographic {
                    scale: self.viewing_scale,
                })
            }
        };
        let eye = || self.eye.unwrap_or_else(|| default_eye(self.viewing_angle));
        let up = self.up.unwrap_or_else(|| Vector3::from(DEFAULT_UP));

        match self.mode.as_str() {
            "projection" => Ok(CameraSetup::Projection(ProjectionDefaults {
                k: self.k,
                rotation: self.rmat.unwrap_or_else(Matrix3::identity),
                translation: self.tvec.unwrap_or_else(Vector3::zeros),
            })),
            "look" => Ok(CameraSetup::Fixed(Camera::Look {
                eye: eye(),
                direction: self
                    .direction
                    .unwrap_or_else(|| Vector3::from(DEFAULT_DIRECTION)),
                up,
                projector: projector()?,
            })),
            "look_at" => Ok(CameraSetup::Fixed(Camera::LookAt {
                eye: eye(),
                at: self.at.unwrap_or_else(|| Vector3::from(DEFAULT_AT)),
                up,
                projector: projector()?,
            })),
            other => Err(ConfigError::UnsupportedCameraMode(other.to_string())),
        }
    }
}

/// Full renderer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Side length of the (square) output image in pixels.
    pub image_size: usize,

    /// Render at twice the size and average-pool 2x2 blocks.
    pub anti_aliasing: bool,

    pub background_color: Vector3<f32>,

    /// Also rasterize a reversed-winding copy of every face.
    pub fill_back: bool,

    pub camera: CameraConfig,

    /// Fragments nearer than this are clipped.
    pub near: f32,

    /// Fragments farther than this are clipped; also the background depth.
    pub far: f32,

    /// Sharpness of the coverage sigmoid (in squared NDC units).
    pub sigma_val: f32,

    /// Softmax temperature of the color aggregation.
    pub gamma_val: f32,

    /// Distance function name.
    pub dist_func: String,

    /// Coverage below which a fragment is ignored.
    pub dist_eps: f32,

    /// Normalized depth of the background in the color softmax.
    pub background_eps: f32,

    pub aggr_func_rgb: String,
    pub aggr_func_alpha: String,
    pub texture_type: String,
    pub lighting: LightingConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            image_size: 256,
            anti_aliasing: true,
            background_color: Vector3::zeros(),
            fill_back: true,
            camera: CameraConfig::default(),
            near: 1.0,
            far: 100.0,
            sigma_val: 1e-5,
            gamma_val: 1e-4,
            dist_func: "euclidean".to_string(),
            dist_eps: 1e-4,
            background_eps: 1e-3,
            aggr_func_rgb: "softmax".to_string(),
            aggr_func_alpha: "prod".to_string(),
            texture_type: "surface".to_string(),
            lighting: LightingConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the numeric fields. Names are checked when resolving them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: String) -> ConfigError {
            ConfigError::InvalidValue { field, reason }
        }

        if self.image_size == 0 {
            return Err(invalid("image_size", "must be positive".to_string()));
        }
        if !(self.sigma_val > 0.0) {
            return Err(invalid("sigma_val", format!("{} is not positive", self.sigma_val)));
        }
        if !(self.gamma_val > 0.0) {
            return Err(invalid("gamma_val", format!("{} is not positive", self.gamma_val)));
        }
        if !(self.dist_eps > 0.0 && self.dist_eps < 1.0) {
            return Err(invalid("dist_eps", format!("{} is outside (0, 1)", self.dist_eps)));
        }
        if !(self.near < self.far) {
            return Err(invalid(
                "near",
                format!("near ({}) must be less than far ({})", self.near, self.far),
            ));
        }
        Ok(())
    }
}
