//! The soft renderer: back-filling, lighting, camera transform, rasterization.
//!
//! Pipeline for one `render` call:
//! 1. Optionally append reversed-winding copies of every face (`fill_back`)
//! 2. Light the textures (skipped for depth and silhouette modes)
//! 3. Resolve the camera for each batch item, transform and project vertices
//! 4. Soft-rasterize
//! 5. Keep the buffers the mode asks for

use super::config::{CameraSetup, ConfigError, RendererConfig};
use super::lighting::light_textures;
use super::rasterize::SoftRasterizer;
use crate::core::{
    faces_to_corners, Camera, ImageBatch, MeshBatch, PinholeCamera, ShapeError, TextureType,
    Textures,
};
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Errors raised by a render call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("textures are required to render {0:?} output")]
    MissingTextures(RenderMode),

    #[error("texture type {found:?} does not match the renderer's {expected:?}")]
    TextureTypeMismatch {
        expected: TextureType,
        found: TextureType,
    },

    #[error("projection camera has no intrinsics: pass `k` in the renderer config or the call")]
    MissingIntrinsics,

    #[error("camera overrides are only supported in projection mode (camera is {0})")]
    OverrideUnsupported(&'static str),
}

/// Which buffers a render call produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Color only.
    Rgb,
    /// Depth only.
    Depth,
    /// Alpha (coverage) only.
    Silhouette,
    /// Color, depth and alpha.
    #[default]
    Full,
}

impl RenderMode {
    fn needs_lighting(self) -> bool {
        matches!(self, RenderMode::Rgb | RenderMode::Full)
    }
}

/// Per-call projection parameters.
///
/// Each field holds either one value shared by the whole batch or one value per
/// batch item. Absent fields fall back to the renderer's configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraOverride {
    pub k: Option<Vec<Matrix3<f32>>>,
    pub rmat: Option<Vec<Matrix3<f32>>>,
    pub tvec: Option<Vec<Vector3<f32>>>,
}

impl CameraOverride {
    fn is_empty(&self) -> bool {
        self.k.is_none() && self.rmat.is_none() && self.tvec.is_none()
    }

    fn check_batch(&self, batch: usize) -> Result<(), ShapeError> {
        fn check<T>(tensor: &'static str, values: &Option<Vec<T>>, batch: usize) -> Result<(), ShapeError> {
            match values {
                Some(v) if v.len() != 1 && v.len() != batch => Err(ShapeError::BatchMismatch {
                    tensor,
                    expected: batch,
                    found: v.len(),
                }),
                _ => Ok(()),
            }
        }
        check("k", &self.k, batch)?;
        check("rmat", &self.rmat, batch)?;
        check("tvec", &self.tvec, batch)
    }
}

/// Value for batch item `b`, broadcasting a single entry.
fn pick<T: Copy>(values: &Option<Vec<T>>, b: usize) -> Option<T> {
    values
        .as_ref()
        .map(|v| if v.len() == 1 { v[0] } else { v[b] })
}

/// Buffers produced by `render`; absent when the mode excludes them.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// B x 3 x H x W.
    pub rgb: Option<ImageBatch>,

    /// B x 1 x H x W, nearest depth or `far` on the background.
    pub depth: Option<ImageBatch>,

    /// B x 1 x H x W, coverage in [0, 1].
    pub alpha: Option<ImageBatch>,
}

/// Differentiable soft renderer for batched triangle meshes.
#[derive(Debug)]
pub struct SoftRenderer {
    config: RendererConfig,
    camera: CameraSetup,
    texture_type: TextureType,
    rasterizer: SoftRasterizer,
}

impl SoftRenderer {
    /// Build a renderer, validating and resolving the whole configuration.
    pub fn new(config: RendererConfig) -> Result<Self, ConfigError> {
        let texture_type = TextureType::from_name(&config.texture_type)
            .ok_or_else(|| ConfigError::UnsupportedTextureType(config.texture_type.clone()))?;
        let camera = config.camera.resolve()?;
        let rasterizer = SoftRasterizer::from_config(&config)?;

        log::debug!(
            "soft renderer: {}px, camera {}, dist {}, rgb {}, alpha {}",
            config.image_size,
            config.camera.mode,
            config.dist_func,
            config.aggr_func_rgb,
            config.aggr_func_alpha,
        );

        Ok(Self {
            config,
            camera,
            texture_type,
            rasterizer,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Render a mesh batch with the renderer's own camera.
    pub fn render(
        &self,
        mesh: &MeshBatch,
        textures: Option<&Textures>,
        mode: RenderMode,
    ) -> Result<RenderOutput, RenderError> {
        self.render_with(mesh, textures, mode, &CameraOverride::default())
    }

    /// Render a mesh batch, overriding projection parameters for this call.
    pub fn render_with(
        &self,
        mesh: &MeshBatch,
        textures: Option<&Textures>,
        mode: RenderMode,
        overrides: &CameraOverride,
    ) -> Result<RenderOutput, RenderError> {
        mesh.validate()?;
        overrides.check_batch(mesh.batch_size())?;

        let resolution = match textures {
            Some(t) if t.texture_type != self.texture_type => {
                return Err(RenderError::TextureTypeMismatch {
                    expected: self.texture_type,
                    found: t.texture_type,
                });
            }
            Some(t) => Some(t.validate(&mesh.face_counts())?),
            None if mode.needs_lighting() => return Err(RenderError::MissingTextures(mode)),
            None => None,
        };

        let mesh = if self.config.fill_back {
            mesh.with_back_faces()
        } else {
            mesh.clone()
        };

        // Depth and silhouette never read colors: skip lighting and sampling.
        let textures = match textures {
            Some(t) if mode.needs_lighting() => {
                let t = if self.config.fill_back {
                    t.with_back_faces()
                } else {
                    t.clone()
                };
                let corners = faces_to_corners(&mesh)?;
                Some(light_textures(&corners, &t, &self.config.lighting))
            }
            _ => None,
        };

        let image_vertices = (0..mesh.batch_size())
            .map(|b| {
                let camera = self.camera_for(b, overrides)?;
                let cam_space = camera.transform_to_camera(&mesh.vertices[b]);
                Ok(camera.project_to_image(&cam_space, self.config.image_size))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let face_vertices = faces_to_corners(&mesh.with_vertices(image_vertices))?;
        log::debug!(
            "rendering {:?}: {} items, faces per item {:?}",
            mode,
            mesh.batch_size(),
            mesh.face_counts()
        );

        let out = self
            .rasterizer
            .rasterize_validated(&face_vertices, textures.as_ref().zip(resolution));

        Ok(match mode {
            RenderMode::Rgb => RenderOutput {
                rgb: Some(out.rgb),
                depth: None,
                alpha: None,
            },
            RenderMode::Depth => RenderOutput {
                rgb: None,
                depth: Some(out.depth),
                alpha: None,
            },
            RenderMode::Silhouette => RenderOutput {
                rgb: None,
                depth: None,
                alpha: Some(out.alpha),
            },
            RenderMode::Full => RenderOutput {
                rgb: Some(out.rgb),
                depth: Some(out.depth),
                alpha: Some(out.alpha),
            },
        })
    }

    /// Camera for batch item `b`: per-call override, else configured value.
    fn camera_for(&self, b: usize, overrides: &CameraOverride) -> Result<Camera, RenderError> {
        match &self.camera {
            CameraSetup::Projection(defaults) => {
                let k = pick(&overrides.k, b)
                    .or(defaults.k)
                    .ok_or(RenderError::MissingIntrinsics)?;
                let rotation = pick(&overrides.rmat, b).unwrap_or(defaults.rotation);
                let translation = pick(&overrides.tvec, b).unwrap_or(defaults.translation);
                Ok(Camera::Projection(PinholeCamera::new(k, rotation, translation)))
            }
            CameraSetup::Fixed(camera) => {
                if !overrides.is_empty() {
                    return Err(RenderError::OverrideUnsupported(camera.mode_name()));
                }
                Ok(camera.clone())
            }
        }
    }
}
