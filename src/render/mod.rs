//! Forward rendering pipeline.
//!
//! This module implements the soft rasterizer and the renderer around it:
//! - Lighting of per-face textures
//! - Soft coverage from signed distances (`distance`)
//! - Per-pixel aggregation of color, alpha and depth (`aggregate`)
//! - Rasterization and the `SoftRenderer` facade

pub mod aggregate;
pub mod config;
pub mod distance;
pub mod lighting;
pub mod rasterize;
pub mod renderer;
pub mod triangle;

// Re-export
pub use config::{CameraConfig, ConfigError, RendererConfig};
pub use lighting::{ambient_light, apply_lighting, directional_light, LightingConfig};
pub use rasterize::{RasterOutput, SoftRasterizer};
pub use renderer::{CameraOverride, RenderError, RenderMode, RenderOutput, SoftRenderer};
