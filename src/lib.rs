//! # softras-rs: Soft Rasterizer in Rust
//!
//! A differentiable renderer for batched triangle meshes. Instead of a binary
//! inside/outside test, every triangle covers every nearby pixel with a
//! probability `sigmoid(±d² / σ)` of the pixel's distance to its boundary, and
//! colors are blended with a softmax over depth. The result is an image that
//! varies smoothly with vertex positions.
//!
//! ## Architecture
//!
//! - `core`: meshes, textures, cameras, image buffers, math utilities
//! - `render`: lighting, soft rasterization and the `SoftRenderer` facade
//! - `diff`: analytic gradients of coverage and alpha aggregation
//!
//! ## Example
//!
//! ```no_run
//! use nalgebra::Vector3;
//! use softras_rs::core::{MeshBatch, TextureType, Textures};
//! use softras_rs::render::{RenderMode, RendererConfig, SoftRenderer};
//!
//! let mesh = MeshBatch::single(
//!     vec![
//!         Vector3::new(-0.5, -0.5, 0.0),
//!         Vector3::new(0.5, -0.5, 0.0),
//!         Vector3::new(0.0, 0.5, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! let textures = Textures::uniform(TextureType::Surface, &[1], 1, Vector3::new(1.0, 0.5, 0.2));
//!
//! let renderer = SoftRenderer::new(RendererConfig::default()).unwrap();
//! let out = renderer.render(&mesh, Some(&textures), RenderMode::Full).unwrap();
//! out.rgb.unwrap().to_rgb_image(0).save("triangle.png").unwrap();
//! ```

// Core data structures and math
pub mod core;

// Forward rendering pipeline
pub mod render;

// Differentiable operations (backward passes)
pub mod diff;

// Re-export commonly used types at crate root for convenience
pub use crate::core::{Camera, ImageBatch, MeshBatch, TextureType, Textures};
pub use render::{
    CameraOverride, ConfigError, RenderError, RenderMode, RenderOutput, RendererConfig,
    SoftRenderer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
