//! Core data structures and coordinate math.
//!
//! This module contains the fundamental types used throughout the system:
//! - `MeshBatch`: batched vertices and triangle faces
//! - `Textures`: per-face color samples
//! - `Camera`: the three camera strategies and their projections
//! - `ImageBatch`: dense output buffers
//!
//! All types here are "pure data" - no rendering logic.

pub mod buffer;
pub mod camera;
pub mod math;
pub mod mesh;
pub mod texture;

// Re-export public types
pub use buffer::ImageBatch;
pub use camera::{default_eye, Camera, PinholeCamera, Projector};
pub use math::{inverse_sigmoid, sigmoid};
pub use mesh::{faces_to_corners, FaceCorners, MeshBatch, ShapeError};
pub use texture::{sample_face_texture, TextureType, Textures};
