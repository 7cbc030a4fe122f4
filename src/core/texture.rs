//! Per-face texture samples.
//!
//! Textures are stored as B x F x S RGB samples. How the S samples map onto a
//! triangle depends on the `TextureType`:
//! - `Surface`: an R x R grid over the triangle's barycentric square (S = R²)
//! - `Vertex`: one color per corner, interpolated barycentrically (S = 3)

use super::mesh::ShapeError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// How per-face samples are laid out over the triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureType {
    Surface,
    Vertex,
}

impl TextureType {
    /// Look up a texture type by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "surface" => Some(Self::Surface),
            "vertex" => Some(Self::Vertex),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Vertex => "vertex",
        }
    }
}

/// Per-face color samples for a mesh batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Textures {
    pub texture_type: TextureType,

    /// Samples indexed `[batch][face][sample]`.
    pub data: Vec<Vec<Vec<Vector3<f32>>>>,
}

impl Textures {
    pub fn new(texture_type: TextureType, data: Vec<Vec<Vec<Vector3<f32>>>>) -> Self {
        Self { texture_type, data }
    }

    /// Single-color textures for the given per-batch face counts.
    ///
    /// `resolution` is the surface grid size R (ignored for vertex textures).
    pub fn uniform(
        texture_type: TextureType,
        face_counts: &[usize],
        resolution: usize,
        color: Vector3<f32>,
    ) -> Self {
        let samples = match texture_type {
            TextureType::Surface => resolution.max(1) * resolution.max(1),
            TextureType::Vertex => 3,
        };
        let data = face_counts
            .iter()
            .map(|&faces| vec![vec![color; samples]; faces])
            .collect();
        Self::new(texture_type, data)
    }

    /// Check the texture layout against the mesh face counts.
    ///
    /// Returns the surface grid resolution R, or 1 for vertex textures.
    pub fn validate(&self, face_counts: &[usize]) -> Result<usize, ShapeError> {
        if self.data.len() != face_counts.len() {
            return Err(ShapeError::BatchMismatch {
                tensor: "textures",
                expected: face_counts.len(),
                found: self.data.len(),
            });
        }

        let mut resolution: Option<usize> = None;
        for (faces, &expected_faces) in self.data.iter().zip(face_counts) {
            if faces.len() != expected_faces {
                return Err(ShapeError::DimensionMismatch {
                    tensor: "textures",
                    dim: "faces",
                    expected: expected_faces.to_string(),
                    found: faces.len(),
                });
            }

            for samples in faces {
                let n = samples.len();
                match self.texture_type {
                    TextureType::Vertex if n != 3 => {
                        return Err(ShapeError::DimensionMismatch {
                            tensor: "textures",
                            dim: "samples (vertex texture)",
                            expected: "3".to_string(),
                            found: n,
                        });
                    }
                    TextureType::Vertex => {}
                    TextureType::Surface => {
                        let r = (n as f64).sqrt().round() as usize;
                        if r == 0 || r * r != n || resolution.is_some_and(|prev| prev != r) {
                            let expected = match resolution {
                                Some(prev) => (prev * prev).to_string(),
                                None => "a non-zero perfect square".to_string(),
                            };
                            return Err(ShapeError::DimensionMismatch {
                                tensor: "textures",
                                dim: "samples (surface texture)",
                                expected,
                                found: n,
                            });
                        }
                        resolution = Some(r);
                    }
                }
            }
        }

        Ok(resolution.unwrap_or(1))
    }

    /// Duplicate every face's samples to match `MeshBatch::with_back_faces`.
    ///
    /// Vertex colors of the reversed copy are reversed as well, so each corner
    /// keeps its color after the winding flip.
    pub fn with_back_faces(&self) -> Textures {
        let data = self
            .data
            .iter()
            .map(|faces| {
                let mut doubled = Vec::with_capacity(faces.len() * 2);
                doubled.extend(faces.iter().cloned());
                doubled.extend(faces.iter().map(|samples| match self.texture_type {
                    TextureType::Surface => samples.clone(),
                    TextureType::Vertex => samples.iter().rev().copied().collect(),
                }));
                doubled
            })
            .collect();

        Textures::new(self.texture_type, data)
    }
}

/// Sample one face's texture at clipped barycentric coordinates `w`.
///
/// `resolution` is the surface grid size R.
pub fn sample_face_texture(
    samples: &[Vector3<f32>],
    texture_type: TextureType,
    resolution: usize,
    w: &Vector3<f32>,
) -> Vector3<f32> {
    match texture_type {
        TextureType::Surface => {
            let r = resolution.max(1);
            let rf = r as f32;
            let w_x = ((w.x * rf) as usize).min(r - 1);
            let w_y = ((w.y * rf) as usize).min(r - 1);
            // Each grid cell holds two triangles; the upper one is stored mirrored.
            let k = if (w.x + w.y) * rf - (w_x + w_y) as f32 <= 1.0 {
                w_y * r + w_x
            } else {
                r * r - 1 - w_y * r - w_x
            };
            samples[k]
        }
        TextureType::Vertex => samples[0] * w.x + samples[1] * w.y + samples[2] * w.z,
    }
}
