//! Batched triangle meshes.
//!
//! A `MeshBatch` holds B meshes side by side. Each batch item has its own vertex
//! list and its own face list; faces index into the vertices of the same item.

use nalgebra::Vector3;
use thiserror::Error;

/// Shape and index errors found while validating renderer inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("batch size mismatch: {tensor} has {found} items, expected {expected}")]
    BatchMismatch {
        tensor: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "face index out of range: faces[{batch}][{face}] references vertex {index}, \
         but batch item {batch} has {vertex_count} vertices"
    )]
    FaceIndexOutOfRange {
        batch: usize,
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("{tensor} dimension {dim} has size {found}, expected {expected}")]
    DimensionMismatch {
        tensor: &'static str,
        dim: &'static str,
        expected: String,
        found: usize,
    },
}

/// Corners of one triangle, in face order.
pub type FaceCorners = [Vector3<f32>; 3];

/// A batch of triangle meshes (B x V x 3 vertices, B x F x 3 faces).
#[derive(Clone, Debug, Default)]
pub struct MeshBatch {
    /// Vertex positions per batch item.
    pub vertices: Vec<Vec<Vector3<f32>>>,

    /// Vertex index triples per batch item.
    pub faces: Vec<Vec<[usize; 3]>>,
}

impl MeshBatch {
    pub fn new(vertices: Vec<Vec<Vector3<f32>>>, faces: Vec<Vec<[usize; 3]>>) -> Self {
        Self { vertices, faces }
    }

    /// A batch holding a single mesh.
    pub fn single(vertices: Vec<Vector3<f32>>, faces: Vec<[usize; 3]>) -> Self {
        Self::new(vec![vertices], vec![faces])
    }

    pub fn batch_size(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces per batch item.
    pub fn face_counts(&self) -> Vec<usize> {
        self.faces.iter().map(Vec::len).collect()
    }

    /// Check batch sizes and face index ranges.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.faces.len() != self.vertices.len() {
            return Err(ShapeError::BatchMismatch {
                tensor: "faces",
                expected: self.vertices.len(),
                found: self.faces.len(),
            });
        }

        for (batch, (verts, faces)) in self.vertices.iter().zip(&self.faces).enumerate() {
            for (face, tri) in faces.iter().enumerate() {
                if let Some(&index) = tri.iter().find(|&&i| i >= verts.len()) {
                    return Err(ShapeError::FaceIndexOutOfRange {
                        batch,
                        face,
                        index,
                        vertex_count: verts.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Append a reversed-winding copy of every face (`[a, b, c]` -> `[c, b, a]`).
    ///
    /// The face count per batch item doubles; the original faces keep their indices.
    pub fn with_back_faces(&self) -> MeshBatch {
        let faces = self
            .faces
            .iter()
            .map(|faces| {
                let mut doubled = Vec::with_capacity(faces.len() * 2);
                doubled.extend_from_slice(faces);
                doubled.extend(faces.iter().map(|&[a, b, c]| [c, b, a]));
                doubled
            })
            .collect();

        MeshBatch {
            vertices: self.vertices.clone(),
            faces,
        }
    }

    /// Replace the vertices (same batch layout), keeping the faces.
    pub fn with_vertices(&self, vertices: Vec<Vec<Vector3<f32>>>) -> MeshBatch {
        MeshBatch {
            vertices,
            faces: self.faces.clone(),
        }
    }
}

/// Gather the corner positions of every face (B x F x 3 x 3).
///
/// Fails if any face index is out of range for its batch item.
pub fn faces_to_corners(mesh: &MeshBatch) -> Result<Vec<Vec<FaceCorners>>, ShapeError> {
    mesh.validate()?;

    Ok(mesh
        .vertices
        .iter()
        .zip(&mesh.faces)
        .map(|(verts, faces)| {
            faces
                .iter()
                .map(|&[a, b, c]| [verts[a], verts[b], verts[c]])
                .collect()
        })
        .collect())
}
