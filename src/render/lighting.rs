//! Ambient + directional lighting of per-face textures.
//!
//! Each light produces a per-face RGB factor; the lit texture is
//! `(ambient + directional) * texture`, applied channel-wise to every sample.
//! Lighting uses object-space geometry, so it runs before the camera transform.

use crate::core::{faces_to_corners, FaceCorners, MeshBatch, ShapeError, Textures};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Epsilon for normalizing face normals.
const NORMAL_EPS: f32 = 1e-6;

/// Light intensities, colors and direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub intensity_ambient: f32,
    pub intensity_directional: f32,
    pub color_ambient: Vector3<f32>,
    pub color_directional: Vector3<f32>,

    /// Direction towards the light.
    pub direction: Vector3<f32>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            intensity_ambient: 0.5,
            intensity_directional: 0.5,
            color_ambient: Vector3::repeat(1.0),
            color_directional: Vector3::repeat(1.0),
            direction: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Per-face RGB factors, indexed `[batch][face]`.
pub type FaceLight = Vec<Vec<Vector3<f32>>>;

/// Uniform light: `intensity * color` for every face.
pub fn ambient_light(
    face_corners: &[Vec<FaceCorners>],
    intensity: f32,
    color: &Vector3<f32>,
) -> FaceLight {
    face_corners
        .iter()
        .map(|faces| vec![color * intensity; faces.len()])
        .collect()
}

/// Lambertian light: `intensity * color * max(0, n · direction)`.
///
/// The normal follows the face winding, `n = (v2 - v1) × (v0 - v1)`, so a
/// reversed-winding copy of a face is lit from the other side.
pub fn directional_light(
    face_corners: &[Vec<FaceCorners>],
    intensity: f32,
    color: &Vector3<f32>,
    direction: &Vector3<f32>,
) -> FaceLight {
    face_corners
        .iter()
        .map(|faces| {
            faces
                .iter()
                .map(|[v0, v1, v2]| {
                    let normal = (v2 - v1).cross(&(v0 - v1));
                    let normal = normal / normal.norm().max(NORMAL_EPS);
                    let cos = normal.dot(direction).max(0.0);
                    color * (intensity * cos)
                })
                .collect()
        })
        .collect()
}

/// Multiply every texture sample by the sum of ambient and directional light.
///
/// Returns a new `Textures`; the input is left untouched.
pub fn apply_lighting(
    mesh: &MeshBatch,
    textures: &Textures,
    config: &LightingConfig,
) -> Result<Textures, ShapeError> {
    let corners = faces_to_corners(mesh)?;
    textures.validate(&mesh.face_counts())?;
    Ok(light_textures(&corners, textures, config))
}

/// Lighting of textures already checked against the faces of `corners`.
pub(crate) fn light_textures(
    corners: &[Vec<FaceCorners>],
    textures: &Textures,
    config: &LightingConfig,
) -> Textures {
    let ambient = ambient_light(corners, config.intensity_ambient, &config.color_ambient);
    let directional = directional_light(
        corners,
        config.intensity_directional,
        &config.color_directional,
        &config.direction,
    );

    let data = textures
        .data
        .iter()
        .zip(ambient.iter().zip(&directional))
        .map(|(faces, (amb, dir))| {
            faces
                .iter()
                .zip(amb.iter().zip(dir))
                .map(|(samples, (a, d))| {
                    let light = a + d;
                    samples.iter().map(|s| s.component_mul(&light)).collect()
                })
                .collect()
        })
        .collect();

    Textures::new(textures.texture_type, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TextureType;
    use approx::assert_relative_eq;

    /// Triangle in the y = 0 plane whose normal points along +y.
    fn floor_triangle() -> MeshBatch {
        MeshBatch::single(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_directional_light_facing_and_back() {
        let mesh = floor_triangle().with_back_faces();
        let corners = faces_to_corners(&mesh).unwrap();
        let light = directional_light(&corners, 0.5, &Vector3::repeat(1.0), &Vector3::y());

        // One side faces the light fully, the reversed copy gets nothing.
        let lit: Vec<f32> = light[0].iter().map(|c| c.x).collect();
        assert!(lit.iter().any(|&v| (v - 0.5).abs() < 1e-6));
        assert!(lit.iter().any(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_apply_lighting_scales_samples() {
        let mesh = floor_triangle();
        let corners = faces_to_corners(&mesh).unwrap();
        let dir = directional_light(&corners, 0.5, &Vector3::repeat(1.0), &Vector3::y());
        let facing = dir[0][0].x;

        let textures = Textures::uniform(TextureType::Surface, &[1], 2, Vector3::new(0.8, 0.4, 0.2));
        let lit = apply_lighting(&mesh, &textures, &LightingConfig::default()).unwrap();

        let expected = Vector3::new(0.8, 0.4, 0.2) * (0.5 + facing);
        for s in &lit.data[0][0] {
            assert_relative_eq!(*s, expected, epsilon = 1e-6);
        }
        // Input not mutated.
        assert_eq!(textures.data[0][0][0], Vector3::new(0.8, 0.4, 0.2));
    }

    #[test]
    fn test_apply_lighting_rejects_bad_indices() {
        let mut mesh = floor_triangle();
        mesh.faces[0][0] = [0, 1, 3];
        let textures = Textures::uniform(TextureType::Surface, &[1], 1, Vector3::zeros());
        assert!(apply_lighting(&mesh, &textures, &LightingConfig::default()).is_err());
    }
}
