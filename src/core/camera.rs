//! Camera models: object space → camera space → normalized image coordinates.
//!
//! Three interchangeable strategies place the camera:
//! - `Projection`: a pinhole camera with intrinsics K and extrinsics (R, t)
//! - `Look`: an eye position and a viewing direction
//! - `LookAt`: an eye position and a target point
//!
//! Image coordinates are normalized device coordinates: x and y in [-1, 1]
//! (x to the right, y up), with camera-space depth carried through unchanged.
//!
//! Every projection divides by depth, so all vertices must have positive depth
//! after the camera transform. This is a precondition: violating it yields
//! non-finite coordinates, nothing is clamped.

use super::math::{normalize_eps, BASIS_EPS};
use nalgebra::{Matrix3, Vector3};

/// World "up" used when no up vector is configured.
pub const DEFAULT_UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Viewing direction used by `Look` when none is configured.
pub const DEFAULT_DIRECTION: [f32; 3] = [0.0, 0.0, 1.0];

/// Target point used by `LookAt` when none is configured.
pub const DEFAULT_AT: [f32; 3] = [0.0, 0.0, 0.0];

/// Default eye for a viewing angle (degrees): on the -z axis, far enough back
/// that the unit cube around the origin fills the field of view.
pub fn default_eye(viewing_angle: f32) -> Vector3<f32> {
    let distance = 1.0 / viewing_angle.to_radians().tan() + 1.0;
    Vector3::new(0.0, 0.0, -distance)
}

/// Pinhole camera: `p_cam = Rᵀ (p - t)`, pixel = `K p_cam / z`.
#[derive(Clone, Debug, PartialEq)]
pub struct PinholeCamera {
    /// Intrinsics (focal lengths and principal point, in pixels).
    pub k: Matrix3<f32>,

    /// Camera orientation; its transpose maps world to camera axes.
    pub rotation: Matrix3<f32>,

    /// Camera position in world coordinates (subtracted before rotating).
    pub translation: Vector3<f32>,
}

impl PinholeCamera {
    pub fn new(k: Matrix3<f32>, rotation: Matrix3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            k,
            rotation,
            translation,
        }
    }

    /// Transform a world point into camera coordinates.
    pub fn world_to_camera(&self, point: &Vector3<f32>) -> Vector3<f32> {
        self.rotation.transpose() * (point - self.translation)
    }

    /// Project a camera-space point to NDC for a square image of `image_size` pixels.
    ///
    /// Pixel rows grow downwards while NDC y grows upwards, so v is flipped.
    pub fn project(&self, point_camera: &Vector3<f32>, image_size: usize) -> Vector3<f32> {
        let p = self.k * point_camera;
        let u = p.x / p.z;
        let v = p.y / p.z;
        let size = image_size as f32;
        Vector3::new(2.0 * u / size - 1.0, 1.0 - 2.0 * v / size, point_camera.z)
    }
}

/// How look / look-at cameras map camera space onto the image plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projector {
    /// Field-of-view foreshortening with the given viewing angle (degrees).
    Perspective { viewing_angle: f32 },

    /// Parallel projection, scaling x and y.
    Orthographic { scale: f32 },
}

impl Projector {
    pub fn apply(&self, vertices: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
        match *self {
            Projector::Perspective { viewing_angle } => {
                perspective_distortion(vertices, viewing_angle)
            }
            Projector::Orthographic { scale } => orthographic(vertices, scale),
        }
    }
}

/// A fully specified camera. Exactly one strategy is active.
#[derive(Clone, Debug, PartialEq)]
pub enum Camera {
    Projection(PinholeCamera),
    Look {
        eye: Vector3<f32>,
        direction: Vector3<f32>,
        up: Vector3<f32>,
        projector: Projector,
    },
    LookAt {
        eye: Vector3<f32>,
        at: Vector3<f32>,
        up: Vector3<f32>,
        projector: Projector,
    },
}

impl Camera {
    /// Map object-space vertices into the camera frame.
    pub fn transform_to_camera(&self, vertices: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
        match self {
            Camera::Projection(pinhole) => {
                vertices.iter().map(|v| pinhole.world_to_camera(v)).collect()
            }
            Camera::Look { eye, direction, up, .. } => look(vertices, eye, direction, up),
            Camera::LookAt { eye, at, up, .. } => look_at(vertices, eye, at, up),
        }
    }

    /// Map camera-space vertices to (x_ndc, y_ndc, depth).
    pub fn project_to_image(
        &self,
        vertices: &[Vector3<f32>],
        image_size: usize,
    ) -> Vec<Vector3<f32>> {
        match self {
            Camera::Projection(pinhole) => vertices
                .iter()
                .map(|v| pinhole.project(v, image_size))
                .collect(),
            Camera::Look { projector, .. } | Camera::LookAt { projector, .. } => {
                projector.apply(vertices)
            }
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Camera::Projection(_) => "projection",
            Camera::Look { .. } => "look",
            Camera::LookAt { .. } => "look_at",
        }
    }
}

/// Rotation whose rows are the camera axes (x, y, z) for a viewing axis `z_dir`.
///
/// `z = normalize(z_dir)`, `x = normalize(up × z)`, `y = normalize(z × x)`.
pub fn basis_from_axis(z_dir: &Vector3<f32>, up: &Vector3<f32>) -> Matrix3<f32> {
    let z_axis = normalize_eps(z_dir, BASIS_EPS);
    let x_axis = normalize_eps(&up.cross(&z_axis), BASIS_EPS);
    let y_axis = normalize_eps(&z_axis.cross(&x_axis), BASIS_EPS);
    Matrix3::from_rows(&[x_axis.transpose(), y_axis.transpose(), z_axis.transpose()])
}

/// Camera looking from `eye` towards `at`: `R (p - eye)`.
pub fn look_at(
    vertices: &[Vector3<f32>],
    eye: &Vector3<f32>,
    at: &Vector3<f32>,
    up: &Vector3<f32>,
) -> Vec<Vector3<f32>> {
    let r = basis_from_axis(&(at - eye), up);
    vertices.iter().map(|v| r * (v - eye)).collect()
}

/// Camera at `eye` looking along `direction`: `R (p - eye)`.
pub fn look(
    vertices: &[Vector3<f32>],
    eye: &Vector3<f32>,
    direction: &Vector3<f32>,
    up: &Vector3<f32>,
) -> Vec<Vector3<f32>> {
    let r = basis_from_axis(direction, up);
    vertices.iter().map(|v| r * (v - eye)).collect()
}

/// Field-of-view foreshortening: `x' = x / (z tan θ)`, `y' = y / (z tan θ)`, `z' = z`.
///
/// `viewing_angle` is in degrees.
pub fn perspective_distortion(vertices: &[Vector3<f32>], viewing_angle: f32) -> Vec<Vector3<f32>> {
    let width = viewing_angle.to_radians().tan();
    vertices
        .iter()
        .map(|v| Vector3::new(v.x / (v.z * width), v.y / (v.z * width), v.z))
        .collect()
}

/// Parallel projection: `x' = s x`, `y' = s y`, `z' = z`.
pub fn orthographic(vertices: &[Vector3<f32>], scale: f32) -> Vec<Vector3<f32>> {
    vertices
        .iter()
        .map(|v| Vector3::new(v.x * scale, v.y * scale, v.z))
        .collect()
}
