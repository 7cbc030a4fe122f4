//! Renderer edge case tests
//!
//! Tests for edge cases in the rendering pipeline, particularly:
//! - NaN/Inf vertices and degenerate faces
//! - Empty meshes
//! - Near/far clipping
//! - Very small images
//! - Malformed inputs and configurations

use nalgebra::Vector3;
use softras_rs::core::ShapeError;
use softras_rs::render::ConfigError;
use softras_rs::{
    MeshBatch, RenderError, RenderMode, RendererConfig, SoftRenderer, TextureType, Textures,
};

fn create_test_config(size: usize) -> RendererConfig {
    RendererConfig {
        image_size: size,
        anti_aliasing: false,
        ..RendererConfig::default()
    }
}

/// A head-on triangle centered at the origin, scaled by `scale`, at world depth `z`.
fn create_triangle(scale: f32, z: f32) -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(-0.5 * scale, -0.5 * scale, z),
        Vector3::new(0.5 * scale, -0.5 * scale, z),
        Vector3::new(0.0, 0.5 * scale, z),
    ]
}

fn center_alpha(renderer: &SoftRenderer, mesh: &MeshBatch) -> f32 {
    let size = renderer.config().image_size;
    let alpha = renderer
        .render(mesh, None, RenderMode::Silhouette)
        .unwrap()
        .alpha
        .unwrap();
    alpha.get(0, 0, size / 2, size / 2)
}

#[test]
fn test_render_with_nan_vertex() {
    let renderer = SoftRenderer::new(create_test_config(16)).unwrap();

    let mut vertices = create_triangle(1.0, 0.0);
    vertices[0].x = f32::NAN;
    let mesh = MeshBatch::single(vertices, vec![[0, 1, 2]]);

    // Should not panic - faces touching a NaN vertex are skipped
    let out = renderer.render(&mesh, None, RenderMode::Full);
    assert!(matches!(out, Err(RenderError::MissingTextures(RenderMode::Full))));

    let out = renderer.render(&mesh, None, RenderMode::Silhouette).unwrap();
    let alpha = out.alpha.unwrap();
    assert!(alpha.data.iter().all(|&a| a == 0.0));
}

#[test]
fn test_render_mixed_valid_invalid_faces() {
    let renderer = SoftRenderer::new(create_test_config(16)).unwrap();

    let mut vertices = create_triangle(1.0, 0.0);
    // Collinear face
    vertices.extend([
        Vector3::new(-0.5, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.5, 0.0, 0.0),
    ]);
    // Face with an infinite vertex
    vertices.extend([
        Vector3::new(f32::INFINITY, 0.0, 0.0),
        Vector3::new(0.0, 0.3, 0.0),
        Vector3::new(0.3, 0.0, 0.0),
    ]);
    let mesh = MeshBatch::single(vertices.clone(), vec![[0, 1, 2], [3, 4, 5], [6, 7, 8]]);
    let reference = MeshBatch::single(vertices, vec![[0, 1, 2]]);

    let a = renderer.render(&mesh, None, RenderMode::Depth).unwrap();
    let b = renderer.render(&reference, None, RenderMode::Depth).unwrap();
    assert_eq!(a.depth.unwrap(), b.depth.unwrap());
}

#[test]
fn test_render_empty_mesh() {
    let config = RendererConfig {
        background_color: Vector3::new(0.2, 0.4, 0.6),
        ..create_test_config(8)
    };
    let renderer = SoftRenderer::new(config).unwrap();
    let mesh = MeshBatch::single(create_triangle(1.0, 0.0), vec![]);
    let textures = Textures::uniform(TextureType::Surface, &[0], 2, Vector3::repeat(1.0));

    // Should not panic with no faces
    let out = renderer.render(&mesh, Some(&textures), RenderMode::Full).unwrap();

    let rgb = out.rgb.unwrap();
    assert_eq!((rgb.batch, rgb.channels, rgb.height, rgb.width), (1, 3, 8, 8));
    assert!(rgb.plane(0, 0).iter().all(|&v| (v - 0.2).abs() < 1e-6));
    assert!(rgb.plane(0, 2).iter().all(|&v| (v - 0.6).abs() < 1e-6));
    assert!(out.depth.unwrap().data.iter().all(|&d| d == 100.0));
    assert!(out.alpha.unwrap().data.iter().all(|&a| a == 0.0));
}

#[test]
fn test_render_very_small_image() {
    // Minimal 1x1 image: the single pixel center is the image center.
    let renderer = SoftRenderer::new(create_test_config(1)).unwrap();
    let mesh = MeshBatch::single(create_triangle(1.0, 0.0), vec![[0, 1, 2]]);
    let alpha = renderer
        .render(&mesh, None, RenderMode::Silhouette)
        .unwrap()
        .alpha
        .unwrap();
    assert_eq!(alpha.data.len(), 1);
    assert!(alpha.data[0] > 0.99);
}

#[test]
fn test_far_plane_clips_fragments() {
    // Camera depth ~202: beyond the default far plane.
    let mesh = MeshBatch::single(create_triangle(100.0, 200.0), vec![[0, 1, 2]]);

    let clipped = SoftRenderer::new(create_test_config(16)).unwrap();
    assert_eq!(center_alpha(&clipped, &mesh), 0.0);

    let visible = SoftRenderer::new(RendererConfig {
        far: 300.0,
        ..create_test_config(16)
    })
    .unwrap();
    assert!(center_alpha(&visible, &mesh) > 0.99);
}

#[test]
fn test_near_plane_clips_fragments() {
    // Camera depth ~0.73: in front of the default near plane.
    let mesh = MeshBatch::single(create_triangle(0.4, -2.0), vec![[0, 1, 2]]);

    let clipped = SoftRenderer::new(create_test_config(16)).unwrap();
    assert_eq!(center_alpha(&clipped, &mesh), 0.0);

    let visible = SoftRenderer::new(RendererConfig {
        near: 0.5,
        ..create_test_config(16)
    })
    .unwrap();
    assert!(center_alpha(&visible, &mesh) > 0.99);
}

#[test]
fn test_face_index_out_of_range() {
    let renderer = SoftRenderer::new(create_test_config(8)).unwrap();
    let mesh = MeshBatch::single(create_triangle(1.0, 0.0), vec![[0, 1, 3]]);
    let err = renderer.render(&mesh, None, RenderMode::Silhouette).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Shape(ShapeError::FaceIndexOutOfRange {
            batch: 0,
            face: 0,
            index: 3,
            vertex_count: 3
        })
    ));
}

#[test]
fn test_texture_layout_mismatch() {
    let renderer = SoftRenderer::new(create_test_config(8)).unwrap();
    let mesh = MeshBatch::single(create_triangle(1.0, 0.0), vec![[0, 1, 2]]);

    let wrong_faces = Textures::uniform(TextureType::Surface, &[2], 2, Vector3::repeat(1.0));
    assert!(matches!(
        renderer.render(&mesh, Some(&wrong_faces), RenderMode::Rgb),
        Err(RenderError::Shape(ShapeError::DimensionMismatch { dim: "faces", .. }))
    ));

    let wrong_type = Textures::uniform(TextureType::Vertex, &[1], 1, Vector3::repeat(1.0));
    assert!(matches!(
        renderer.render(&mesh, Some(&wrong_type), RenderMode::Rgb),
        Err(RenderError::TextureTypeMismatch { .. })
    ));

    let not_square = Textures::new(TextureType::Surface, vec![vec![vec![Vector3::zeros(); 3]]]);
    assert!(renderer
        .render(&mesh, Some(&not_square), RenderMode::Rgb)
        .is_err());
}

#[test]
fn test_unknown_function_names_fail_at_construction() {
    let err = SoftRenderer::new(RendererConfig {
        dist_func: "manhattan".to_string(),
        ..create_test_config(8)
    })
    .unwrap_err();
    match err {
        ConfigError::UnknownFunction { name, available, .. } => {
            assert_eq!(name, "manhattan");
            assert!(available.contains("euclidean"));
            assert!(available.contains("barycentric"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(SoftRenderer::new(RendererConfig {
        aggr_func_alpha: "hard".to_string(),
        ..create_test_config(8)
    })
    .is_err());
}

#[test]
fn test_config_json_roundtrip() {
    let config = RendererConfig {
        image_size: 48,
        dist_func: "barycentric".to_string(),
        aggr_func_alpha: "sum".to_string(),
        background_color: Vector3::new(1.0, 0.5, 0.25),
        ..RendererConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed = RendererConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
    SoftRenderer::new(parsed).unwrap();
}
