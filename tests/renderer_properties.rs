//! Whole-pipeline properties of the soft renderer: back-face filling,
//! anti-aliasing, mode independence and batching.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use softras_rs::render::LightingConfig;
use softras_rs::{
    ImageBatch, MeshBatch, RenderMode, RendererConfig, SoftRenderer, TextureType, Textures,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(size: usize) -> RendererConfig {
    RendererConfig {
        image_size: size,
        anti_aliasing: false,
        sigma_val: 1e-4,
        gamma_val: 1e-2,
        ..RendererConfig::default()
    }
}

/// Two overlapping triangles at different depths.
fn scene() -> MeshBatch {
    MeshBatch::single(
        vec![
            Vector3::new(-0.6, -0.5, 0.0),
            Vector3::new(0.4, -0.5, 0.0),
            Vector3::new(-0.1, 0.6, 0.0),
            Vector3::new(-0.3, -0.4, -0.5),
            Vector3::new(0.6, -0.2, -0.5),
            Vector3::new(0.2, 0.5, 0.3),
        ],
        vec![[0, 1, 2], [3, 4, 5]],
    )
}

fn random_textures(rng: &mut StdRng, face_count: usize, resolution: usize) -> Textures {
    let faces = (0..face_count)
        .map(|_| {
            (0..resolution * resolution)
                .map(|_| Vector3::new(rng.gen(), rng.gen(), rng.gen()))
                .collect()
        })
        .collect();
    Textures::new(TextureType::Surface, vec![faces])
}

fn assert_images_close(a: &ImageBatch, b: &ImageBatch, tol: f32) {
    assert_eq!(a.data.len(), b.data.len());
    for (i, (x, y)) in a.data.iter().zip(&b.data).enumerate() {
        assert!((x - y).abs() <= tol, "index {i}: {x} vs {y}");
    }
}

#[test]
fn test_fill_back_equals_explicit_double_winding() {
    init_logging();
    let mesh = scene();
    let textures = Textures::uniform(TextureType::Surface, &[2], 2, Vector3::new(0.8, 0.3, 0.1));

    let filled = SoftRenderer::new(config(32)).unwrap();
    let explicit = SoftRenderer::new(RendererConfig {
        fill_back: false,
        ..config(32)
    })
    .unwrap();

    let mut faces = mesh.faces[0].clone();
    faces.extend(mesh.faces[0].iter().map(|&[a, b, c]| [c, b, a]));
    let doubled = MeshBatch::single(mesh.vertices[0].clone(), faces);
    let doubled_textures =
        Textures::uniform(TextureType::Surface, &[4], 2, Vector3::new(0.8, 0.3, 0.1));

    let a = filled.render(&mesh, Some(&textures), RenderMode::Full).unwrap();
    let b = explicit
        .render(&doubled, Some(&doubled_textures), RenderMode::Full)
        .unwrap();

    assert_eq!(a.rgb.unwrap(), b.rgb.unwrap());
    assert_eq!(a.depth.unwrap(), b.depth.unwrap());
    assert_eq!(a.alpha.unwrap(), b.alpha.unwrap());
}

#[test]
fn test_fill_back_doubles_faces() {
    let mesh = scene();
    let filled = mesh.with_back_faces();
    assert_eq!(filled.face_counts(), vec![4]);
    assert_eq!(filled.faces[0][2], [2, 1, 0]);
}

#[test]
fn test_anti_aliasing_pools_double_resolution() {
    let mut rng = StdRng::seed_from_u64(7);
    let mesh = scene();
    let textures = random_textures(&mut rng, 2, 3);

    let aa = SoftRenderer::new(RendererConfig {
        anti_aliasing: true,
        ..config(16)
    })
    .unwrap();
    let big = SoftRenderer::new(config(32)).unwrap();

    let small = aa.render(&mesh, Some(&textures), RenderMode::Full).unwrap();
    let large = big.render(&mesh, Some(&textures), RenderMode::Full).unwrap();

    let rgb = small.rgb.unwrap();
    assert_eq!((rgb.height, rgb.width), (16, 16));
    assert_images_close(&rgb, &large.rgb.unwrap().avg_pool2x2(), 1e-6);
    assert_images_close(&small.alpha.unwrap(), &large.alpha.unwrap().avg_pool2x2(), 1e-6);
    assert_images_close(&small.depth.unwrap(), &large.depth.unwrap().avg_pool2x2(), 1e-4);
}

#[test]
fn test_depth_and_silhouette_ignore_lighting() {
    let mesh = scene();
    let dark = SoftRenderer::new(RendererConfig {
        lighting: LightingConfig {
            intensity_ambient: 0.0,
            intensity_directional: 0.1,
            direction: Vector3::new(1.0, 0.0, 0.0),
            ..LightingConfig::default()
        },
        ..config(24)
    })
    .unwrap();
    let bright = SoftRenderer::new(config(24)).unwrap();

    let a = dark.render(&mesh, None, RenderMode::Depth).unwrap();
    let b = bright.render(&mesh, None, RenderMode::Depth).unwrap();
    assert_eq!(a.depth.unwrap(), b.depth.unwrap());

    let a = dark.render(&mesh, None, RenderMode::Silhouette).unwrap();
    let b = bright.render(&mesh, None, RenderMode::Silhouette).unwrap();
    assert_eq!(a.alpha.unwrap(), b.alpha.unwrap());

    // Lighting does change the colors.
    let textures = Textures::uniform(TextureType::Surface, &[2], 1, Vector3::repeat(1.0));
    let a = dark.render(&mesh, Some(&textures), RenderMode::Rgb).unwrap();
    let b = bright.render(&mesh, Some(&textures), RenderMode::Rgb).unwrap();
    assert_ne!(a.rgb.unwrap(), b.rgb.unwrap());
}

#[test]
fn test_nearer_triangle_wins_color_and_depth() {
    // Both faces cover the image center; face 1 is 0.5 closer to the camera.
    let mesh = scene();
    let mut data = vec![
        vec![Vector3::new(1.0, 0.0, 0.0)],
        vec![Vector3::new(0.0, 0.0, 1.0)],
    ];
    let renderer = SoftRenderer::new(RendererConfig {
        fill_back: false,
        gamma_val: 1e-4,
        lighting: LightingConfig {
            intensity_ambient: 1.0,
            intensity_directional: 0.0,
            ..LightingConfig::default()
        },
        ..config(32)
    })
    .unwrap();
    let textures = Textures::new(TextureType::Surface, vec![data.clone()]);
    let out = renderer.render(&mesh, Some(&textures), RenderMode::Full).unwrap();

    let rgb = out.rgb.unwrap();
    assert!(rgb.get(0, 2, 16, 16) > 0.99);
    assert!(rgb.get(0, 0, 16, 16) < 0.01);

    let camera_distance = 1.0 / 30f32.to_radians().tan() + 1.0;
    let depth = out.depth.unwrap().get(0, 0, 16, 16);
    assert!(depth < camera_distance - 0.1, "depth {depth}");

    // Swapping colors swaps the result.
    data.swap(0, 1);
    let textures = Textures::new(TextureType::Surface, vec![data]);
    let rgb = renderer
        .render(&mesh, Some(&textures), RenderMode::Rgb)
        .unwrap()
        .rgb
        .unwrap();
    assert!(rgb.get(0, 0, 16, 16) > 0.99);
}

#[test]
fn test_batch_items_render_independently() {
    let mut rng = StdRng::seed_from_u64(42);
    let a = scene();
    let b = MeshBatch::single(
        vec![
            Vector3::new(-0.2, -0.2, 0.0),
            Vector3::new(0.3, -0.1, 0.0),
            Vector3::new(0.0, 0.4, 0.0),
        ],
        vec![[0, 1, 2]],
    );
    let tex_a = random_textures(&mut rng, 2, 2);
    let tex_b = Textures::uniform(TextureType::Surface, &[1], 2, Vector3::new(0.2, 0.9, 0.4));

    let batch = MeshBatch::new(
        vec![a.vertices[0].clone(), b.vertices[0].clone()],
        vec![a.faces[0].clone(), b.faces[0].clone()],
    );
    let tex_batch = Textures::new(
        TextureType::Surface,
        vec![tex_a.data[0].clone(), tex_b.data[0].clone()],
    );

    let renderer = SoftRenderer::new(config(16)).unwrap();
    let batched = renderer.render(&batch, Some(&tex_batch), RenderMode::Full).unwrap();
    let only_a = renderer.render(&a, Some(&tex_a), RenderMode::Full).unwrap();
    let only_b = renderer.render(&b, Some(&tex_b), RenderMode::Full).unwrap();

    let rgb = batched.rgb.unwrap();
    assert_eq!(rgb.batch, 2);
    assert_eq!(rgb.plane(0, 1), only_a.rgb.as_ref().unwrap().plane(0, 1));
    assert_eq!(rgb.plane(1, 1), only_b.rgb.as_ref().unwrap().plane(0, 1));

    let alpha = batched.alpha.unwrap();
    assert_eq!(alpha.plane(1, 0), only_b.alpha.as_ref().unwrap().plane(0, 0));
}

#[test]
fn test_vertex_textures_interpolate_between_corners() {
    let mesh = MeshBatch::single(
        vec![
            Vector3::new(-0.5, -0.5, 0.0),
            Vector3::new(0.5, -0.5, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
        ],
        vec![[0, 1, 2]],
    );
    let textures = Textures::new(
        TextureType::Vertex,
        vec![vec![vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]]],
    );
    let renderer = SoftRenderer::new(RendererConfig {
        texture_type: "vertex".to_string(),
        fill_back: false,
        lighting: LightingConfig {
            intensity_ambient: 1.0,
            intensity_directional: 0.0,
            ..LightingConfig::default()
        },
        ..config(32)
    })
    .unwrap();
    let rgb = renderer
        .render(&mesh, Some(&textures), RenderMode::Rgb)
        .unwrap()
        .rgb
        .unwrap();

    // Interior pixels blend all three corners and sum to one.
    let (r, g, b) = (rgb.get(0, 0, 16, 16), rgb.get(0, 1, 16, 16), rgb.get(0, 2, 16, 16));
    assert!(r > 0.05 && g > 0.05 && b > 0.05);
    assert!((r + g + b - 1.0).abs() < 1e-3);
    // Near the top corner, blue dominates.
    assert!(rgb.get(0, 2, 12, 16) > rgb.get(0, 0, 12, 16));
}
