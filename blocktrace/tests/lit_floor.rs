//! End-to-end tests of a small room lit only by emissive blocks.

use blocktrace::block::{BlockId, BlockPalette, Shape};
use blocktrace::camera::{Camera, CanvasConfig};
use blocktrace::emitter_grid::{Emitter, EmitterGrid};
use blocktrace::environment::{Sky, Sun};
use blocktrace::integrator::TraceInfo;
use blocktrace::light::sample_emitters;
use blocktrace::material::{MaterialEntry, MaterialPalette};
use blocktrace::math::{GridAab, GridPoint, Rgb};
use blocktrace::render::Renderer;
use blocktrace::scene::Scene;
use blocktrace::settings::{EmitterSamplingStrategy, EmitterSettings, RenderSettings, SceneSettings};
use blocktrace::voxels::BlockGrid;
use euclid::{point3, vec3};
use rand::SeedableRng as _;
use rand_xoshiro::Xoshiro256Plus;

/// A stone floor at y = 0 with lamps standing on it.
fn room(lamps: &[GridPoint]) -> Scene {
    let mut materials = MaterialPalette::new();
    let stone_m = materials.add(MaterialEntry::opaque(Rgb::splat(0.6)));
    let lamp_m = materials.add(MaterialEntry::opaque(Rgb::ONE).with_emittance(1.0));
    let mut blocks = BlockPalette::new();
    let stone = blocks.push(Shape::FullCube { material: stone_m });
    let lamp = blocks.push(Shape::FullCube { material: lamp_m });

    let grid = BlockGrid::from_fn(GridAab::from_lower_size([0, 0, 0], [8, 3, 8]), |cube| {
        if cube.y == 0 {
            stone
        } else if lamps.contains(&cube) {
            lamp
        } else {
            BlockId::Empty
        }
    });
    let emitters = lamps
        .iter()
        .map(|&position| Emitter {
            position,
            block: lamp,
        })
        .collect();

    Scene::new(blocks, materials)
        .with_block_index(grid)
        .with_emitters(EmitterGrid::build(16, emitters, 1))
        .with_sky(Sky::BLACK)
        .with_sun(Sun {
            enabled: false,
            ..Sun::default()
        })
}

fn settings(strategy: EmitterSamplingStrategy) -> RenderSettings {
    let mut settings = RenderSettings::default();
    settings.emitters.strategy = strategy;
    settings
}

/// Mean direct light over many samples at the top of the floor block at (3, 0, 4),
/// one block away from a lamp at (4, 1, 4).
fn mean_floor_light(scene: &Scene, strategy: EmitterSamplingStrategy, samples: u64) -> Rgb {
    let mut total = Rgb::ZERO;
    let mut info = TraceInfo::default();
    for seed in 0..samples {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        total = total
            + sample_emitters(
                scene,
                point3(3.5, 1.0001, 4.5),
                vec3(0.0, 1.0, 0.0),
                strategy,
                &EmitterSettings::default(),
                &SceneSettings::default(),
                &mut rng,
                &mut info,
            );
    }
    total / samples as f32
}

#[test]
fn floor_next_to_lamp_is_lit() {
    let scene = room(&[point3(4, 1, 4)]);
    let light = mean_floor_light(&scene, EmitterSamplingStrategy::All, 64);
    assert!(light.max_component() > 0.0, "{light:?}");
}

#[test]
fn emitter_order_does_not_matter() {
    let lamps = [point3(4, 1, 4), point3(1, 1, 1), point3(6, 1, 2)];
    let mut reversed = lamps;
    reversed.reverse();

    let a = mean_floor_light(&room(&lamps), EmitterSamplingStrategy::All, 4000);
    let b = mean_floor_light(&room(&reversed), EmitterSamplingStrategy::All, 4000);
    assert!(a.max_component() > 0.0, "{a:?}");
    for (a, b) in a.to_array().into_iter().zip(b.to_array()) {
        assert!((a - b).abs() <= 0.05 * a.max(b), "{a} vs {b}");
    }
}

#[test]
fn render_shows_lit_floor() {
    let scene = room(&[point3(4, 1, 4)]);
    let camera = Camera::look_at([4.5, 2.5, 7.5], [3.5, 1.0, 4.5], 60.0);
    let mut renderer = Renderer::new(
        scene,
        settings(EmitterSamplingStrategy::All),
        camera,
        CanvasConfig::new(16, 12),
    );
    let info = renderer.render(4, |_| true);
    assert_eq!(info.paths, 16 * 12 * 4);
    assert!(info.shadow_rays > 0);

    let brightest = renderer
        .buffer()
        .mean()
        .iter()
        .map(|c| c.max_component())
        .fold(0.0f32, f32::max);
    assert!(brightest > 0.0);
    let image = renderer.image(1.0);
    assert!(image.pixels().any(|[r, g, b, _]| r > 0 || g > 0 || b > 0));
}

#[test]
fn rendering_is_deterministic() {
    let render = |seed: u64| {
        let mut settings = settings(EmitterSamplingStrategy::OneBlock);
        settings.seed = seed;
        let mut renderer = Renderer::new(
            room(&[point3(4, 1, 4), point3(2, 1, 5)]),
            settings,
            Camera::look_at([4.0, 2.5, 7.5], [3.5, 1.0, 4.5], 70.0),
            CanvasConfig::new(8, 6),
        );
        renderer.render(3, |_| true);
        renderer.buffer().mean().to_vec()
    };
    let first = render(1);
    assert_eq!(first, render(1));
    assert_ne!(first, render(2));
}

#[test]
fn tile_matches_full_image() {
    let camera = Camera::look_at([4.0, 2.5, 7.5], [3.5, 1.0, 4.5], 70.0);
    let full_canvas = CanvasConfig::new(8, 6);
    let tile_canvas = CanvasConfig {
        width: 8,
        height: 3,
        crop_y: 3,
        ..full_canvas
    };
    let preview = |canvas: CanvasConfig| {
        Renderer::new(
            room(&[point3(4, 1, 4)]),
            RenderSettings::default(),
            camera.clone(),
            canvas,
        )
        .preview()
    };
    let full = preview(full_canvas);
    let tile = preview(tile_canvas);
    assert_eq!(&full[24..], &tile[..]);
}
