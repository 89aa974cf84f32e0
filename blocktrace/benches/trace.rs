#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};

use blocktrace::block::{BlockId, BlockPalette, Shape, TexturedBox};
use blocktrace::camera::{Camera, CanvasConfig};
use blocktrace::emitter_grid::{Emitter, EmitterGrid};
use blocktrace::material::{AIR_IOR, ColorSource, Material, MaterialEntry, MaterialPalette};
use blocktrace::math::{Aab, GridAab, Rgb, Rgba};
use blocktrace::render::Renderer;
use blocktrace::scene::Scene;
use blocktrace::settings::{EmitterSamplingStrategy, RenderSettings};
use blocktrace::voxels::BlockGrid;

/// Terrain with slabs, glass, and a grid of lamps.
fn bench_scene() -> Scene {
    let mut materials = MaterialPalette::new();
    let grass = materials.add(MaterialEntry::opaque(Rgb::new(0.3, 0.6, 0.2)));
    let stone = materials.add(MaterialEntry::opaque(Rgb::splat(0.5)));
    let lamp_m = materials.add(MaterialEntry::opaque(Rgb::new(1.0, 0.9, 0.7)).with_emittance(1.0));
    let glass_m = materials.add(MaterialEntry {
        material: Material::new(1.5, true, false),
        color: ColorSource::Flat(Rgba::new(0.8, 0.9, 1.0, 0.1)),
        ..MaterialEntry::AIR
    });
    let tinted_m = materials.add(MaterialEntry {
        material: Material::new(AIR_IOR, false, false),
        color: ColorSource::Flat(Rgba::new(1.0, 0.4, 0.4, 0.5)),
        ..MaterialEntry::AIR
    });

    let mut blocks = BlockPalette::new();
    let ground = blocks.push(Shape::FullCube { material: grass });
    let slab = blocks.push(Shape::BoxSet {
        boxes: vec![TexturedBox::new(Aab::new(0.0, 1.0, 0.0, 0.5, 0.0, 1.0), stone)],
    });
    let lamp = blocks.push(Shape::FullCube { material: lamp_m });
    let glass = blocks.push(Shape::FullCube { material: glass_m });
    let tinted = blocks.push(Shape::FullCube { material: tinted_m });

    let bounds = GridAab::from_lower_size([0, 0, 0], [48, 12, 48]);
    let mut emitters = Vec::new();
    let grid = BlockGrid::from_fn(bounds, |cube| {
        let height = 2 + (cube.x / 6 + cube.z / 7) % 3;
        match cube.y {
            y if y < height => ground,
            y if y == height && (cube.x + cube.z) % 5 == 0 => slab,
            y if y == height + 1 && cube.x % 8 == 4 && cube.z % 8 == 4 => {
                emitters.push(Emitter {
                    position: cube,
                    block: lamp,
                });
                lamp
            }
            y if y == height + 1 && cube.x % 11 == 0 => glass,
            y if y == height + 1 && cube.z % 13 == 0 => tinted,
            _ => BlockId::Empty,
        }
    });

    Scene::new(blocks, materials)
        .with_block_index(grid)
        .with_emitters(EmitterGrid::build(8, emitters, 1))
}

pub fn trace_bench(c: &mut Criterion) {
    let camera = Camera::look_at([4.0, 9.0, 4.0], [24.0, 2.0, 24.0], 70.0);
    let canvas = CanvasConfig::new(64, 48);

    let mut group = c.benchmark_group(if cfg!(feature = "auto-threads") {
        "threaded"
    } else {
        "serial"
    });

    for (name, strategy) in [
        ("pass-one-block", EmitterSamplingStrategy::OneBlock),
        ("pass-all", EmitterSamplingStrategy::All),
    ] {
        let mut settings = RenderSettings::default();
        settings.emitters.strategy = strategy;
        let mut renderer = Renderer::new(bench_scene(), settings, camera.clone(), canvas);
        group.bench_function(name, |b| b.iter(|| renderer.render_pass()));
    }

    let renderer = Renderer::new(
        bench_scene(),
        RenderSettings::default(),
        camera.clone(),
        canvas,
    );
    group.bench_function("preview", |b| b.iter_with_large_drop(|| renderer.preview()));

    group.finish();
}

criterion_group!(benches, trace_bench);
criterion_main!(benches);
