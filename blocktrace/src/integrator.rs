//! The per-sample random walk, and the single-ray preview shading.

use std::fmt;
use std::ops;

use rand::{Rng, SeedableRng as _};

use crate::camera::{CanvasConfig, Camera};
use crate::intersect::SurfaceHit;
use crate::light::{direct_light_attenuation, sample_emitters};
use crate::material::scatter::{
    absorb_probability, diffuse_probability, diffuse_reflection, facing,
    is_total_internal_reflection, refraction, schlick_reflectance, specular_reflection,
    translucent_transmission,
};
use crate::math::{FreePoint, FreeVector, Rgb};
use crate::medium::{Medium, PathRay, RayFlags};
use crate::raycast::Ray;
use crate::scene::Scene;
use crate::settings::{EmitterSamplingStrategy, RenderSettings};
use crate::{EPSILON, PathRng, SURFACE_OFFSET};

/// Direction of the fixed light used by [`preview_pixel()`].
const PREVIEW_LIGHT: FreeVector = FreeVector::new(0.25, 0.866, 0.433);

/// Pixel value [`preview_pixel()`] uses for the crosshair.
pub const CROSSHAIR_COLOR: u32 = 0xFFFF_FFFF;

/// Half the length of each arm of the preview crosshair, in pixels.
const CROSSHAIR_RADIUS: usize = 5;

/// Performance info about tracing paths.
///
/// The contents of this structure are subject to change; use [`Debug`] to view it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct TraceInfo {
    /// Number of paths traced.
    pub paths: usize,
    /// Number of surfaces paths interacted with.
    pub bounces: usize,
    /// Number of shadow rays cast toward the sun or emitters.
    pub shadow_rays: usize,
    /// Number of shadow rays given up on for crossing too many surfaces.
    pub shadow_rays_capped: usize,
}

impl ops::Add for TraceInfo {
    type Output = Self;
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}
impl ops::AddAssign<TraceInfo> for TraceInfo {
    fn add_assign(&mut self, other: Self) {
        self.paths += other.paths;
        self.bounces += other.bounces;
        self.shadow_rays += other.shadow_rays;
        self.shadow_rays_capped += other.shadow_rays_capped;
    }
}
impl std::iter::Sum for TraceInfo {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        let mut sum = Self::default();
        for part in iter {
            sum += part;
        }
        sum
    }
}

impl fmt::Display for TraceInfo {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Self {
            paths,
            bounces,
            shadow_rays,
            shadow_rays_capped,
        } = self;
        write!(
            fmt,
            "{paths} paths, {bounces} bounces, {shadow_rays} shadow rays ({shadow_rays_capped} capped)"
        )
    }
}

// -------------------------------------------------------------------------------------------------

/// Traces paths through one [`Scene`] with fixed [`RenderSettings`].
#[derive(Clone, Copy, Debug)]
pub struct PathTracer<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
}

impl<'a> PathTracer<'a> {
    #[allow(missing_docs)]
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        Self { scene, settings }
    }

    /// Computes one sample of pixel `index` of `canvas`, with its random numbers
    /// drawn from a generator seeded with `seed`.
    pub fn trace_pixel(
        &self,
        camera: &Camera,
        canvas: &CanvasConfig,
        index: usize,
        seed: u64,
        info: &mut TraceInfo,
    ) -> Rgb {
        let mut rng = PathRng::seed_from_u64(seed);
        let Some(ray) = camera.ray(canvas, index, &mut rng) else {
            return Rgb::ZERO;
        };
        let mut path = PathRay::new(ray);
        path.media = self.scene.initialize_medium(path.ray.origin);
        self.trace_path(path, &mut rng, info)
    }

    /// Follows `path` until it escapes to the sky or reaches the bounce limit, returning
    /// the light it carries back.
    pub fn trace_path(&self, mut path: PathRay, rng: &mut impl Rng, info: &mut TraceInfo) -> Rgb {
        let scene = self.scene;
        let settings = &self.settings.scene;
        let mut color = Rgb::ZERO;
        let mut throughput = Rgb::ONE;
        info.paths += 1;

        for depth in 0..self.settings.max_depth {
            let direction = path.ray.direction;
            let Some(surface) = scene.closest_intersect(&path.ray, path.media.current()) else {
                let sky = scene.sky_sample(direction);
                throughput *= sky.color;
                color += throughput * sky.emittance;
                log::trace!("path escaped after {depth} bounces");
                break;
            };
            info.bounces += 1;
            let hit = surface.hit;
            let sample = hit.sample;
            path.media.enter(Medium {
                material: hit.material,
                block: hit.block,
            });

            let current = surface.material;
            let previous = scene.materials.get(path.media.previous().material);
            let (n1, n2) = (previous.ior(), current.ior());
            let ior_changes = (n1 - n2).abs() >= EPSILON;
            let p_specular = sample.specular;
            let p_diffuse = diffuse_probability(&sample, settings.fancier_translucency);
            let p_absorb = absorb_probability(&sample, p_diffuse, settings.fancier_translucency);
            let hit_point = path.ray.at(hit.distance);

            if sample.color.alpha() + p_specular < EPSILON && !ior_changes {
                // Nothing here; carry on as if the surface did not exist.
                path.ray.origin = hit_point + direction * SURFACE_OFFSET;
                continue;
            }

            let mut diffuse = false;
            if sample.metalness > EPSILON && sample.metalness > rng.random::<f32>() {
                throughput *= sample.color.to_rgb();
                let reflected = specular_reflection(direction, hit.normal, sample.roughness, rng);
                reflect(&mut path, hit_point, reflected);
            } else if p_specular > EPSILON && p_specular > rng.random::<f32>() {
                let reflected = specular_reflection(direction, hit.normal, sample.roughness, rng);
                reflect(&mut path, hit_point, reflected);
            } else if rng.random::<f32>() < p_diffuse {
                color += self.direct_light(depth, &path, &surface, hit_point, rng, info) * throughput;
                throughput *= sample.color.to_rgb();
                let scattered = diffuse_reflection(direction, hit.normal, rng);
                reflect(&mut path, hit_point, scattered);
                diffuse = true;
            } else if ior_changes {
                let refracts = current.is_refractive() || previous.is_refractive();
                // Measured against the normal facing the ray, so leaving a medium is weighted
                // the same as entering one.
                let cos_theta = -facing(hit.normal, direction).dot(direction) as f32;
                if (refracts && is_total_internal_reflection(n1, n2, cos_theta))
                    || rng.random::<f32>() < schlick_reflectance(n1, n2, cos_theta)
                {
                    let reflected =
                        specular_reflection(direction, hit.normal, sample.roughness, rng);
                    reflect(&mut path, hit_point, reflected);
                } else {
                    throughput *= translucent_transmission(
                        &sample,
                        p_absorb,
                        settings.transmissivity_cap,
                        settings.fancier_translucency,
                    );
                    let transmitted = if refracts {
                        refraction(direction, hit.normal, n1, n2)
                    } else {
                        direction
                    };
                    path.ray = Ray::new(hit_point + transmitted * SURFACE_OFFSET, transmitted);
                }
            } else {
                throughput *= translucent_transmission(
                    &sample,
                    p_absorb,
                    settings.transmissivity_cap,
                    settings.fancier_translucency,
                );
                path.ray.origin = hit_point + direction * SURFACE_OFFSET;
            }

            if diffuse {
                path.flags |= RayFlags::INDIRECT;
            }
        }
        color
    }

    /// Light arriving at a diffuse surface directly: its own emission, emitter samples,
    /// and the sun. The result is not yet multiplied by the path throughput.
    fn direct_light(
        &self,
        depth: u32,
        path: &PathRay,
        surface: &SurfaceHit,
        hit_point: FreePoint,
        rng: &mut impl Rng,
        info: &mut TraceInfo,
    ) -> Rgb {
        let scene = self.scene;
        let emitters = &self.settings.emitters;
        let settings = &self.settings.scene;
        let strategy = emitters.effective_strategy();
        let hit = &surface.hit;
        let albedo = hit.sample.color.to_rgb();
        let mut light = Rgb::ZERO;

        let count_emission = emitters.enabled
            && (!emitters.prevent_double_counting
                || strategy == EmitterSamplingStrategy::None
                || depth == 0);
        if count_emission && hit.sample.emittance > EPSILON {
            light += albedo * albedo * (hit.sample.emittance * emitters.intensity);
        } else if emitters.enabled
            && strategy != EmitterSamplingStrategy::None
            && hit.sample.emittance <= EPSILON
            && surface.material.is_opaque()
            && !surface.material.is_refractive()
        {
            light += albedo
                * sample_emitters(
                    scene, hit_point, hit.normal, strategy, emitters, settings, rng, info,
                );
        }

        if settings.sun_sampling
            && let Some(sun_direction) = scene.sun.sample_direction(rng)
        {
            let front = sun_direction.dot(hit.normal);
            if front > 0.0 {
                let attenuation = direct_light_attenuation(
                    scene,
                    Ray::new(hit_point, sun_direction),
                    path.media.reverted_both(),
                    settings.strict_direct_light,
                    info,
                );
                if attenuation.alpha() > 0.0 {
                    let luminosity = if settings.sun_luminosity {
                        scene.sun.luminosity
                    } else {
                        1.0
                    };
                    let strength = attenuation.alpha() * front.abs() as f32 * luminosity;
                    light += albedo * attenuation.to_rgb() * strength * scene.sun.emittance();
                }
            }
        }
        light
    }
}

/// Sends `path` off from `point` in `direction` on the side of the surface it came from.
fn reflect(path: &mut PathRay, point: FreePoint, direction: FreeVector) {
    path.ray = Ray::new(point + direction * SURFACE_OFFSET, direction);
    path.media.revert();
}

// -------------------------------------------------------------------------------------------------

/// Computes one pixel of a quick preview image, as `0xAARRGGBB`.
///
/// Surfaces are lit by a fixed directional light plus ambient light, and nothing is
/// transparent or reflective. A crosshair is drawn at the center of the full image.
pub fn preview_pixel(scene: &Scene, camera: &Camera, canvas: &CanvasConfig, index: usize) -> u32 {
    let (px, py) = canvas.full_position(index);
    let (cx, cy) = (canvas.full_width / 2, canvas.full_height / 2);
    if (px == cx && py.abs_diff(cy) <= CROSSHAIR_RADIUS)
        || (py == cy && px.abs_diff(cx) <= CROSSHAIR_RADIUS)
    {
        return CROSSHAIR_COLOR;
    }

    let mut rng = PathRng::seed_from_u64(0);
    let Some(ray) = camera.ray(canvas, index, &mut rng) else {
        return pack_argb(Rgb::ZERO);
    };
    let mut path = PathRay::new(ray);
    path.media = scene.initialize_medium(path.ray.origin);
    path.flags = RayFlags::PREVIEW;

    let color = match scene.closest_intersect(&path.ray, path.media.current()) {
        Some(surface) => {
            let shading = surface.hit.normal.dot(PREVIEW_LIGHT).max(0.3) as f32;
            surface.hit.sample.color.to_rgb() * shading
        }
        None => scene.sky_sample(path.ray.direction).color,
    };
    pack_argb(color)
}

/// Gamma-adjusts a linear color by square root and packs it as opaque `0xAARRGGBB`.
pub fn pack_argb(color: Rgb) -> u32 {
    let [r, g, b] = color
        .map(|c| (c.sqrt() * 255.0).clamp(0.0, 255.0).floor())
        .to_array()
        .map(|c| c as u32);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockPalette, Shape};
    use crate::environment::{Sky, SkyColor, Sun};
    use crate::material::{ColorSource, Material, MaterialEntry, MaterialId, MaterialPalette};
    use crate::math::Rgba;
    use crate::medium::MediumHistory;
    use crate::math::GridAab;
    use crate::settings::{EmitterSettings, SceneSettings};
    use crate::voxels::BlockGrid;
    use euclid::point3;
    use pretty_assertions::assert_eq;

    fn dark() -> (Sky, Sun) {
        (
            Sky::BLACK,
            Sun {
                enabled: false,
                ..Sun::default()
            },
        )
    }

    fn settings(max_depth: u32) -> RenderSettings {
        RenderSettings {
            max_depth,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn pack() {
        assert_eq!(pack_argb(Rgb::ZERO), 0xFF00_0000);
        assert_eq!(pack_argb(Rgb::ONE), 0xFFFF_FFFF);
        assert_eq!(pack_argb(Rgb::new(0.25, 4.0, -1.0)), 0xFF7F_FF00);
    }

    #[test]
    fn sky_only() {
        let scene = Scene::new(BlockPalette::new(), MaterialPalette::new())
            .with_sky(Sky {
                color: SkyColor::Solid(Rgb::new(0.5, 0.25, 1.0)),
                intensity: 2.0,
            })
            .with_sun(dark().1);
        let settings = settings(3);
        let tracer = PathTracer::new(&scene, &settings);
        let mut info = TraceInfo::default();
        let path = PathRay::new(Ray::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
        let color = tracer.trace_path(path, &mut PathRng::seed_from_u64(1), &mut info);
        assert_eq!(color, Rgb::new(1.0, 0.5, 2.0));
        assert_eq!(info.paths, 1);
        assert_eq!(info.bounces, 0);
    }

    #[test]
    fn zero_depth_is_black() {
        let scene = Scene::new(BlockPalette::new(), MaterialPalette::new());
        let settings = settings(0);
        let tracer = PathTracer::new(&scene, &settings);
        let path = PathRay::new(Ray::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
        let color =
            tracer.trace_path(path, &mut PathRng::seed_from_u64(1), &mut TraceInfo::default());
        assert_eq!(color, Rgb::ZERO);
    }

    /// Looking straight at an emissive cube counts its emission on the first bounce.
    #[test]
    fn direct_view_of_emitter() {
        let mut materials = MaterialPalette::new();
        let lamp = materials.add(MaterialEntry::opaque(Rgb::new(1.0, 0.5, 1.0)).with_emittance(2.0));
        let mut blocks = BlockPalette::new();
        let lamp = blocks.push(Shape::FullCube { material: lamp });
        let mut grid = BlockGrid::new(GridAab::from_lower_size([0, 0, 0], [1, 1, 1]));
        grid.set(point3(0, 0, 0), lamp);
        let (sky, sun) = dark();
        let scene = Scene::new(blocks, materials)
            .with_block_index(grid)
            .with_sky(sky)
            .with_sun(sun);
        let mut settings = settings(1);
        settings.emitters = EmitterSettings {
            intensity: 1.0,
            ..EmitterSettings::default()
        };
        let tracer = PathTracer::new(&scene, &settings);
        let path = PathRay::new(Ray::new([0.5, 0.5, -2.0], [0.0, 0.0, 1.0]));
        let color =
            tracer.trace_path(path, &mut PathRng::seed_from_u64(1), &mut TraceInfo::default());
        // color² × emittance × intensity
        assert_eq!(color, Rgb::new(2.0, 0.5, 2.0));
    }

    /// A white floor under the sun, with sun sampling, gets direct light even though
    /// the only bounce allowed goes nowhere.
    #[test]
    fn sun_sampling_lights_floor() {
        let mut materials = MaterialPalette::new();
        let white = materials.add(MaterialEntry::opaque(Rgb::ONE));
        let mut blocks = BlockPalette::new();
        let floor = blocks.push(Shape::FullCube { material: white });
        let grid = BlockGrid::from_fn(GridAab::from_lower_size([-4, -1, -4], [9, 1, 9]), |_| {
            floor
        });
        let sun = Sun {
            altitude: std::f64::consts::FRAC_PI_2,
            ..Sun::default()
        };
        let scene = Scene::new(blocks, materials)
            .with_block_index(grid)
            .with_sky(Sky::BLACK)
            .with_sun(sun);
        let mut settings = settings(1);
        let path = || PathRay::new(Ray::new([0.5, 1.0, 0.5], [0.0, -1.0, 0.0]));

        let lit = PathTracer::new(&scene, &settings).trace_path(
            path(),
            &mut PathRng::seed_from_u64(5),
            &mut TraceInfo::default(),
        );
        assert!(lit.red() > 1.0 && lit.red() <= sun.intensity, "{lit:?}");

        settings.scene = SceneSettings {
            sun_sampling: false,
            ..SceneSettings::default()
        };
        let unlit = PathTracer::new(&scene, &settings).trace_path(
            path(),
            &mut PathRng::seed_from_u64(5),
            &mut TraceInfo::default(),
        );
        assert_eq!(unlit, Rgb::ZERO);
    }

    #[test]
    fn preview_crosshair_and_sky() {
        let scene = Scene::new(BlockPalette::new(), MaterialPalette::new())
            .with_sky(Sky {
                color: SkyColor::Solid(Rgb::splat(0.25)),
                intensity: 1.0,
            })
            .with_sun(dark().1);
        let camera = Camera::look_at([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 90.0);
        let canvas = CanvasConfig::new(20, 20);
        let at = |x: usize, y: usize| preview_pixel(&scene, &camera, &canvas, y * 20 + x);
        assert_eq!(at(10, 10), CROSSHAIR_COLOR);
        assert_eq!(at(10, 5), CROSSHAIR_COLOR);
        assert_eq!(at(15, 10), CROSSHAIR_COLOR);
        assert_eq!(at(10, 4), 0xFF7F_7F7F);
        assert_eq!(at(0, 0), 0xFF7F_7F7F);
    }

    #[test]
    fn preview_shading() {
        let mut materials = MaterialPalette::new();
        let white = materials.add(MaterialEntry::opaque(Rgb::ONE));
        let mut blocks = BlockPalette::new();
        let wall = blocks.push(Shape::FullCube { material: white });
        let grid = BlockGrid::from_fn(GridAab::from_lower_size([-10, -10, 3], [20, 20, 1]), |_| {
            wall
        });
        let scene = Scene::new(blocks, materials).with_block_index(grid);
        let camera = Camera::look_at([0.5, 0.5, 0.5], [0.5, 0.5, 5.0], 60.0);
        let canvas = CanvasConfig::new(20, 20);
        // The wall faces -Z, so the fixed light gives only the 0.3 ambient level.
        let expected = pack_argb(Rgb::splat(0.3));
        assert_eq!(preview_pixel(&scene, &camera, &canvas, 0), expected);
    }

    /// Clear glass at the origin cube and a lamp two cubes behind it along +Z.
    fn glass_before_lamp() -> (Scene, MaterialId) {
        let mut materials = MaterialPalette::new();
        let glass = materials.add(MaterialEntry {
            color: ColorSource::Flat(Rgba::new(1.0, 1.0, 1.0, 0.0)),
            material: Material::new(1.5, true, false),
            ..MaterialEntry::AIR
        });
        let lamp = materials.add(MaterialEntry::opaque(Rgb::ONE).with_emittance(1.0));
        let mut blocks = BlockPalette::new();
        let glass_block = blocks.push(Shape::FullCube { material: glass });
        let lamp_block = blocks.push(Shape::FullCube { material: lamp });
        let mut grid = BlockGrid::new(GridAab::from_lower_size([0, 0, 0], [1, 1, 4]));
        grid.set(point3(0, 0, 0), glass_block);
        grid.set(point3(0, 0, 3), lamp_block);
        let (sky, sun) = dark();
        let scene = Scene::new(blocks, materials)
            .with_block_index(grid)
            .with_sky(sky)
            .with_sun(sun);
        (scene, glass)
    }

    #[test]
    fn glass_medium_is_left_on_exit() {
        let (scene, glass) = glass_before_lamp();
        let ray = Ray::new([0.5, 0.5, -2.0], [0.0, 0.0, 1.0]);
        let mut media = MediumHistory::VACUUM;

        let entry = scene.closest_intersect(&ray, media.current()).unwrap();
        media.enter(Medium {
            material: entry.hit.material,
            block: entry.hit.block,
        });
        assert_eq!(media.current().material, glass);
        assert!(entry.material.is_refractive());

        let inside = ray.advance(entry.hit.distance + SURFACE_OFFSET);
        let exit = scene.closest_intersect(&inside, media.current()).unwrap();
        media.enter(Medium {
            material: exit.hit.material,
            block: exit.hit.block,
        });
        assert_eq!(media.current(), Medium::VACUUM);
        assert_eq!(media.previous().material, glass);
        assert!((exit.hit.distance - 1.0).abs() < 1e-3, "{exit:?}");
    }

    /// Paths through clear glass at normal incidence either pass straight through,
    /// keeping all their light, or are reflected away into the dark.
    #[test]
    fn lamp_seen_through_glass() {
        let (scene, _) = glass_before_lamp();
        let mut settings = settings(3);
        settings.emitters = EmitterSettings {
            intensity: 1.0,
            prevent_double_counting: false,
            ..EmitterSettings::default()
        };
        let tracer = PathTracer::new(&scene, &settings);

        let seeds = 200;
        let mut transmitted = 0;
        for seed in 0..seeds {
            let path = PathRay::new(Ray::new([0.5, 0.5, -2.0], [0.0, 0.0, 1.0]));
            let mut info = TraceInfo::default();
            let color = tracer.trace_path(path, &mut PathRng::seed_from_u64(seed), &mut info);
            if color.max_component() > 0.0 {
                assert!((color.red() - 1.0).abs() < 1e-3, "seed {seed}: {color:?}");
                assert_eq!(info.bounces, 3);
                transmitted += 1;
            }
        }
        // Schlick reflectance of about 4% at each of the two faces
        assert!(
            (160..seeds).contains(&transmitted),
            "{transmitted} of {seeds} paths reached the lamp"
        );
    }
}
