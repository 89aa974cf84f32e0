//! Next-event estimation: shadow rays toward the sun and toward emissive blocks.
//!
//! Shadow rays pass through translucent surfaces, picking up their color, but each one
//! crosses at most [`MAX_SHADOW_CROSSINGS`] surfaces; a ray which would cross more is
//! treated as fully blocked.

use std::f32::consts::PI;

use rand::Rng;

use crate::emitter_grid::Emitter;
use crate::integrator::TraceInfo;
use crate::material::scatter::translucent_transmission;
use crate::math::{FreePoint, FreeVector, Rgb, Rgba, cube_containing, cube_lower_corner};
use crate::medium::{Medium, MediumHistory};
use crate::raycast::Ray;
use crate::scene::Scene;
use crate::settings::{EmitterSamplingStrategy, EmitterSettings, SceneSettings};
use crate::{EPSILON, SURFACE_OFFSET};

/// Most surfaces a shadow ray may pass through.
pub const MAX_SHADOW_CROSSINGS: usize = 64;

/// Transmittance below which an emitter sample is abandoned.
const MIN_TRANSMITTANCE: f32 = 1e-3;

/// Returns how much light arriving from the sky along `ray`, reversed, reaches its origin.
///
/// The color channels are the filter applied by the translucent surfaces crossed; alpha is
/// the fraction passed at all. With `strict`, crossing any change in index of refraction
/// blocks the light entirely.
pub fn direct_light_attenuation(
    scene: &Scene,
    mut ray: Ray,
    mut media: MediumHistory,
    strict: bool,
    info: &mut TraceInfo,
) -> Rgba {
    info.shadow_rays += 1;
    let mut color = Rgb::ONE;
    let mut alpha: f32 = 1.0;

    let mut crossings = 0;
    while alpha > 0.0 {
        if crossings == MAX_SHADOW_CROSSINGS {
            info.shadow_rays_capped += 1;
            log::trace!("sun shadow ray capped at {ray:?}");
            return Rgba::TRANSPARENT;
        }
        crossings += 1;

        ray = ray.advance(SURFACE_OFFSET);
        let Some(surface) = scene.closest_intersect(&ray, media.current()) else {
            break;
        };
        let hit = surface.hit;
        media.enter(Medium {
            material: hit.material,
            block: hit.block,
        });

        let a = hit.sample.color.alpha();
        let pass = 1.0 - a;
        color *= hit.sample.color.to_rgb() * a + Rgb::splat(pass);
        alpha *= pass;

        if strict {
            let before = scene.materials.get(media.previous().material);
            if (before.ior() - surface.material.ior()).abs() >= EPSILON {
                alpha = 0.0;
            }
        }

        ray = ray.advance(hit.distance);
    }
    color.with_alpha(alpha)
}

/// Light arriving at `hit_point` from the emitters listed in its emitter grid cell,
/// according to `strategy`.
///
/// `normal` is the surface normal; emitters behind it contribute nothing.
#[expect(clippy::too_many_arguments)]
pub fn sample_emitters<R: Rng>(
    scene: &Scene,
    hit_point: FreePoint,
    normal: FreeVector,
    strategy: EmitterSamplingStrategy,
    emitter_settings: &EmitterSettings,
    scene_settings: &SceneSettings,
    rng: &mut R,
    info: &mut TraceInfo,
) -> Rgb {
    let Some(cube) = cube_containing(hit_point) else {
        return Rgb::ZERO;
    };
    let range = scene.emitters.cell_range(cube);
    let count = range.len();
    if count == 0 {
        return Rgb::ZERO;
    }
    let mut sample_face = |emitter: Emitter, face: usize, scaler: f32, rng: &mut R| {
        sample_emitter_face(
            scene,
            hit_point,
            normal,
            emitter,
            face,
            scaler,
            emitter_settings.intensity,
            scene_settings,
            rng,
            info,
        )
    };

    match strategy {
        EmitterSamplingStrategy::None => Rgb::ZERO,
        EmitterSamplingStrategy::One | EmitterSamplingStrategy::OneBlock => {
            let pick = pick_index(&mut *rng, count);
            let Some(emitter) = scene.emitters.emitter(range.start + pick) else {
                return Rgb::ZERO;
            };
            let face_count = scene.blocks.emitter_face_count(emitter.block);
            if face_count == 0 {
                return Rgb::ZERO;
            }
            if strategy == EmitterSamplingStrategy::One {
                let face = pick_index(&mut *rng, face_count);
                sample_face(emitter, face, PI, &mut *rng)
            } else {
                let scaler = PI / face_count as f32;
                (0..face_count)
                    .map(|face| sample_face(emitter, face, scaler, &mut *rng))
                    .sum()
            }
        }
        EmitterSamplingStrategy::All => {
            let emitter_scaler = PI / count as f32;
            let mut total = Rgb::ZERO;
            for emitter in range.filter_map(|i| scene.emitters.emitter(i)) {
                let face_count = scene.blocks.emitter_face_count(emitter.block);
                if face_count == 0 {
                    continue;
                }
                let scaler = emitter_scaler / face_count as f32;
                for face in 0..face_count {
                    total += sample_face(emitter, face, scaler, &mut *rng);
                }
            }
            total
        }
    }
}

/// Uniformly chosen index less than `count`, which must be nonzero.
fn pick_index(rng: &mut impl Rng, count: usize) -> usize {
    ((rng.random::<f32>() * count as f32) as usize).min(count - 1)
}

/// Light arriving at `hit_point` from a random point on one face of `emitter`, weighted by
/// `face_scaler`.
///
/// The shadow ray must end on the emitter itself; translucent surfaces on the way filter
/// the light, and refractive colored glass has its hue strengthened.
#[expect(clippy::too_many_arguments)]
pub fn sample_emitter_face(
    scene: &Scene,
    hit_point: FreePoint,
    normal: FreeVector,
    emitter: Emitter,
    face: usize,
    face_scaler: f32,
    intensity: f32,
    settings: &SceneSettings,
    rng: &mut impl Rng,
    info: &mut TraceInfo,
) -> Rgb {
    let uv = [rng.random::<f64>(), rng.random::<f64>()];
    let Some(face_sample) = scene.blocks.sample_emitter_face(emitter.block, face, uv) else {
        return Rgb::ZERO;
    };
    let target = cube_lower_corner(emitter.position) + face_sample.position.to_vector();
    let to_emitter = target - hit_point;
    let distance = to_emitter.length();
    if distance <= f64::from(EPSILON) {
        return Rgb::ZERO;
    }
    let direction = to_emitter / distance;
    if direction.dot(normal) <= 0.0 {
        return Rgb::ZERO;
    }

    info.shadow_rays += 1;
    let mut ray = Ray::new(hit_point + direction * SURFACE_OFFSET, direction);
    let mut media = MediumHistory::VACUUM;
    let mut traveled = 0.0;
    let mut attenuation = Rgb::ONE;
    for _ in 0..MAX_SHADOW_CROSSINGS {
        if traveled >= distance {
            return Rgb::ZERO;
        }
        let Some(surface) = scene.closest_intersect(&ray, media.current()) else {
            return Rgb::ZERO;
        };
        let hit = surface.hit;
        let sample = hit.sample;

        traveled += hit.distance;
        if traveled >= distance - 2.0 * SURFACE_OFFSET {
            if hit.block != emitter.block || sample.emittance <= EPSILON {
                return Rgb::ZERO;
            }
            let e = direction.dot(hit.normal).abs() / (distance * distance).max(1.0)
                * face_sample.area;
            let e = e as f32 * sample.emittance * intensity * face_scaler;
            return attenuation * sample.color.to_rgb() * e;
        }

        let alpha = sample.color.alpha();
        let mut transmittance = translucent_transmission(
            &sample,
            alpha,
            settings.transmissivity_cap,
            settings.fancier_translucency,
        );
        if surface.material.is_refractive() && !surface.material.is_opaque() && alpha > EPSILON {
            let color = sample.color.to_rgb();
            let average = color.mean();
            if average > EPSILON {
                let boost = (color / average).clamp(4.0);
                let mix = (alpha * 2.25).clamp(0.0, 1.0);
                transmittance *= Rgb::splat(1.0 - mix) + boost * mix;
            }
        }
        attenuation *= transmittance;
        if attenuation.max_component() <= MIN_TRANSMITTANCE {
            return Rgb::ZERO;
        }

        media.enter(Medium {
            material: hit.material,
            block: hit.block,
        });
        ray = ray.advance(hit.distance + SURFACE_OFFSET);
        traveled += SURFACE_OFFSET;
    }
    if traveled < distance {
        info.shadow_rays_capped += 1;
        log::trace!("emitter shadow ray capped toward {emitter:?}");
    }
    Rgb::ZERO
}
