//! Directions and transmittance of light interacting with a surface.
//!
//! All functions taking a `normal` accept it facing either way; it is oriented against
//! the incoming `direction` before use.

use rand::Rng;
use rand_distr::{Distribution as _, UnitSphere};

use crate::EPSILON;
use crate::material::MaterialSample;
use crate::math::{FreeVector, Rgb};

/// Returns `normal` or its negation, whichever points against `direction`.
pub fn facing(normal: FreeVector, direction: FreeVector) -> FreeVector {
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Mirror reflection of `direction` about `normal`, blended toward a diffuse direction by
/// `roughness`.
pub fn specular_reflection(
    direction: FreeVector,
    normal: FreeVector,
    roughness: f32,
    rng: &mut impl Rng,
) -> FreeVector {
    let n = facing(normal, direction);
    let mirror = direction - n * (2.0 * direction.dot(n));
    if roughness <= EPSILON {
        return mirror;
    }
    let diffuse = diffuse_reflection(direction, normal, rng);
    let blended = mirror.lerp(diffuse, f64::from(roughness));
    let length = blended.length();
    if length > 0.0 {
        blended / length
    } else {
        n
    }
}

/// Cosine-weighted random direction in the hemisphere on the side of `normal` the ray came from.
pub fn diffuse_reflection(
    direction: FreeVector,
    normal: FreeVector,
    rng: &mut impl Rng,
) -> FreeVector {
    let n = facing(normal, direction);
    let [x, y, z]: [f64; 3] = UnitSphere.sample(rng);
    let candidate = n + FreeVector::new(x, y, z);
    let length = candidate.length();
    // A sphere point exactly opposite the normal leaves nothing to normalize.
    if length > 1e-9 { candidate / length } else { n }
}

/// Refracts `direction` through a surface with the given normal, going from a medium with
/// index of refraction `n1` into one with `n2`, by Snell's law.
///
/// In the case of total internal reflection, the result is the mirror reflection.
pub fn refraction(direction: FreeVector, normal: FreeVector, n1: f32, n2: f32) -> FreeVector {
    let n = facing(normal, direction);
    let ratio = f64::from(n1 / n2);
    let cos_theta = -n.dot(direction);
    let radicand = 1.0 - ratio * ratio * (1.0 - cos_theta * cos_theta);
    if radicand < 0.0 {
        return direction + n * (2.0 * cos_theta);
    }
    (direction * ratio + n * (ratio * cos_theta - radicand.sqrt())).normalize()
}

/// Whether refraction from `n1` to `n2` at this incidence angle is impossible, so that all
/// light is reflected.
///
/// `cos_theta` is the cosine of the angle between the ray and the surface normal.
pub fn is_total_internal_reflection(n1: f32, n2: f32, cos_theta: f32) -> bool {
    let ratio = n1 / n2;
    1.0 - ratio * ratio * (1.0 - cos_theta * cos_theta) < EPSILON
}

/// Schlick's approximation of the Fresnel reflectance of a boundary between media with
/// indices of refraction `n1` and `n2`.
///
/// `cos_theta` is the cosine of the angle between the ray and the surface normal;
/// its sign is ignored.
pub fn schlick_reflectance(n1: f32, n2: f32, cos_theta: f32) -> f32 {
    let ratio = n1 / n2;
    let r0 = ((ratio - 1.0) / (ratio + 1.0)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta.abs()).powi(5)
}

/// Fraction of light, per channel, which passes through a translucent surface.
///
/// `absorb` is the surface's effective opacity. In plain mode the surface acts as a
/// colored filter weighted by opacity. In `fancier` mode the hue of the surface is kept
/// but its brightness is normalized away, so that dark glass does not also darken light
/// unrealistically; the result is limited to `cap` per channel.
pub fn translucent_transmission(
    sample: &MaterialSample,
    absorb: f32,
    cap: f32,
    fancier: bool,
) -> Rgb {
    let color = sample.color.to_rgb();
    if fancier {
        let mean = color.mean();
        if mean <= EPSILON {
            Rgb::splat(1.0 - absorb)
        } else {
            (color * ((1.0 - absorb) / mean)).min(cap)
        }
    } else {
        Rgb::splat(1.0 - absorb) + color * absorb
    }
}

/// Probability that a surface with the given sample scatters diffusely rather than
/// transmitting.
pub fn diffuse_probability(sample: &MaterialSample, fancier: bool) -> f32 {
    let alpha = sample.color.alpha();
    if fancier {
        1.0 - (1.0 - alpha).powf(sample.color.to_rgb().max_component())
    } else {
        alpha
    }
}

/// Opacity to use for [`translucent_transmission()`] after diffuse scattering with
/// probability `p_diffuse` has been ruled out.
pub fn absorb_probability(sample: &MaterialSample, p_diffuse: f32, fancier: bool) -> f32 {
    let alpha = sample.color.alpha();
    if fancier {
        1.0 - (1.0 - alpha) / (1.0 - p_diffuse + EPSILON)
    } else {
        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rgba;
    use euclid::vec3;
    use rand::SeedableRng as _;
    use rand_xoshiro::Xoshiro256Plus;

    fn rng() -> Xoshiro256Plus {
        Xoshiro256Plus::seed_from_u64(0xB10C)
    }

    #[test]
    fn schlick_at_normal_incidence_is_r0() {
        let ratio: f32 = 1.0 / 1.5;
        let r0 = ((ratio - 1.0) / (ratio + 1.0)).powi(2);
        assert_eq!(schlick_reflectance(1.0, 1.5, 1.0), r0);
        assert_eq!(schlick_reflectance(1.0, 1.5, -1.0), r0);
        assert_eq!(schlick_reflectance(1.0, 1.5, 0.0), 1.0);
    }

    #[test]
    fn refraction_straight_through_at_normal_incidence() {
        let d = vec3(0.0, 0.0, 1.0);
        let r = refraction(d, vec3(0.0, 0.0, -1.0), 1.0, 1.5);
        assert!((r - d).length() < 1e-12, "{r:?}");
    }

    #[test]
    fn refraction_bends_toward_normal() {
        let d = vec3(1.0, 0.0, 1.0).normalize();
        let r = refraction(d, vec3(0.0, 0.0, 1.0), 1.0, 1.5);
        assert!(r.x > 0.0 && r.x < d.x, "{r:?}");
        assert!((r.length() - 1.0).abs() < 1e-9);
        // sin(θ2) = sin(θ1) · n1 / n2
        assert!((r.x - d.x / 1.5).abs() < 1e-6, "{r:?}");
    }

    #[test]
    fn total_internal_reflection() {
        assert!(is_total_internal_reflection(1.5, 1.0, 0.1));
        assert!(!is_total_internal_reflection(1.5, 1.0, 1.0));
        assert!(!is_total_internal_reflection(1.0, 1.5, 0.0));
        let d = vec3(1.0, 0.0, 0.1).normalize();
        let r = refraction(d, vec3(0.0, 0.0, 1.0), 1.5, 1.0);
        assert!((r - vec3(d.x, d.y, -d.z)).length() < 1e-12, "{r:?}");
    }

    #[test]
    fn mirror_reflection() {
        let d = vec3(1.0, -1.0, 0.0).normalize();
        let r = specular_reflection(d, vec3(0.0, 1.0, 0.0), 0.0, &mut rng());
        assert!((r - vec3(d.x, -d.y, 0.0)).length() < 1e-12);
        // normal facing the wrong way gives the same answer
        let r2 = specular_reflection(d, vec3(0.0, -1.0, 0.0), 0.0, &mut rng());
        assert_eq!(r, r2);
    }

    #[test]
    fn diffuse_stays_in_hemisphere() {
        let mut rng = rng();
        let d = vec3(0.3, -1.0, 0.2).normalize();
        for _ in 0..1000 {
            let r = diffuse_reflection(d, vec3(0.0, 1.0, 0.0), &mut rng);
            assert!(r.y >= 0.0, "{r:?}");
            assert!((r.length() - 1.0).abs() < 1e-9);
            let rough = specular_reflection(d, vec3(0.0, 1.0, 0.0), 0.5, &mut rng);
            assert!(rough.y >= 0.0, "{rough:?}");
        }
    }

    #[test]
    fn plain_transmission_is_alpha_blend() {
        let sample = MaterialSample::new(Rgba::new(1.0, 0.5, 0.0, 0.5));
        assert_eq!(
            translucent_transmission(&sample, 0.5, 1.0, false),
            Rgb::new(1.0, 0.75, 0.5)
        );
    }

    #[test]
    fn fancier_transmission_normalizes_brightness() {
        let sample = MaterialSample::new(Rgba::new(0.2, 0.1, 0.0, 0.5));
        let t = translucent_transmission(&sample, 0.5, 1.0, true);
        assert!((t.red() - 1.0).abs() < 1e-6, "{t:?}");
        assert!((t.green() - 0.5).abs() < 1e-6, "{t:?}");
        assert_eq!(t.blue(), 0.0);

        let black = MaterialSample::new(Rgba::new(0.0, 0.0, 0.0, 0.25));
        assert_eq!(
            translucent_transmission(&black, 0.25, 1.0, true),
            Rgb::splat(0.75)
        );
    }

    #[test]
    fn probabilities() {
        let opaque = MaterialSample::new(Rgba::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(diffuse_probability(&opaque, true), 1.0);
        assert_eq!(diffuse_probability(&opaque, false), 1.0);
        let clear = MaterialSample::new(Rgba::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(diffuse_probability(&clear, true), 0.0);
        assert!(absorb_probability(&clear, 0.0, true).abs() < 1e-5);
    }
}
