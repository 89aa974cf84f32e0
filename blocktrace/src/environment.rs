//! Light arriving from outside the scene: [`Sky`] and [`Sun`].

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::math::{FreeVector, Rgb};

/// What a ray which escapes the scene sees, before scaling by the
/// [throughput](crate::integrator) of the path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct SkySample {
    /// Color of the sky or sun in that direction.
    pub color: Rgb,
    /// Brightness multiplier applied to `color`.
    pub emittance: f32,
}

impl SkySample {
    /// `color × emittance`.
    pub fn radiance(self) -> Rgb {
        self.color * self.emittance
    }
}

/// Color of a [`Sky`] as a function of direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum SkyColor {
    /// Same in every direction.
    Solid(Rgb),
    /// Blends from `horizon` at and below the horizon to `zenith` straight up.
    Gradient {
        #[allow(missing_docs)]
        horizon: Rgb,
        #[allow(missing_docs)]
        zenith: Rgb,
    },
}

/// Background light of the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct Sky {
    #[allow(missing_docs)]
    pub color: SkyColor,
    /// Brightness multiplier; the emittance of every sky sample.
    pub intensity: f32,
}

impl Sky {
    /// A sky which contributes no light.
    pub const BLACK: Self = Self {
        color: SkyColor::Solid(Rgb::ZERO),
        intensity: 0.0,
    };

    /// Samples the sky in `direction`, which need not be normalized.
    pub fn sample(&self, direction: FreeVector) -> SkySample {
        let color = match self.color {
            SkyColor::Solid(color) => color,
            SkyColor::Gradient { horizon, zenith } => {
                let length = direction.length();
                let up = if length > 0.0 {
                    (direction.y / length).clamp(0.0, 1.0) as f32
                } else {
                    0.0
                };
                horizon * (1.0 - up) + zenith * up
            }
        };
        SkySample {
            color,
            emittance: self.intensity,
        }
    }
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            color: SkyColor::Gradient {
                horizon: Rgb::new(0.78, 0.86, 1.0),
                zenith: Rgb::new(0.28, 0.45, 0.85),
            },
            intensity: 1.0,
        }
    }
}

/// A distant disk-shaped light source.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[expect(clippy::exhaustive_structs)]
pub struct Sun {
    /// If false, the sun is neither visible nor sampled.
    pub enabled: bool,
    /// Angle around the vertical axis, in radians, measured from +X toward +Z.
    pub azimuth: f64,
    /// Angle above the horizon, in radians.
    pub altitude: f64,
    /// Angular radius of the disk, in radians.
    pub radius: f64,
    #[allow(missing_docs)]
    pub color: Rgb,
    /// Brightness of the disk when seen directly and when sampled for direct lighting.
    pub intensity: f32,
    /// Extra multiplier for direct lighting when the luminosity setting is on.
    pub luminosity: f32,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            enabled: true,
            azimuth: PI / 2.5,
            altitude: PI / 3.0,
            radius: 0.03,
            color: Rgb::ONE,
            intensity: 1.25,
            luminosity: 100.0,
        }
    }
}

impl Sun {
    /// Unit vector pointing toward the center of the sun.
    pub fn direction(&self) -> FreeVector {
        let (sin_alt, cos_alt) = self.altitude.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        FreeVector::new(cos_alt * cos_az, sin_alt, cos_alt * sin_az)
    }

    /// Light emitted toward the scene.
    pub fn emittance(&self) -> Rgb {
        self.color * self.intensity
    }

    /// Whether `direction` (not necessarily normalized) points into the sun's disk.
    pub fn contains(&self, direction: FreeVector) -> bool {
        let length = direction.length();
        self.enabled && length > 0.0 && direction.dot(self.direction()) / length >= self.radius.cos()
    }

    /// What a ray escaping in `direction` sees of the sun, if anything.
    pub fn intersect(&self, direction: FreeVector) -> Option<SkySample> {
        self.contains(direction).then_some(SkySample {
            color: self.color,
            emittance: self.intensity,
        })
    }

    /// Picks a direction uniformly distributed over the sun's disk.
    ///
    /// Returns [`None`] if the sun is disabled.
    pub fn sample_direction(&self, rng: &mut impl Rng) -> Option<FreeVector> {
        if !self.enabled {
            return None;
        }
        let center = self.direction();
        let (tangent, bitangent) = orthonormal_basis(center);
        let r = self.radius.tan() * rng.random::<f64>().sqrt();
        let (sin_phi, cos_phi) = (TAU * rng.random::<f64>()).sin_cos();
        Some((center + tangent * (r * cos_phi) + bitangent * (r * sin_phi)).normalize())
    }
}

/// Two unit vectors perpendicular to `n` and to each other.
fn orthonormal_basis(n: FreeVector) -> (FreeVector, FreeVector) {
    let helper = if n.x.abs() > 0.9 {
        FreeVector::new(0.0, 1.0, 0.0)
    } else {
        FreeVector::new(1.0, 0.0, 0.0)
    };
    let tangent = helper.cross(n).normalize();
    (tangent, n.cross(tangent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::vec3;
    use rand::SeedableRng as _;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn gradient() {
        let sky = Sky {
            color: SkyColor::Gradient {
                horizon: Rgb::ONE,
                zenith: Rgb::ZERO,
            },
            intensity: 2.0,
        };
        assert_eq!(sky.sample(vec3(0.0, 5.0, 0.0)).color, Rgb::ZERO);
        assert_eq!(sky.sample(vec3(1.0, -1.0, 0.0)).color, Rgb::ONE);
        assert_eq!(sky.sample(vec3(1.0, 0.0, 0.0)).radiance(), Rgb::splat(2.0));
    }

    #[test]
    fn sun_samples_are_within_disk() {
        let sun = Sun::default();
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        for _ in 0..1000 {
            let d = sun.sample_direction(&mut rng).unwrap();
            assert!((d.length() - 1.0).abs() < 1e-9);
            // allow for rounding at the rim
            assert!(d.dot(sun.direction()) >= (sun.radius * 1.0001).cos(), "{d:?}");
        }
        assert!(sun.contains(sun.direction() * 3.0));
        assert!(!sun.contains(-sun.direction()));
    }

    #[test]
    fn disabled_sun() {
        let sun = Sun {
            enabled: false,
            ..Sun::default()
        };
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        assert_eq!(sun.sample_direction(&mut rng), None);
        assert_eq!(sun.intersect(sun.direction()), None);
    }
}
