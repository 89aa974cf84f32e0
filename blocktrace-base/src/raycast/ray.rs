/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{FreeCoordinate, FreePoint, FreeVector};

use super::Raycaster;

/// A ray; a half-infinite line segment.
///
/// Unless otherwise stated, `t` values along a ray are in multiples of the direction
/// vector, so they are distances only when the direction is normalized.
#[allow(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// The sole endpoint of the ray.
    pub origin: FreePoint,

    /// The direction in which the ray extends infinitely.
    pub direction: FreeVector,
}

impl Ray {
    /// Constructs a [`Ray`] from convertible types (e.g. tuples or 3-element arrays).
    /// Other than the use of [`Into`], this is equivalent to a struct literal.
    ///
    /// ```
    /// use blocktrace_base::euclid::{point3, vec3};
    /// use blocktrace_base::raycast::Ray;
    ///
    /// assert_eq!(
    ///     Ray::new([1., 2., 3.], [4., 5., 6.]),
    ///     Ray {
    ///         origin: point3(1., 2., 3.),
    ///         direction: vec3(4., 5., 6.),
    ///     }
    /// );
    /// ```
    #[allow(clippy::missing_inline_in_public_items)] // is generic already
    pub fn new(origin: impl Into<FreePoint>, direction: impl Into<FreeVector>) -> Self {
        Self {
            origin: origin.into(),
            direction: direction.into(),
        }
    }

    /// Prepares a [`Raycaster`] that will iterate over cubes intersected by this ray.
    #[must_use]
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn cast(&self) -> Raycaster {
        Raycaster::new(self.origin, self.direction)
    }

    /// Returns the point `origin + direction * t`.
    #[inline]
    pub fn at(&self, t: FreeCoordinate) -> FreePoint {
        self.origin + self.direction * t
    }

    /// Returns a ray with the same direction whose origin is [`Self::at(t)`](Self::at).
    #[must_use]
    #[inline]
    pub fn advance(self, t: FreeCoordinate) -> Self {
        Self {
            origin: self.at(t),
            direction: self.direction,
        }
    }

    /// Returns the same ray with its direction scaled to unit length.
    ///
    /// A zero direction is left unchanged.
    #[must_use]
    #[inline]
    pub fn normalized(self) -> Self {
        let length = self.direction.length();
        if length > 0.0 {
            Self {
                origin: self.origin,
                direction: self.direction / length,
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::{point3, vec3};

    #[test]
    fn at_and_advance() {
        let ray = Ray::new([1.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        assert_eq!(ray.at(1.5), point3(1.0, 3.0, 0.0));
        assert_eq!(ray.advance(0.5).origin, point3(1.0, 1.0, 0.0));
        assert_eq!(ray.normalized().direction, vec3(0.0, 1.0, 0.0));
    }
}
