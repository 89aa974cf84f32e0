use core::fmt;

use euclid::{Point3D, Size3D, point2};

use crate::math::{Axis, Cube, Face6, FreeCoordinate, FreePoint, FreeVector, TexPoint, sort_two};
use crate::raycast::Ray;

/// Axis-Aligned Box data type.
///
/// Used both for whole blocks (the unit cube) and for the smaller boxes
/// block models are assembled from, in block-local coordinates.
#[derive(Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aab {
    lower_bounds: FreePoint,
    upper_bounds: FreePoint,
}

/// Error from [`Aab::try_from_lower_upper()`] when the corners are misordered or NaN.
#[derive(Clone, Copy, Debug, PartialEq, displaydoc::Display)]
#[displaydoc("invalid box corners that are misordered or NaN: lower {lower:?} upper {upper:?}")]
#[non_exhaustive]
pub struct InvalidAab {
    /// The requested lower corner.
    pub lower: FreePoint,
    /// The requested upper corner.
    pub upper: FreePoint,
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidAab {}

/// The result of [`Aab::intersect_ray()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct AabHit {
    /// Distance along the ray, in multiples of its direction vector.
    pub t: FreeCoordinate,
    /// The face of the box which was crossed.
    pub face: Face6,
    /// Whether the ray crossed `face` from outside (true) or started inside and is leaving.
    pub entering: bool,
    /// Coordinates of the hit point on the face plane: `(z, y)` on X faces,
    /// `(x, z)` on Y faces and `(x, y)` on Z faces.
    pub uv: TexPoint,
}

impl AabHit {
    /// The surface normal at the hit point.
    ///
    /// When entering this points against the ray; when leaving it points outward,
    /// along the ray.
    #[inline]
    pub fn normal(&self) -> FreeVector {
        self.face.normal_vector()
    }
}

impl Aab {
    /// The [`Aab`] of zero size at the origin.
    pub const ZERO: Aab = Aab {
        lower_bounds: Point3D::new(0., 0., 0.),
        upper_bounds: Point3D::new(0., 0., 0.),
    };

    /// The unit cube, `[0, 1]` on every axis.
    pub const UNIT: Aab = Aab {
        lower_bounds: Point3D::new(0., 0., 0.),
        upper_bounds: Point3D::new(1., 1., 1.),
    };

    /// Constructs an [`Aab`] from individual coordinates.
    #[inline]
    #[track_caller]
    pub fn new(
        lx: FreeCoordinate,
        hx: FreeCoordinate,
        ly: FreeCoordinate,
        hy: FreeCoordinate,
        lz: FreeCoordinate,
        hz: FreeCoordinate,
    ) -> Self {
        Self::from_lower_upper(Point3D::new(lx, ly, lz), Point3D::new(hx, hy, hz))
    }

    /// Constructs an [`Aab`] from most-negative and most-positive corner points.
    ///
    /// Panics if the points are not in the proper order or if they are NaN.
    #[inline]
    #[track_caller]
    pub fn from_lower_upper(
        lower_bounds: impl Into<FreePoint>,
        upper_bounds: impl Into<FreePoint>,
    ) -> Self {
        match Self::try_from_lower_upper(lower_bounds.into(), upper_bounds.into()) {
            Ok(aab) => aab,
            Err(e) => panic!("{e}"),
        }
    }

    /// Constructs an [`Aab`] from most-negative and most-positive corner points.
    ///
    /// Returns an error if the points are not in the proper order or if they are NaN.
    #[inline]
    pub fn try_from_lower_upper(
        lower_bounds: FreePoint,
        upper_bounds: FreePoint,
    ) -> Result<Self, InvalidAab> {
        if lower_bounds.x <= upper_bounds.x
            && lower_bounds.y <= upper_bounds.y
            && lower_bounds.z <= upper_bounds.z
        {
            Ok(Self {
                lower_bounds,
                upper_bounds,
            })
        } else {
            Err(InvalidAab {
                lower: lower_bounds,
                upper: upper_bounds,
            })
        }
    }

    /// The most negative corner of the box, as a [`Point3D`].
    #[inline]
    pub const fn lower_bounds_p(&self) -> FreePoint {
        self.lower_bounds
    }

    /// The most positive corner of the box, as a [`Point3D`].
    #[inline]
    pub const fn upper_bounds_p(&self) -> FreePoint {
        self.upper_bounds
    }

    /// Size of the box in each axis; equivalent to
    /// `self.upper_bounds_p() - self.lower_bounds_p()`.
    #[inline]
    pub fn size(&self) -> Size3D<FreeCoordinate, Cube> {
        Size3D::from(self.upper_bounds - self.lower_bounds)
    }

    /// Returns whether this box includes the given point, boundary included.
    #[inline]
    pub fn contains(&self, point: FreePoint) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            self.lower_bounds[axis] <= point[axis] && point[axis] <= self.upper_bounds[axis]
        })
    }

    /// Returns the smallest box containing both `self` and `point`.
    #[inline]
    #[must_use]
    pub fn union_point(self, point: FreePoint) -> Self {
        Self {
            lower_bounds: self.lower_bounds.min(point),
            upper_bounds: self.upper_bounds.max(point),
        }
    }

    /// Translate this box by the specified offset.
    #[inline]
    #[must_use]
    pub fn translate(self, offset: FreeVector) -> Self {
        Self {
            lower_bounds: self.lower_bounds + offset,
            upper_bounds: self.upper_bounds + offset,
        }
    }

    /// Intersects the ray with the surface of this box (slab method).
    ///
    /// If the ray starts outside the box, the result is the first face it enters;
    /// if it starts inside, the face it leaves through. Crossings at `t <= t_min` are
    /// ignored, so a ray starting on a face and pointing away from the box does not hit.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn intersect_ray(&self, ray: &Ray, t_min: FreeCoordinate) -> Option<AabHit> {
        let mut t_near = FreeCoordinate::NEG_INFINITY;
        let mut t_far = FreeCoordinate::INFINITY;
        let mut near_axis = None;
        let mut far_axis = None;

        for axis in Axis::ALL {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lower, upper) = (self.lower_bounds[axis], self.upper_bounds[axis]);
            if direction == 0.0 {
                // Parallel to the slab: either always within it or never.
                if origin < lower || origin > upper {
                    return None;
                }
                continue;
            }
            let mut t1 = (lower - origin) / direction;
            let mut t2 = (upper - origin) / direction;
            sort_two(&mut t1, &mut t2);
            if t1 > t_near {
                t_near = t1;
                near_axis = Some(axis);
            }
            if t2 < t_far {
                t_far = t2;
                far_axis = Some(axis);
            }
        }

        if t_near > t_far {
            return None;
        }
        let (t, axis, entering) = if t_near > t_min {
            (t_near, near_axis?, true)
        } else if t_far > t_min {
            (t_far, far_axis?, false)
        } else {
            return None;
        };

        let heading_positive = ray.direction[axis] > 0.0;
        let face = Face6::from_axis(axis, heading_positive != entering);

        let point = ray.at(t);
        let uv = match axis {
            Axis::X => point2(point.z, point.y),
            Axis::Y => point2(point.x, point.z),
            Axis::Z => point2(point.x, point.y),
        };

        Some(AabHit {
            t,
            face,
            entering,
            uv,
        })
    }
}

impl fmt::Debug for Aab {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Aab {
            lower_bounds: l,
            upper_bounds: u,
        } = *self;
        fmt.debug_tuple("Aab")
            .field(&(l.x..=u.x))
            .field(&(l.y..=u.y))
            .field(&(l.z..=u.z))
            .finish()
    }
}
