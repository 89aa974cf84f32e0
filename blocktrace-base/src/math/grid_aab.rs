use core::fmt;
use core::ops::Range;

use euclid::{Point3D, Size3D};

use crate::math::{Aab, Axis, Cube, FreeCoordinate, GridCoordinate, GridPoint, cube_lower_corner};

/// Size of a [`GridAab`]; nonnegative on every axis.
pub type GridSize = Size3D<GridCoordinate, Cube>;

/// An axis-aligned box with integer coordinates, whose volume is no larger than [`usize::MAX`].
///
/// The box is the set of cubes whose lower corners `c` satisfy
/// `lower_bounds <= c < upper_bounds` on every axis.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridAab {
    lower_bounds: GridPoint,
    upper_bounds: GridPoint,
}

impl GridAab {
    /// The [`GridAab`] of zero size at the origin.
    pub const ORIGIN_EMPTY: GridAab = GridAab {
        lower_bounds: Point3D::new(0, 0, 0),
        upper_bounds: Point3D::new(0, 0, 0),
    };

    /// Constructs a [`GridAab`] from its lower corner and size.
    ///
    /// Panics if the size is negative or the upper corner would overflow.
    #[inline]
    #[track_caller]
    pub fn from_lower_size(lower_bounds: impl Into<GridPoint>, size: impl Into<GridSize>) -> Self {
        let lower_bounds = lower_bounds.into();
        let size = size.into();
        assert!(
            size.width >= 0 && size.height >= 0 && size.depth >= 0,
            "negative GridAab size {size:?}"
        );
        let upper = |l: GridCoordinate, s: GridCoordinate| match l.checked_add(s) {
            Some(u) => u,
            None => panic!("GridAab upper bound overflow"),
        };
        Self {
            lower_bounds,
            upper_bounds: Point3D::new(
                upper(lower_bounds.x, size.width),
                upper(lower_bounds.y, size.height),
                upper(lower_bounds.z, size.depth),
            ),
        }
    }

    /// Inclusive lower bounds on cube coordinates.
    #[inline]
    pub const fn lower_bounds(&self) -> GridPoint {
        self.lower_bounds
    }

    /// Exclusive upper bounds on cube coordinates.
    #[inline]
    pub const fn upper_bounds(&self) -> GridPoint {
        self.upper_bounds
    }

    /// Size of the box in each axis.
    #[inline]
    pub fn size(&self) -> GridSize {
        Size3D::from(self.upper_bounds - self.lower_bounds)
    }

    /// Number of cubes in the box.
    #[inline]
    pub fn volume(&self) -> usize {
        let size = self.size();
        [size.width, size.height, size.depth]
            .into_iter()
            .map(|s| usize::try_from(s).unwrap_or(0))
            .product()
    }

    /// The range of coordinates for cubes within this box along the given axis.
    #[inline]
    pub fn axis_range(&self, axis: Axis) -> Range<GridCoordinate> {
        self.lower_bounds[axis]..self.upper_bounds[axis]
    }

    /// Returns whether the box includes the cube with the given lower corner.
    #[inline]
    pub fn contains_cube(&self, cube: GridPoint) -> bool {
        Axis::ALL
            .into_iter()
            .all(|axis| self.axis_range(axis).contains(&cube[axis]))
    }

    /// Linear index of `cube` within the box, or [`None`] if it is outside.
    ///
    /// Z varies fastest, then X, then Y.
    #[inline]
    pub fn index(&self, cube: GridPoint) -> Option<usize> {
        if !self.contains_cube(cube) {
            return None;
        }
        let size = self.size().to_usize();
        let rel = (cube - self.lower_bounds).to_usize();
        Some((rel.y * size.width + rel.x) * size.depth + rel.z)
    }

    /// Iterates over all cubes in the box, in [`GridAab::index()`] order.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn interior_iter(self) -> impl Iterator<Item = GridPoint> {
        let (xs, ys, zs) = (
            self.axis_range(Axis::X),
            self.axis_range(Axis::Y),
            self.axis_range(Axis::Z),
        );
        ys.flat_map(move |y| {
            let zs = zs.clone();
            xs.clone()
                .flat_map(move |x| zs.clone().map(move |z| Point3D::new(x, y, z)))
        })
    }

    /// Converts to the [`Aab`] covering the same volume.
    #[inline]
    pub fn to_free(self) -> Aab {
        Aab::from_lower_upper(
            cube_lower_corner(self.lower_bounds),
            self.upper_bounds.map(FreeCoordinate::from),
        )
    }
}

impl fmt::Debug for GridAab {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (l, u) = (self.lower_bounds, self.upper_bounds);
        fmt.debug_tuple("GridAab")
            .field(&(l.x..u.x))
            .field(&(l.y..u.y))
            .field(&(l.z..u.z))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::{point3, size3};
    use pretty_assertions::assert_eq;

    #[test]
    fn index_matches_iteration_order() {
        let aab = GridAab::from_lower_size([-1, 2, 0], [2, 3, 4]);
        assert_eq!(aab.volume(), 24);
        for (expected, cube) in aab.interior_iter().enumerate() {
            assert_eq!(aab.index(cube), Some(expected));
        }
        assert_eq!(aab.index(point3(1, 2, 0)), None);
    }

    #[test]
    fn index_is_y_major() {
        let aab = GridAab::from_lower_size([0, 0, 0], [2, 3, 4]);
        assert_eq!(aab.index(point3(0, 0, 1)), Some(1));
        assert_eq!(aab.index(point3(1, 0, 0)), Some(4));
        assert_eq!(aab.index(point3(0, 1, 0)), Some(8));
        assert_eq!(aab.index(point3(1, 2, 3)), Some(23));
    }

    #[test]
    fn to_free() {
        let aab = GridAab::from_lower_size([1, 2, 3], size3(1, 1, 2));
        assert_eq!(aab.to_free(), Aab::new(1.0, 2.0, 2.0, 3.0, 3.0, 5.0));
    }

    #[test]
    #[should_panic = "negative GridAab size"]
    fn negative_size() {
        let _ = GridAab::from_lower_size([0, 0, 0], [1, -1, 1]);
    }
}
