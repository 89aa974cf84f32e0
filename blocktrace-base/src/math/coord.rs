//! Numeric types used for coordinates and related quantities.

use euclid::{Point2D, Point3D, Vector3D};

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

/// Unit-of-measure type for vectors and points in world or block-local space,
/// where one unit is the edge length of one block.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug, Eq, PartialEq)]
pub enum Cube {}

/// Unit-of-measure type for texture coordinates, where the unit square spans a face.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug, Eq, PartialEq)]
pub enum TexelUnit {}

/// Coordinates that are locked to the cube grid.
pub type GridCoordinate = i32;

/// Positions that are locked to the cube grid.
pub type GridPoint = Point3D<GridCoordinate, Cube>;

/// Vectors that are locked to the cube grid.
pub type GridVector = Vector3D<GridCoordinate, Cube>;

/// Coordinates that are not locked to the cube grid.
///
/// Note: Because `GridCoordinate = i32` and `FreeCoordinate = f64`, which has
/// more than 32 bits of mantissa, the infallible conversion
/// `From<GridCoordinate> for FreeCoordinate` exists, which is often convenient.
pub type FreeCoordinate = f64;

/// Positions that are not locked to the cube grid but may interact with it.
pub type FreePoint = Point3D<FreeCoordinate, Cube>;

/// Vectors that are not locked to the cube grid but may interact with it.
pub type FreeVector = Vector3D<FreeCoordinate, Cube>;

/// Texture coordinates on a surface.
pub type TexPoint = Point2D<FreeCoordinate, TexelUnit>;

/// Returns the cube containing `point`, i.e. the componentwise floor.
///
/// Returns [`None`] if the point is NaN or outside the range of [`GridCoordinate`].
#[inline]
pub fn cube_containing(point: FreePoint) -> Option<GridPoint> {
    const RANGE: core::ops::Range<FreeCoordinate> =
        (GridCoordinate::MIN as FreeCoordinate)..(GridCoordinate::MAX as FreeCoordinate);

    let floored = point.floor();
    if RANGE.contains(&floored.x) && RANGE.contains(&floored.y) && RANGE.contains(&floored.z) {
        Some(floored.cast())
    } else {
        None
    }
}

/// Converts a cube's lower corner to a free point.
#[inline]
pub fn cube_lower_corner(cube: GridPoint) -> FreePoint {
    cube.map(FreeCoordinate::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point3;

    #[test]
    fn containing_floors_negative() {
        assert_eq!(
            cube_containing(point3(-0.5, 0.0, 2.9)),
            Some(point3(-1, 0, 2))
        );
    }

    #[test]
    fn containing_rejects_nan_and_huge() {
        assert_eq!(cube_containing(point3(f64::NAN, 0.0, 0.0)), None);
        assert_eq!(cube_containing(point3(0.0, 1e20, 0.0)), None);
    }
}
