//! Traversal of the unit-cube grid along a ray.

use euclid::Vector3D;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{
    Axis, Face6, FreeCoordinate, FreePoint, FreeVector, GridAab, GridCoordinate, GridPoint,
    GridVector, cube_containing,
};

// -------------------------------------------------------------------------------------------------

mod ray;
pub use ray::Ray;

// -------------------------------------------------------------------------------------------------

/// Vector unit type for units of "t" (ray-length).
enum Tc {}

/// Iterator over grid positions that intersect a given ray.
///
/// The grid is of unit cubes which are identified by the integer coordinates of
/// their most negative corners.
//
// Implementation notes:
//
// From "A Fast Voxel Traversal Algorithm for Ray Tracing"
// by John Amanatides and Andrew Woo, 1987
// <http://www.cse.yorku.ca/~amana/research/grid.pdf>
//
// At any point in the traversal, `t_max` holds, per axis, the t value at which the ray
// next crosses a cube boundary perpendicular to that axis. The least component is
// therefore the next crossing.
#[derive(Clone, Debug, PartialEq)]
pub struct Raycaster {
    ray: Ray,

    /// Which way to increment `cube` when stepping; signum of the ray's direction.
    step: GridVector,

    /// Change in t for a full grid step along each axis; infinite for a perpendicular axis.
    t_delta: Vector3D<FreeCoordinate, Tc>,

    t_max: Vector3D<FreeCoordinate, Tc>,

    /// Cube we're in; always the next cube to return from the iterator.
    cube: GridPoint,

    /// Last face we passed through, or [`None`] if we have not yet stepped.
    last_face: Option<Face6>,

    /// The t at which we passed through `last_face`.
    last_t_distance: FreeCoordinate,

    bounds: Option<GridAab>,

    phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    /// Nothing has been produced yet; the current cube may be outside the bounds.
    Beginning,
    /// At least one step has been produced, so we are in bounds.
    InBounds,
    /// No more items will be produced.
    Ended,
}

impl Raycaster {
    /// Construct a [`Raycaster`] for a ray with the given `origin` and `direction` vector.
    ///
    /// The magnitude of `direction` has no effect on the sequence of cubes traversed
    /// but appears as the scale of [`RaycastStep::t_distance()`].
    ///
    /// This is an infinite iterator unless restricted with [`.within()`](Self::within).
    ///
    /// ```
    /// use blocktrace_base::euclid::point3;
    /// use blocktrace_base::raycast::Raycaster;
    ///
    /// let mut r = Raycaster::new([0.5, 0.5, 0.5], [1.0, 0.5, 0.0]);
    /// let mut next = || r.next().unwrap();
    ///
    /// // The cube containing the origin point is always the first cube reported.
    /// assert_eq!(next().cube_ahead(), point3(0, 0, 0));
    /// assert_eq!(next().cube_ahead(), point3(1, 0, 0));
    /// assert_eq!(next().cube_ahead(), point3(1, 1, 0));
    /// assert_eq!(next().cube_ahead(), point3(2, 1, 0));
    /// ```
    #[must_use]
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new(origin: impl Into<FreePoint>, direction: impl Into<FreeVector>) -> Self {
        let mut direction: FreeVector = direction.into();
        // A huge direction makes t values indistinguishable; treat it as no motion.
        if !direction.to_array().iter().all(|d| d.abs() < 1e100) {
            direction = Vector3D::zero();
        }
        let ray = Ray::new(origin, direction);

        let mut this = Self {
            ray,
            step: direction.map(signum_101),
            t_delta: direction.map(|x| x.abs().recip()).cast_unit(),
            t_max: Vector3D::zero(),
            cube: GridPoint::origin(),
            last_face: None,
            last_t_distance: 0.0,
            bounds: None,
            phase: Phase::Beginning,
        };
        if !this.restart_at(0.0) {
            this.phase = Phase::Ended;
        }
        this
    }

    /// Restrict the cubes iterated over to those which lie within the given [`GridAab`].
    ///
    /// This makes the iterator finite. Calling it more than once replaces the bounds.
    #[must_use]
    #[inline]
    pub fn within(mut self, bounds: GridAab) -> Self {
        self.bounds = Some(bounds);
        self.fast_forward(bounds);
        self
    }

    /// The ray being traversed.
    #[inline]
    pub fn ray(&self) -> Ray {
        self.ray
    }

    /// Positions the state at `ray.at(t_start)`, as if no step had been taken yet.
    ///
    /// Returns false if the position is not representable.
    fn restart_at(&mut self, t_start: FreeCoordinate) -> bool {
        let origin = self.ray.at(t_start);
        let Some(cube) = cube_containing(origin) else {
            return false;
        };
        self.cube = cube;
        self.t_max = origin
            .to_vector()
            .zip(self.ray.direction, scale_to_integer_step)
            .cast_unit()
            .map(|t| t + t_start);
        self.last_t_distance = t_start;
        true
    }

    /// If the ray starts outside the bounds, skip to shortly before it enters them.
    fn fast_forward(&mut self, bounds: GridAab) {
        if self.phase == Phase::Ended || bounds.contains_cube(self.cube) {
            return;
        }
        let Some(hit) = bounds.to_free().intersect_ray(&self.ray, 0.0) else {
            self.phase = Phase::Ended;
            return;
        };
        if !hit.entering {
            return;
        }
        // Half a cube behind the entry point, so the entry face is reported by a real step.
        let t_start = hit.t - 0.5 / self.ray.direction.length();
        if t_start > self.last_t_distance && !self.restart_at(t_start) {
            self.phase = Phase::Ended;
        }
    }

    fn current(&self) -> RaycastStep {
        RaycastStep {
            cube: self.cube,
            face: self.last_face,
            t_distance: self.last_t_distance,
        }
    }

    /// Returns whether [`Self::step()`] will be able to make forward progress.
    fn valid_for_stepping(&self) -> bool {
        self.step != Vector3D::zero()
            && !self.t_max.to_array().iter().any(|t| t.is_nan())
            && self.t_max.to_array().iter().any(|t| t.is_finite())
    }

    /// Move into the next cube along the ray. Returns [`None`] on coordinate overflow.
    fn step(&mut self) -> Option<()> {
        let axis: Axis = if self.t_max.x < self.t_max.y {
            if self.t_max.x < self.t_max.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if self.t_max.y < self.t_max.z {
            Axis::Y
        } else {
            Axis::Z
        };

        self.last_t_distance = self.t_max[axis];
        self.cube[axis] = self.cube[axis].checked_add(self.step[axis])?;
        self.t_max[axis] += self.t_delta[axis];
        // The face crossed belongs to the new cube and faces back toward the old one.
        self.last_face = Some(Face6::from_axis(axis, self.step[axis] < 0));
        Some(())
    }

    /// Returns whether the current cube is outside the bounds in a way that stepping
    /// could fix, and whether it is outside in a way stepping can never fix.
    fn out_of_bounds(&self, bounds: GridAab) -> (bool, bool) {
        let mut oob_enter = false;
        let mut oob_exit = false;
        for axis in Axis::ALL {
            let range = bounds.axis_range(axis);
            let low = self.cube[axis] < range.start;
            let high = self.cube[axis] >= range.end;
            match self.step[axis] {
                0 => oob_exit |= low | high,
                s if s > 0 => {
                    oob_enter |= low;
                    oob_exit |= high;
                }
                _ => {
                    oob_enter |= high;
                    oob_exit |= low;
                }
            }
        }
        (oob_enter, oob_exit)
    }
}

impl Iterator for Raycaster {
    type Item = RaycastStep;

    #[inline]
    fn next(&mut self) -> Option<RaycastStep> {
        loop {
            if self.phase == Phase::Ended {
                return None;
            }
            let (oob_enter, oob_exit) = match self.bounds {
                Some(bounds) => self.out_of_bounds(bounds),
                None => (false, false),
            };
            if oob_exit {
                self.phase = Phase::Ended;
                return None;
            }
            if oob_enter {
                if self.phase == Phase::InBounds || !self.valid_for_stepping() {
                    self.phase = Phase::Ended;
                    return None;
                }
                if self.step().is_none() {
                    self.phase = Phase::Ended;
                    return None;
                }
                continue;
            }

            let item = self.current();
            if self.valid_for_stepping() && self.step().is_some() {
                self.phase = Phase::InBounds;
            } else {
                // Can't make progress, so stop rather than looping forever.
                self.phase = Phase::Ended;
            }
            return Some(item);
        }
    }
}

impl core::iter::FusedIterator for Raycaster {}

// -------------------------------------------------------------------------------------------------

/// Describes a ray crossing into a cube as defined by [`Raycaster`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::module_name_repetitions)]
pub struct RaycastStep {
    cube: GridPoint,
    face: Option<Face6>,
    t_distance: FreeCoordinate,
}

impl RaycastStep {
    /// Returns the cube which the raycaster has just found the ray to intersect.
    #[inline]
    pub fn cube_ahead(&self) -> GridPoint {
        self.cube
    }

    /// Returns the face of [`Self::cube_ahead()`] which is being crossed, whose normal
    /// points back toward the previous cube. [`None`] for the cube containing the origin.
    ///
    /// ```
    /// use blocktrace_base::math::Face6;
    /// use blocktrace_base::raycast::Raycaster;
    ///
    /// let mut r = Raycaster::new((0.5, 0.5, 0.5), (1.0, 0.0, 0.0));
    /// let mut next = || r.next().unwrap();
    ///
    /// assert_eq!(next().face(), None);            // started at (0, 0, 0)
    /// assert_eq!(next().face(), Some(Face6::NX)); // moved to (1, 0, 0)
    /// ```
    #[inline]
    pub fn face(&self) -> Option<Face6> {
        self.face
    }

    /// The distance traversed so far, as measured in multiples of the ray's direction vector.
    #[inline]
    pub fn t_distance(&self) -> FreeCoordinate {
        self.t_distance
    }
}

// -------------------------------------------------------------------------------------------------

/// 3-valued signum (zero produces zero) with an integer result.
fn signum_101(x: FreeCoordinate) -> GridCoordinate {
    if x == 0.0 {
        0
    } else if x > 0.0 {
        1
    } else {
        -1
    }
}

/// Find the smallest positive `t` such that `s + t * ds` is an integer.
///
/// If `ds` is zero, returns positive infinity, so that the axis is never chosen.
fn scale_to_integer_step(mut s: FreeCoordinate, mut ds: FreeCoordinate) -> FreeCoordinate {
    if ds == 0.0 && !s.is_nan() {
        return FreeCoordinate::INFINITY;
    } else if ds < 0.0 {
        s = -s;
        ds = -ds;
    }
    let s = s.rem_euclid(1.0);
    (1.0 - s) / ds
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use euclid::point3;
    use pretty_assertions::assert_eq;

    fn cubes(r: Raycaster) -> Vec<(GridPoint, Option<Face6>)> {
        r.map(|step| (step.cube_ahead(), step.face())).collect()
    }

    #[test]
    fn simple_within() {
        let bounds = GridAab::from_lower_size([0, 0, 0], [3, 1, 1]);
        assert_eq!(
            cubes(Raycaster::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]).within(bounds)),
            vec![
                (point3(0, 0, 0), None),
                (point3(1, 0, 0), Some(Face6::NX)),
                (point3(2, 0, 0), Some(Face6::NX)),
            ]
        );
    }

    #[test]
    fn enters_from_outside() {
        let bounds = GridAab::from_lower_size([0, 0, 0], [2, 2, 2]);
        let steps: Vec<RaycastStep> = Raycaster::new([0.5, 0.5, -10.5], [0.0, 0.0, 2.0])
            .within(bounds)
            .collect();
        assert_eq!(
            steps
                .iter()
                .map(|s| (s.cube_ahead(), s.face()))
                .collect::<Vec<_>>(),
            vec![
                (point3(0, 0, 0), Some(Face6::NZ)),
                (point3(0, 0, 1), Some(Face6::NZ)),
            ]
        );
        assert_eq!(steps[0].t_distance(), 5.25);
    }

    #[test]
    fn negative_direction_faces() {
        let bounds = GridAab::from_lower_size([-2, 0, 0], [3, 1, 1]);
        assert_eq!(
            cubes(Raycaster::new([0.5, 0.5, 0.5], [-1.0, 0.0, 0.0]).within(bounds)),
            vec![
                (point3(0, 0, 0), None),
                (point3(-1, 0, 0), Some(Face6::PX)),
                (point3(-2, 0, 0), Some(Face6::PX)),
            ]
        );
    }

    #[test]
    fn misses_bounds() {
        let bounds = GridAab::from_lower_size([0, 0, 0], [2, 2, 2]);
        assert_eq!(
            cubes(Raycaster::new([5.5, 0.5, 0.5], [0.0, 1.0, 0.0]).within(bounds)),
            vec![]
        );
        assert_eq!(
            cubes(Raycaster::new([5.5, 0.5, 0.5], [1.0, 0.0, 0.0]).within(bounds)),
            vec![]
        );
    }

    #[test]
    fn zero_direction_yields_origin_only() {
        assert_eq!(
            cubes(Raycaster::new([1.5, 2.5, 3.5], [0.0, 0.0, 0.0])),
            vec![(point3(1, 2, 3), None)]
        );
    }

    #[test]
    fn nan_origin_yields_nothing() {
        assert_eq!(
            cubes(Raycaster::new([f64::NAN, 0.0, 0.0], [1.0, 0.0, 0.0])),
            vec![]
        );
    }

    #[rstest::rstest]
    #[case(0.25, 1.0, 0.75)]
    #[case(0.25, -0.5, 0.5)]
    #[case(-0.25, 1.0, 0.25)]
    #[case(0.0, 0.0, f64::INFINITY)]
    fn integer_step(#[case] s: f64, #[case] ds: f64, #[case] expected: f64) {
        assert_eq!(scale_to_integer_step(s, ds), expected);
    }
}
