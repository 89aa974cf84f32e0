//! Spatial indexes of blocks placed on the cube grid.

use std::fmt;
use std::ops::ControlFlow;

use crate::block::BlockId;
use crate::math::{FreeCoordinate, GridAab, GridPoint};
use crate::raycast::{Ray, Raycaster};

/// A mapping from cubes to [`BlockId`]s which can be walked along a ray.
///
/// Everything outside the index is [`BlockId::Empty`].
pub trait VoxelIndex: fmt::Debug + Send + Sync {
    /// Returns the block at `cube`.
    fn get(&self, cube: GridPoint) -> BlockId;

    /// Calls `visitor` with `(cube, block, t_enter)` for every non-empty cube the ray passes
    /// through, in order of increasing `t_enter`, until the visitor breaks or `t_enter`
    /// exceeds `max_distance`.
    ///
    /// `t_enter` is the distance along the ray at which it enters the cube, or zero for the
    /// cube containing the origin.
    fn traverse(
        &self,
        ray: &Ray,
        max_distance: FreeCoordinate,
        visitor: &mut dyn FnMut(GridPoint, BlockId, FreeCoordinate) -> ControlFlow<()>,
    );
}

/// A dense box of [`BlockId`]s.
#[derive(Clone, PartialEq)]
pub struct BlockGrid {
    bounds: GridAab,
    /// Ordered as by [`GridAab::index()`].
    blocks: Box<[BlockId]>,
}

impl BlockGrid {
    /// Constructs a grid filled with [`BlockId::Empty`].
    pub fn new(bounds: GridAab) -> Self {
        Self {
            bounds,
            blocks: vec![BlockId::Empty; bounds.volume()].into_boxed_slice(),
        }
    }

    /// Constructs a grid by calling `f` for every cube.
    pub fn from_fn(bounds: GridAab, f: impl FnMut(GridPoint) -> BlockId) -> Self {
        Self {
            bounds,
            blocks: bounds.interior_iter().map(f).collect(),
        }
    }

    /// Constructs a grid from ids already ordered as by [`GridAab::index()`].
    ///
    /// Returns [`None`] if the number of ids does not match the volume.
    pub fn from_elements(bounds: GridAab, blocks: impl Into<Box<[BlockId]>>) -> Option<Self> {
        let blocks = blocks.into();
        (blocks.len() == bounds.volume()).then_some(Self { bounds, blocks })
    }

    /// The region this grid covers.
    pub fn bounds(&self) -> GridAab {
        self.bounds
    }

    /// Replaces the block at `cube`. Returns false if `cube` is outside the grid.
    pub fn set(&mut self, cube: GridPoint, block: BlockId) -> bool {
        match self.bounds.index(cube) {
            Some(index) => {
                self.blocks[index] = block;
                true
            }
            None => false,
        }
    }

    /// Replaces every block within `region`, clipped to the grid.
    pub fn fill(&mut self, region: GridAab, block: BlockId) {
        for cube in region.interior_iter() {
            self.set(cube, block);
        }
    }

    /// Iterates over all non-empty cubes.
    pub fn iter_defined(&self) -> impl Iterator<Item = (GridPoint, BlockId)> + '_ {
        self.bounds
            .interior_iter()
            .zip(self.blocks.iter().copied())
            .filter(|(_, block)| *block != BlockId::Empty)
    }
}

impl VoxelIndex for BlockGrid {
    fn get(&self, cube: GridPoint) -> BlockId {
        self.bounds
            .index(cube)
            .map_or(BlockId::Empty, |index| self.blocks[index])
    }

    fn traverse(
        &self,
        ray: &Ray,
        max_distance: FreeCoordinate,
        visitor: &mut dyn FnMut(GridPoint, BlockId, FreeCoordinate) -> ControlFlow<()>,
    ) {
        for step in Raycaster::new(ray.origin, ray.direction).within(self.bounds) {
            let t_enter = step.t_distance().max(0.0);
            if t_enter > max_distance {
                break;
            }
            let cube = step.cube_ahead();
            let block = self.get(cube);
            if block == BlockId::Empty {
                continue;
            }
            if visitor(cube, block, t_enter).is_break() {
                break;
            }
        }
    }
}

impl fmt::Debug for BlockGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGrid")
            .field("bounds", &self.bounds)
            .field("defined", &self.iter_defined().count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point3;
    use pretty_assertions::assert_eq;
    use std::num::NonZeroU32;

    fn id(n: u32) -> BlockId {
        BlockId::Defined(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn get_and_set() {
        let mut grid = BlockGrid::new(GridAab::from_lower_size([-1, 0, 0], [3, 1, 1]));
        assert!(grid.set(point3(-1, 0, 0), id(2)));
        assert!(!grid.set(point3(2, 0, 0), id(2)));
        assert_eq!(grid.get(point3(-1, 0, 0)), id(2));
        assert_eq!(grid.get(point3(0, 0, 0)), BlockId::Empty);
        assert_eq!(grid.get(point3(100, 0, 0)), BlockId::Empty);
    }

    #[test]
    fn traverse_in_order_skipping_empty() {
        let mut grid = BlockGrid::new(GridAab::from_lower_size([0, 0, 0], [5, 1, 1]));
        grid.set(point3(1, 0, 0), id(1));
        grid.set(point3(3, 0, 0), id(3));
        let mut visited = Vec::new();
        grid.traverse(
            &Ray::new([-0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
            f64::INFINITY,
            &mut |cube, block, t| {
                visited.push((cube, block, t));
                ControlFlow::Continue(())
            },
        );
        assert_eq!(
            visited,
            vec![(point3(1, 0, 0), id(1), 1.5), (point3(3, 0, 0), id(3), 3.5)]
        );
    }

    #[test]
    fn traverse_stops() {
        let grid = BlockGrid::from_fn(GridAab::from_lower_size([0, 0, 0], [5, 1, 1]), |_| id(1));
        let mut count = 0;
        grid.traverse(
            &Ray::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
            2.0,
            &mut |_, _, _| {
                count += 1;
                ControlFlow::Continue(())
            },
        );
        // cubes entered at t = 0, 0.5, 1.5
        assert_eq!(count, 3);

        count = 0;
        grid.traverse(
            &Ray::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
            f64::INFINITY,
            &mut |_, _, _| {
                count += 1;
                ControlFlow::Break(())
            },
        );
        assert_eq!(count, 1);
    }
}
