//! [`EmitterGrid`], a uniform grid locating light-emitting blocks near a point.

use std::ops::Range;

use crate::block::BlockId;
use crate::math::{GridAab, GridCoordinate, GridPoint, GridVector};

/// An occurrence of a light-emitting block in the world.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct Emitter {
    /// The cube the block occupies.
    pub position: GridPoint,
    #[allow(missing_docs)]
    pub block: BlockId,
}

/// Uniform grid over world space whose cells list the [`Emitter`]s near them.
///
/// Cell coordinates are cube coordinates divided by the cell size, truncating toward zero.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterGrid {
    /// Zero or negative means the grid has no data and every query is empty.
    cell_size: GridCoordinate,
    /// Extent of the stored cells, in cell coordinates.
    extent: GridAab,
    /// `(start, count)` into `indices` per cell, ordered as by [`GridAab::index()`].
    cells: Vec<(u32, u32)>,
    indices: Vec<u32>,
    emitters: Vec<Emitter>,
}

impl EmitterGrid {
    /// A grid with no data.
    pub fn empty() -> Self {
        Self {
            cell_size: 0,
            extent: GridAab::ORIGIN_EMPTY,
            cells: Vec::new(),
            indices: Vec::new(),
            emitters: Vec::new(),
        }
    }

    /// Builds a grid in which every emitter is listed in each cell within `reach` cells of
    /// its own (in every axis, so a cube of `(2·reach + 1)³` cells).
    ///
    /// The stored extent is the smallest one covering all those cells. Within each cell,
    /// emitters keep the order they are given in.
    pub fn build(cell_size: GridCoordinate, emitters: Vec<Emitter>, reach: u32) -> Self {
        if cell_size <= 0 || emitters.is_empty() {
            return Self {
                emitters,
                ..Self::empty()
            };
        }
        let reach = reach as GridCoordinate;
        let cell_of = |e: &Emitter| cell_coordinates(cell_size, e.position);

        let (lower, upper) = emitters.iter().map(cell_of).fold(
            (GridPoint::splat(GridCoordinate::MAX), GridPoint::splat(GridCoordinate::MIN)),
            |(lower, upper), cell| (lower.min(cell), upper.max(cell)),
        );
        let lower = lower - GridVector::splat(reach);
        let size = (upper - lower) + GridVector::splat(reach + 1);
        let extent = GridAab::from_lower_size(lower, size);

        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); extent.volume()];
        let neighborhood = GridAab::from_lower_size(
            GridPoint::splat(-reach),
            GridVector::splat(2 * reach + 1),
        );
        for (i, emitter) in emitters.iter().enumerate() {
            let home = cell_of(emitter);
            for offset in neighborhood.interior_iter() {
                if let Some(index) = extent.index(home + offset.to_vector()) {
                    buckets[index].push(i as u32);
                }
            }
        }

        let mut cells = Vec::with_capacity(buckets.len());
        let mut indices = Vec::new();
        for bucket in buckets {
            cells.push((indices.len() as u32, bucket.len() as u32));
            indices.extend(bucket);
        }

        log::debug!(
            "built emitter grid: {} emitters, {} cells, {} entries",
            emitters.len(),
            cells.len(),
            indices.len()
        );
        Self {
            cell_size,
            extent,
            cells,
            indices,
            emitters,
        }
    }

    /// Assembles a grid from already-validated tables.
    pub(crate) fn from_tables(
        cell_size: GridCoordinate,
        extent: GridAab,
        cells: Vec<(u32, u32)>,
        indices: Vec<u32>,
        emitters: Vec<Emitter>,
    ) -> Self {
        debug_assert!(cell_size <= 0 || cells.len() == extent.volume());
        Self {
            cell_size,
            extent,
            cells,
            indices,
            emitters,
        }
    }

    /// Whether this grid has any cells at all.
    pub fn has_data(&self) -> bool {
        self.cell_size > 0
    }

    /// Edge length of a cell, in cubes.
    pub fn cell_size(&self) -> GridCoordinate {
        self.cell_size
    }

    /// The cell containing `cube`, in cell coordinates.
    pub fn cell_of(&self, cube: GridPoint) -> GridPoint {
        cell_coordinates(self.cell_size.max(1), cube)
    }

    /// Returns the range of emitter indices, for use with [`Self::emitter()`], listed in the
    /// cell containing `cube`.
    ///
    /// The range is empty if the grid has no data or the cell is outside its extent.
    pub fn cell_range(&self, cube: GridPoint) -> Range<usize> {
        if !self.has_data() {
            return 0..0;
        }
        let Some(&(start, count)) = self
            .extent
            .index(self.cell_of(cube))
            .and_then(|index| self.cells.get(index))
        else {
            return 0..0;
        };
        let start = start as usize;
        start..start + count as usize
    }

    /// Returns the emitter at `index` within the flattened cell lists.
    pub fn emitter(&self, index: usize) -> Option<Emitter> {
        let &e = self.indices.get(index)?;
        self.emitters.get(e as usize).copied()
    }

    /// All emitters, in their original order.
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }
}

impl Default for EmitterGrid {
    fn default() -> Self {
        Self::empty()
    }
}

fn cell_coordinates(cell_size: GridCoordinate, cube: GridPoint) -> GridPoint {
    // `/` on integers truncates toward zero, which is the packed format's convention.
    cube.map(|c| c / cell_size)
}
