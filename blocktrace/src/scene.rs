//! [`Scene`], everything a render reads but never modifies.

use std::fmt;

use crate::block::{BlockId, BlockPalette};
use crate::emitter_grid::EmitterGrid;
use crate::environment::{Sky, SkySample, Sun};
use crate::material::MaterialPalette;
use crate::math::{FreePoint, FreeVector, GridAab, cube_containing};
use crate::medium::{Medium, MediumHistory};
use crate::triangles::{TriangleIndex, TriangleList};
use crate::voxels::{BlockGrid, VoxelIndex};

/// Default for [`Scene::with_draw_depth()`].
pub const DEFAULT_DRAW_DEPTH: usize = 256;

/// Geometry, materials, and lighting of a world.
///
/// A scene is shared, read-only, by every path traced in a render pass.
pub struct Scene {
    pub(crate) blocks: BlockPalette,
    pub(crate) materials: MaterialPalette,
    pub(crate) block_index: Box<dyn VoxelIndex>,
    pub(crate) liquid_index: Box<dyn VoxelIndex>,
    pub(crate) world: Box<dyn TriangleIndex>,
    pub(crate) actors: Box<dyn TriangleIndex>,
    pub(crate) emitters: EmitterGrid,
    pub(crate) sky: Sky,
    pub(crate) sun: Sun,
    pub(crate) draw_depth: usize,
}

impl Scene {
    /// Constructs a scene with the given block and material definitions and nothing placed
    /// in it, lit by the default [`Sky`] and [`Sun`].
    pub fn new(blocks: BlockPalette, materials: MaterialPalette) -> Self {
        Self {
            blocks,
            materials,
            block_index: Box::new(BlockGrid::new(GridAab::ORIGIN_EMPTY)),
            liquid_index: Box::new(BlockGrid::new(GridAab::ORIGIN_EMPTY)),
            world: Box::new(TriangleList::new()),
            actors: Box::new(TriangleList::new()),
            emitters: EmitterGrid::empty(),
            sky: Sky::default(),
            sun: Sun::default(),
            draw_depth: DEFAULT_DRAW_DEPTH,
        }
    }

    /// Replaces the index of solid blocks.
    #[must_use]
    pub fn with_block_index(mut self, index: impl VoxelIndex + 'static) -> Self {
        self.block_index = Box::new(index);
        self
    }

    /// Replaces the index of liquid blocks.
    #[must_use]
    pub fn with_liquid_index(mut self, index: impl VoxelIndex + 'static) -> Self {
        self.liquid_index = Box::new(index);
        self
    }

    /// Replaces the static non-block geometry.
    #[must_use]
    pub fn with_world_triangles(mut self, triangles: impl TriangleIndex + 'static) -> Self {
        self.world = Box::new(triangles);
        self
    }

    /// Replaces the moving non-block geometry.
    #[must_use]
    pub fn with_actor_triangles(mut self, triangles: impl TriangleIndex + 'static) -> Self {
        self.actors = Box::new(triangles);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_emitters(mut self, emitters: EmitterGrid) -> Self {
        self.emitters = emitters;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_sky(mut self, sky: Sky) -> Self {
        self.sky = sky;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_sun(mut self, sun: Sun) -> Self {
        self.sun = sun;
        self
    }

    /// Sets the bound on the number of segments
    /// [`closest_intersect()`](Self::closest_intersect) may examine. Zero makes every
    /// query miss.
    #[must_use]
    pub fn with_draw_depth(mut self, draw_depth: usize) -> Self {
        self.draw_depth = draw_depth;
        self
    }

    #[allow(missing_docs)]
    pub fn blocks(&self) -> &BlockPalette {
        &self.blocks
    }

    #[allow(missing_docs)]
    pub fn materials(&self) -> &MaterialPalette {
        &self.materials
    }

    #[allow(missing_docs)]
    pub fn emitters(&self) -> &EmitterGrid {
        &self.emitters
    }

    #[allow(missing_docs)]
    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    #[allow(missing_docs)]
    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    /// Returns the solid block at the cube containing `point`.
    pub fn block_at(&self, point: FreePoint) -> BlockId {
        cube_containing(point).map_or(BlockId::Empty, |cube| self.block_index.get(cube))
    }

    /// Determines what a ray starting at `origin` is inside.
    ///
    /// A point inside a solid block is inside that block's medium if its primary material
    /// is clear and refractive; a point with no solid block is inside whatever non-opaque
    /// liquid is there; anything else is vacuum.
    pub fn initialize_medium(&self, origin: FreePoint) -> MediumHistory {
        let Some(cube) = cube_containing(origin) else {
            return MediumHistory::VACUUM;
        };
        let block = self.block_index.get(cube);
        let enters = if block == BlockId::Empty {
            let liquid = self.liquid_index.get(cube);
            let material = self.blocks.primary_material(liquid);
            (liquid.is_defined() && !self.materials.get(material).is_opaque()).then_some(Medium {
                material,
                block: liquid,
            })
        } else {
            let material = self.blocks.primary_material(block);
            let m = self.materials.get(material);
            (m.is_refractive() && !m.is_opaque()).then_some(Medium { material, block })
        };
        enters.map_or(MediumHistory::VACUUM, MediumHistory::starting_in)
    }

    /// What a ray escaping the scene in `direction` sees.
    ///
    /// Inside the sun's disk the color is the sun's and the sun's intensity is added to
    /// the sky's.
    pub fn sky_sample(&self, direction: FreeVector) -> SkySample {
        let sky = self.sky.sample(direction);
        match self.sun.intersect(direction) {
            Some(sun) => SkySample {
                color: sun.color,
                emittance: sky.emittance + sun.emittance,
            },
            None => sky,
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("blocks", &self.blocks.len())
            .field("materials", &self.materials.len())
            .field("block_index", &self.block_index)
            .field("liquid_index", &self.liquid_index)
            .field("world", &self.world)
            .field("actors", &self.actors)
            .field("emitters", &self.emitters.emitters().len())
            .field("sky", &self.sky)
            .field("sun", &self.sun)
            .finish_non_exhaustive()
    }
}
