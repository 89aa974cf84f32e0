//! Finding the nearest surface along a ray.
//!
//! Every geometry test takes the best [`IntersectionRecord`] so far by value and returns
//! [`Some`] only if it found something strictly nearer; callers keep their old record
//! otherwise. Chaining tests this way makes the nearest hit win regardless of the order
//! in which candidates are tested.

use std::ops::ControlFlow;

use crate::SURFACE_OFFSET;
use crate::block::BlockId;
use crate::material::{Material, MaterialId, MaterialSample};
use crate::math::{FreeCoordinate, FreeVector, GridPoint, TexPoint, cube_containing};
use crate::medium::Medium;
use crate::raycast::Ray;
use crate::scene::Scene;
use crate::voxels::VoxelIndex;

/// A surface found by an intersection test.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Hit {
    /// Distance along the ray, in multiples of its direction vector.
    pub distance: FreeCoordinate,
    #[allow(missing_docs)]
    pub tex_coord: TexPoint,
    /// Unit surface normal. Which way it faces depends on the kind of geometry.
    pub normal: FreeVector,
    #[allow(missing_docs)]
    pub material: MaterialId,
    /// Block the surface belongs to, or [`BlockId::Empty`] for non-block geometry.
    pub block: BlockId,
    /// The material sampled at `tex_coord`.
    pub sample: MaterialSample,
}

/// The nearest [`Hit`] found so far, if any, and the distance beyond which nothing counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionRecord {
    limit: FreeCoordinate,
    hit: Option<Hit>,
}

impl IntersectionRecord {
    /// A record with no hit which accepts hits nearer than `limit`.
    pub fn new(limit: FreeCoordinate) -> Self {
        Self { limit, hit: None }
    }

    /// Distance a candidate must beat to be accepted.
    pub fn distance(&self) -> FreeCoordinate {
        self.hit.map_or(self.limit, |hit| hit.distance)
    }

    #[allow(missing_docs)]
    pub fn hit(&self) -> Option<&Hit> {
        self.hit.as_ref()
    }

    #[allow(missing_docs)]
    pub fn into_hit(self) -> Option<Hit> {
        self.hit
    }

    /// Returns a record holding `candidate` if it is strictly nearer than this one's
    /// distance, or [`None`] if this record should be kept.
    #[must_use]
    pub fn accept(self, candidate: Hit) -> Option<Self> {
        (candidate.distance < self.distance()).then_some(Self {
            limit: self.limit,
            hit: Some(candidate),
        })
    }

    /// Sets the block of the held hit.
    #[must_use]
    pub(crate) fn with_block(mut self, block: BlockId) -> Self {
        if let Some(hit) = &mut self.hit {
            hit.block = block;
        }
        self
    }
}

/// A [`Hit`] together with the [`Material`] its material id names.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct SurfaceHit {
    #[allow(missing_docs)]
    pub hit: Hit,
    #[allow(missing_docs)]
    pub material: Material,
}

// -------------------------------------------------------------------------------------------------

impl Scene {
    /// Finds the nearest surface along `ray` across all of the scene's geometry: the block
    /// index, then the liquid index, then world triangles, then actor triangles.
    ///
    /// `ray`'s direction must be normalized. `medium` is what the ray is currently inside;
    /// surfaces through which the ray would leave that medium are reported with
    /// [`MaterialId::AIR`] and [`BlockId::Empty`] so that the caller sees the boundary as
    /// one into vacuum, and faces between two cubes of that medium are skipped.
    pub fn closest_intersect(&self, ray: &Ray, medium: Medium) -> Option<SurfaceHit> {
        let mut traveled: FreeCoordinate = 0.0;
        let limit = FreeCoordinate::INFINITY;

        // Each iteration would be one segment of a ray passing through several media;
        // only the first is ever used.
        #[allow(clippy::never_loop)]
        for _ in 0..self.draw_depth {
            let remaining = limit - traveled;
            if remaining <= 0.0 {
                return None;
            }
            let segment = ray.advance(traveled);
            let mut record = IntersectionRecord::new(remaining);

            for index in [&*self.block_index, &*self.liquid_index] {
                if let Some(r) = self.intersect_voxels(index, &segment, record, medium) {
                    record = r;
                }
            }
            for triangles in [&*self.world, &*self.actors] {
                if let Some(r) = triangles.intersect(&segment, record, &self.materials) {
                    record = r;
                }
            }

            let mut hit = record.into_hit()?;
            traveled += hit.distance;
            hit.distance = traveled;
            return Some(SurfaceHit {
                material: self.materials.get(hit.material),
                hit,
            });
        }
        None
    }

    /// Walks `index` front to back, intersecting each block met, until the record's
    /// distance is nearer than the next cube.
    fn intersect_voxels(
        &self,
        index: &dyn VoxelIndex,
        ray: &Ray,
        record: IntersectionRecord,
        medium: Medium,
    ) -> Option<IntersectionRecord> {
        let mut best: Option<IntersectionRecord> = None;
        index.traverse(ray, record.distance(), &mut |cube, block, t_enter| {
            let current = best.unwrap_or(record);
            if t_enter >= current.distance() {
                return ControlFlow::Break(());
            }
            if let Some(hit) = self.intersect_block(index, cube, block, ray, current, medium) {
                best = current.accept(hit).or(best);
            }
            ControlFlow::Continue(())
        });
        best
    }

    /// Intersects one block, looking past faces it shares with a neighboring cube of the
    /// same block.
    fn intersect_block(
        &self,
        index: &dyn VoxelIndex,
        cube: GridPoint,
        block: BlockId,
        ray: &Ray,
        record: IntersectionRecord,
        medium: Medium,
    ) -> Option<Hit> {
        let mut start: FreeCoordinate = 0.0;
        for _ in 0..MAX_INTERIOR_FACES {
            let probe = ray.advance(start);
            let local_record = IntersectionRecord::new(record.distance() - start);
            let mut hit = self
                .blocks
                .intersect(block, cube, &probe, local_record, &self.materials)?
                .into_hit()?;
            hit.distance += start;
            match medium_boundary(index, cube, ray, hit, medium) {
                Boundary::Interior => start = hit.distance + SURFACE_OFFSET,
                Boundary::Surface(hit) => return Some(hit),
            }
        }
        None
    }
}

/// How many shared faces [`Scene::intersect_block()`] looks past within one cube.
const MAX_INTERIOR_FACES: usize = 4;

enum Boundary {
    /// A face between two cubes of the same block; not a surface at all.
    Interior,
    Surface(Hit),
}

/// Classifies a hit on a block found in `index` at `cube` relative to the medium the ray
/// is in.
fn medium_boundary(
    index: &dyn VoxelIndex,
    cube: GridPoint,
    ray: &Ray,
    hit: Hit,
    medium: Medium,
) -> Boundary {
    let block_at = |t: FreeCoordinate| -> Option<(GridPoint, BlockId)> {
        let c = cube_containing(ray.at(t))?;
        Some((c, index.get(c)))
    };
    let before = block_at(hit.distance - SURFACE_OFFSET);
    let after = block_at(hit.distance + SURFACE_OFFSET);
    if let (Some((before_cube, before_block)), Some((after_cube, after_block))) = (before, after)
        && before_cube != after_cube
        && before_block == hit.block
        && after_block == hit.block
    {
        return Boundary::Interior;
    }

    if medium.block == hit.block && hit.block.is_defined() {
        let leaving_own_cube = after.is_none_or(|(c, _)| c == cube);
        let leaving_block = after.is_none_or(|(_, b)| b != hit.block);
        if leaving_own_cube || leaving_block {
            return Boundary::Surface(Hit {
                material: MaterialId::AIR,
                block: BlockId::Empty,
                sample: MaterialSample::TRANSPARENT,
                ..hit
            });
        }
    }
    Boundary::Surface(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockPalette, Shape};
    use crate::material::{MaterialEntry, MaterialPalette};
    use crate::math::{GridAab, Rgb};
    use crate::voxels::BlockGrid;
    use euclid::{point2, point3, vec3};
    use pretty_assertions::assert_eq;

    fn hit(distance: f64) -> Hit {
        Hit {
            distance,
            tex_coord: point2(0.0, 0.0),
            normal: vec3(0.0, 0.0, -1.0),
            material: MaterialId(1),
            block: BlockId::Empty,
            sample: MaterialSample::TRANSPARENT,
        }
    }

    #[test]
    fn record_accepts_only_strictly_nearer() {
        let record = IntersectionRecord::new(10.0);
        assert_eq!(record.distance(), 10.0);
        assert_eq!(record.accept(hit(10.0)), None);
        let record = record.accept(hit(4.0)).unwrap();
        assert_eq!(record.distance(), 4.0);
        assert_eq!(record.accept(hit(4.0)), None);
        assert_eq!(record.accept(hit(3.0)).unwrap().distance(), 3.0);
    }

    fn two_cube_scene(clear: bool) -> (Scene, BlockId) {
        let mut materials = MaterialPalette::new();
        let glass = if clear {
            materials.add(MaterialEntry {
                material: Material::new(1.5, true, false),
                ..MaterialEntry::opaque(Rgb::ONE)
            })
        } else {
            materials.add(MaterialEntry::opaque(Rgb::ONE))
        };
        let mut blocks = BlockPalette::new();
        let id = blocks.push(Shape::FullCube { material: glass });
        let mut grid = BlockGrid::new(GridAab::from_lower_size([0, 0, 0], [2, 1, 1]));
        grid.fill(grid.bounds(), id);
        (Scene::new(blocks, materials).with_block_index(grid), id)
    }

    #[test]
    fn nearest_block_face() {
        let (scene, id) = two_cube_scene(false);
        let found = scene
            .closest_intersect(&Ray::new([-1.5, 0.5, 0.5], [1.0, 0.0, 0.0]), Medium::VACUUM)
            .unwrap();
        assert_eq!(found.hit.distance, 1.5);
        assert_eq!(found.hit.block, id);
        assert_eq!(found.hit.normal, vec3(-1.0, 0.0, 0.0));
    }

    #[test]
    fn miss() {
        let (scene, _) = two_cube_scene(false);
        assert_eq!(
            scene.closest_intersect(&Ray::new([-1.5, 0.5, 0.5], [-1.0, 0.0, 0.0]), Medium::VACUUM),
            None
        );
    }

    #[test]
    fn leaving_a_medium_skips_interior_faces() {
        let (scene, id) = two_cube_scene(true);
        let medium = Medium {
            material: scene.blocks().primary_material(id),
            block: id,
        };
        let found = scene
            .closest_intersect(&Ray::new([0.25, 0.5, 0.5], [1.0, 0.0, 0.0]), medium)
            .unwrap();
        // the far side of the second cube, relabeled as the boundary into air
        assert_eq!(found.hit.distance, 1.75);
        assert_eq!(found.hit.block, BlockId::Empty);
        assert_eq!(found.hit.material, MaterialId::AIR);
        assert_eq!(found.material, Material::AIR);
        assert_eq!(point3(2.0, 0.5, 0.5), Ray::new([0.25, 0.5, 0.5], [1.0, 0.0, 0.0]).at(1.75));
    }
}
