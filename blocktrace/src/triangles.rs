//! Geometry that is not made of blocks: arbitrary textured triangles.

use std::fmt;

use crate::EPSILON_F64;
use crate::block::BlockId;
use crate::intersect::{Hit, IntersectionRecord};
use crate::material::{MaterialPalette, SampleMode};
use crate::math::Aab;
use crate::raycast::Ray;

pub use crate::triangle::Triangle;

/// A collection of triangles which can be intersected with a ray.
pub trait TriangleIndex: fmt::Debug + Send + Sync {
    /// Returns [`None`] unless some triangle is hit nearer than `record`'s distance.
    ///
    /// Hits have [`BlockId::Empty`] as their block.
    fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord>;
}

/// Triangles tested one by one, each behind its own bounding box.
#[derive(Clone, Default, PartialEq)]
pub struct TriangleList {
    triangles: Vec<(Aab, Triangle)>,
}

impl TriangleList {
    /// Constructs an empty list, which is never hit.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push((triangle.bounds(), triangle));
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl FromIterator<Triangle> for TriangleList {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl Extend<Triangle> for TriangleList {
    fn extend<I: IntoIterator<Item = Triangle>>(&mut self, iter: I) {
        for triangle in iter {
            self.push(triangle);
        }
    }
}

impl TriangleIndex for TriangleList {
    fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        let mut best: Option<IntersectionRecord> = None;
        for (bounds, triangle) in &self.triangles {
            let current = best.unwrap_or(record);
            match bounds.intersect_ray(ray, -EPSILON_F64) {
                Some(hit) if !(hit.entering && hit.t >= current.distance()) => {}
                _ => continue,
            }
            let Some(hit) = triangle.intersect(ray, current.distance()) else {
                continue;
            };
            let Some(sample) = materials.sample(triangle.material, hit.tex_coord, SampleMode::Cutout)
            else {
                continue;
            };
            best = current
                .accept(Hit {
                    distance: hit.t,
                    tex_coord: hit.tex_coord,
                    normal: hit.normal,
                    material: triangle.material,
                    block: BlockId::Empty,
                    sample,
                })
                .or(best);
        }
        best
    }
}

impl fmt::Debug for TriangleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleList")
            .field("len", &self.triangles.len())
            .finish_non_exhaustive()
    }
}
