use crate::EPSILON_F64;
use crate::block::BlockId;
use crate::intersect::{Hit, IntersectionRecord};
use crate::material::{MaterialId, MaterialPalette, SampleMode};
use crate::math::Aab;
use crate::raycast::Ray;
use crate::triangle::Triangle;

/// The shape and material of a liquid block.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct WaterModel {
    #[allow(missing_docs)]
    pub material: MaterialId,
    #[allow(missing_docs)]
    pub shape: WaterShape,
}

/// Surface of a [`WaterModel`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[expect(clippy::exhaustive_enums)]
pub enum WaterShape {
    /// Fills the whole block.
    Flat,
    /// Level of the surface at the corners `(0, 1)`, `(1, 1)`, `(1, 0)`, `(0, 0)` in
    /// `(x, z)`; see [`corner_height()`].
    Corners([u8; 4]),
}

/// Bit of the packed data word meaning [`WaterShape::Flat`].
const FLAT_BIT: u32 = 1 << 16;

/// Height of the water surface, in block-local units, for a corner level.
///
/// Only the low 3 bits of `level` are used; level 0 is the highest.
pub fn corner_height(level: u8) -> f64 {
    f64::from(14 * 4 - 7 * (level & 7)) / 64.0
}

impl WaterModel {
    /// Decodes the packed data word: bit 16 is the flat flag, otherwise bits 0–15 are the four
    /// corner levels, 4 bits each.
    pub fn from_packed(material: MaterialId, data: u32) -> Self {
        let shape = if data & FLAT_BIT != 0 {
            WaterShape::Flat
        } else {
            WaterShape::Corners([0, 4, 8, 12].map(|shift| ((data >> shift) & 0xF) as u8))
        };
        Self { material, shape }
    }

    /// The twelve triangles of a non-flat water block: the bottom, the four walls, and the
    /// sloped top.
    fn triangles(&self, levels: [u8; 4]) -> [Triangle; 12] {
        let [c0, c1, c2, c3] = levels.map(corner_height);
        let m = self.material;
        let tri = |p: [[f64; 3]; 3], t: [[f64; 2]; 3]| Triangle::new(p, t, m);
        [
            // bottom
            tri([[0., 0., 0.], [1., 0., 0.], [0., 0., 1.]], [[0., 0.], [1., 0.], [0., 1.]]),
            tri([[0., 0., 1.], [1., 0., 0.], [1., 0., 1.]], [[0., 1.], [1., 0.], [1., 1.]]),
            // top
            tri([[0., c0, 1.], [1., c1, 1.], [1., c2, 0.]], [[0., 0.], [1., 0.], [1., 1.]]),
            tri([[0., c3, 0.], [0., c0, 1.], [1., c2, 0.]], [[0., 1.], [0., 0.], [1., 1.]]),
            // -X
            tri([[0., c3, 0.], [0., 0., 0.], [0., c0, 1.]], [[0., 1.], [0., 0.], [1., 1.]]),
            tri([[0., 0., 1.], [0., c0, 1.], [0., 0., 0.]], [[1., 0.], [1., 1.], [0., 0.]]),
            // +X
            tri([[1., c2, 0.], [1., c1, 1.], [1., 0., 0.]], [[0., 1.], [1., 1.], [0., 0.]]),
            tri([[1., c1, 1.], [1., 0., 1.], [1., 0., 0.]], [[1., 1.], [1., 0.], [0., 0.]]),
            // -Z
            tri([[0., c3, 0.], [1., c2, 0.], [0., 0., 0.]], [[0., 1.], [1., 1.], [0., 0.]]),
            tri([[1., 0., 0.], [0., 0., 0.], [1., c2, 0.]], [[1., 0.], [0., 0.], [1., 1.]]),
            // +Z
            tri([[0., c0, 1.], [0., 0., 1.], [1., c1, 1.]], [[0., 1.], [0., 0.], [1., 1.]]),
            tri([[1., 0., 1.], [1., c1, 1.], [0., 0., 1.]], [[1., 0.], [1., 1.], [0., 0.]]),
        ]
    }

    pub(crate) fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        match self.shape {
            WaterShape::Flat => {
                let hit = Aab::UNIT.intersect_ray(ray, EPSILON_F64)?;
                if hit.t >= record.distance() {
                    return None;
                }
                // Plane coordinates as-is; water faces are not mirrored like cube faces.
                let tex_coord = hit.uv;
                let sample = materials.sample(self.material, tex_coord, SampleMode::Cutout)?;
                record.accept(Hit {
                    distance: hit.t,
                    tex_coord,
                    normal: hit.normal(),
                    material: self.material,
                    block: BlockId::Empty,
                    sample,
                })
            }
            WaterShape::Corners(levels) => {
                self.triangles(levels)
                    .iter()
                    .fold(None, |best: Option<IntersectionRecord>, triangle| {
                        let current = best.unwrap_or(record);
                        let Some(hit) = triangle.intersect(ray, current.distance()) else {
                            return best;
                        };
                        let Some(sample) =
                            materials.sample(self.material, hit.tex_coord, SampleMode::Cutout)
                        else {
                            return best;
                        };
                        current
                            .accept(Hit {
                                distance: hit.t,
                                tex_coord: hit.tex_coord,
                                normal: hit.normal,
                                material: self.material,
                                block: BlockId::Empty,
                                sample,
                            })
                            .or(best)
                    })
            }
        }
    }
}
