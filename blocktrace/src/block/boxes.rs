use crate::block::{BlockId, cube_face_tex_coord, plane_distance};
use crate::intersect::{Hit, IntersectionRecord};
use crate::material::{MaterialId, MaterialPalette, SampleMode};
use crate::math::{Aab, Axis, Face6, FaceMap, TexPoint};
use crate::raycast::Ray;

/// One face of a [`TexturedBox`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct BoxFace {
    #[allow(missing_docs)]
    pub material: MaterialId,
    /// Whether this face exists at all. Culled faces are neither hit nor sampled as lights.
    pub visible: bool,
}

impl BoxFace {
    /// A visible face of the given material.
    pub const fn new(material: MaterialId) -> Self {
        Self {
            material,
            visible: true,
        }
    }

    /// A face which is not drawn.
    pub const CULLED: Self = Self {
        material: MaterialId::AIR,
        visible: false,
    };
}

/// An axis-aligned box within a block, one element of a
/// [`Shape::BoxSet`](crate::block::Shape::BoxSet).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct TexturedBox {
    /// Block-local bounds.
    pub bounds: Aab,
    #[allow(missing_docs)]
    pub faces: FaceMap<BoxFace>,
}

impl TexturedBox {
    /// A box with all faces visible and of the same material.
    pub fn new(bounds: Aab, material: MaterialId) -> Self {
        Self {
            bounds,
            faces: FaceMap::splat(BoxFace::new(material)),
        }
    }

    /// The faces which are not culled, in [`Face6::BLOCK_ORDER`].
    pub fn visible_faces(&self) -> impl Iterator<Item = Face6> + '_ {
        self.faces
            .iter_block_order()
            .filter(|(_, face)| face.visible)
            .map(|(face, _)| face)
    }

    pub(crate) fn visible_face_count(&self) -> usize {
        self.visible_faces().count()
    }

    /// Tests every visible face as a separate rectangle; the nearest accepted one wins.
    pub(crate) fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        let lower = self.bounds.lower_bounds_p();
        let upper = self.bounds.upper_bounds_p();
        let mut best: Option<IntersectionRecord> = None;
        for face in self.visible_faces() {
            let current = best.unwrap_or(record);
            let axis = face.axis();
            let plane = if face.is_positive() {
                upper[axis]
            } else {
                lower[axis]
            };
            let Some(t) = plane_distance(ray, face, plane, current.distance()) else {
                continue;
            };
            let point = ray.at(t);
            let within_face = Axis::ALL
                .into_iter()
                .filter(|&other| other != axis)
                .all(|other| lower[other] <= point[other] && point[other] <= upper[other]);
            if !within_face {
                continue;
            }

            let plane_uv = match axis {
                Axis::X => TexPoint::new(point.z, point.y),
                Axis::Y => TexPoint::new(point.x, point.z),
                Axis::Z => TexPoint::new(point.x, point.y),
            };
            let tex_coord = cube_face_tex_coord(face, plane_uv);
            let material = self.faces[face].material;
            let Some(sample) = materials.sample(material, tex_coord, SampleMode::Cutout) else {
                continue;
            };
            best = current
                .accept(Hit {
                    distance: t,
                    tex_coord,
                    normal: face.normal_vector(),
                    material,
                    block: BlockId::Empty,
                    sample,
                })
                .or(best);
        }
        best
    }
}
