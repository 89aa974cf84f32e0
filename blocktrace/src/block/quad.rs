use crate::EPSILON_F64;
use crate::block::{BlockId, FaceSample};
use crate::intersect::{Hit, IntersectionRecord};
use crate::material::{MaterialId, MaterialPalette, SampleMode};
use crate::math::{FreePoint, FreeVector, TexPoint};
use crate::raycast::Ray;

/// A one-sided parallelogram with corners `origin`, `origin + x_edge`,
/// `origin + x_edge + y_edge`, and `origin + y_edge`.
///
/// It is visible from the side `x_edge × y_edge` points toward. The edges are expected to be
/// perpendicular; texture coordinates are the projections onto each edge.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct Quad {
    #[allow(missing_docs)]
    pub origin: FreePoint,
    #[allow(missing_docs)]
    pub x_edge: FreeVector,
    #[allow(missing_docs)]
    pub y_edge: FreeVector,
    #[allow(missing_docs)]
    pub material: MaterialId,
}

impl Quad {
    /// Constructs a [`Quad`] from convertible types.
    pub fn new(
        origin: impl Into<FreePoint>,
        x_edge: impl Into<FreeVector>,
        y_edge: impl Into<FreeVector>,
        material: MaterialId,
    ) -> Self {
        Self {
            origin: origin.into(),
            x_edge: x_edge.into(),
            y_edge: y_edge.into(),
            material,
        }
    }

    /// Unnormalized normal; its length is the area.
    fn cross(&self) -> FreeVector {
        self.x_edge.cross(self.y_edge)
    }

    pub(crate) fn sample(&self, [u, v]: [f64; 2]) -> FaceSample {
        let cross = self.cross();
        FaceSample {
            position: self.origin + self.x_edge * u + self.y_edge * v,
            normal: cross.normalize(),
            area: cross.length(),
        }
    }

    pub(crate) fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        let cross = self.cross();
        let area = cross.length();
        if area <= EPSILON_F64 {
            return None;
        }
        let normal = cross / area;
        let denominator = normal.dot(ray.direction);
        if denominator >= -EPSILON_F64 {
            // parallel, or seen from behind
            return None;
        }
        let t = normal.dot(self.origin - ray.origin) / denominator;
        if !(t > EPSILON_F64 && t < record.distance()) {
            return None;
        }
        let relative = ray.at(t) - self.origin;
        let u = relative.dot(self.x_edge) / self.x_edge.square_length();
        let v = relative.dot(self.y_edge) / self.y_edge.square_length();
        if !((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)) {
            return None;
        }
        let tex_coord = TexPoint::new(u, v);
        let sample = materials.sample(self.material, tex_coord, SampleMode::Cutout)?;
        record.accept(Hit {
            distance: t,
            tex_coord,
            normal,
            material: self.material,
            block: BlockId::Empty,
            sample,
        })
    }
}
