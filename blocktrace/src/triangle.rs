use crate::EPSILON_F64;
use crate::material::MaterialId;
use crate::math::{Aab, FreeCoordinate, FreePoint, FreeVector, TexPoint};
use crate::raycast::Ray;

/// A textured triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct Triangle {
    /// Corner positions.
    pub positions: [FreePoint; 3],
    /// Texture coordinates of the corresponding corners.
    pub tex_coords: [TexPoint; 3],
    #[allow(missing_docs)]
    pub material: MaterialId,
}

/// Where a ray met a [`Triangle`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TriangleHit {
    pub t: FreeCoordinate,
    pub tex_coord: TexPoint,
    /// Unit normal, facing against the ray.
    pub normal: FreeVector,
}

impl Triangle {
    /// Constructs a triangle from positions and texture coordinates.
    pub fn new(
        positions: [impl Into<FreePoint>; 3],
        tex_coords: [impl Into<TexPoint>; 3],
        material: MaterialId,
    ) -> Self {
        Self {
            positions: positions.map(Into::into),
            tex_coords: tex_coords.map(Into::into),
            material,
        }
    }

    /// The smallest box containing the triangle.
    pub fn bounds(&self) -> Aab {
        let [a, b, c] = self.positions;
        Aab::from_lower_upper(a.min(b).min(c), a.max(b).max(c))
    }

    /// Returns the same triangle moved by `offset`.
    #[must_use]
    pub fn translate(self, offset: FreeVector) -> Self {
        Self {
            positions: self.positions.map(|p| p + offset),
            ..self
        }
    }

    /// Möller–Trumbore intersection, accepting only hits with
    /// `EPSILON < t < max_distance`.
    pub(crate) fn intersect(&self, ray: &Ray, max_distance: FreeCoordinate) -> Option<TriangleHit> {
        let [a, b, c] = self.positions;
        let e1 = b - a;
        let e2 = c - a;
        let p = ray.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() <= EPSILON_F64 {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = ray.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv_det;
        if !(t > EPSILON_F64 && t < max_distance) {
            return None;
        }

        let w = 1.0 - u - v;
        let [ta, tb, tc] = self.tex_coords;
        let tex_coord = TexPoint::new(
            ta.x * w + tb.x * u + tc.x * v,
            ta.y * w + tb.y * u + tc.y * v,
        );
        let mut normal = e1.cross(e2).normalize();
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        Some(TriangleHit {
            t,
            tex_coord,
            normal,
        })
    }
}
