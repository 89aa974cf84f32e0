//! Block ids and the geometry of the blocks they name.
//!
//! Each block id names a [`Shape`], stored in a [`BlockPalette`]. All geometry here is in
//! block-local coordinates, where the block occupies the unit cube `[0, 1]³`.

use std::fmt;
use std::num::NonZeroU32;

use crate::EPSILON_F64;
use crate::intersect::{Hit, IntersectionRecord};
use crate::material::{MaterialId, MaterialPalette, SampleMode};
use crate::math::{
    Aab, Face6, FreeCoordinate, FreePoint, FreeVector, GridPoint, Rgba, TexPoint, cube_lower_corner,
};
use crate::raycast::Ray;

mod boxes;
pub use boxes::*;
mod quad;
pub use quad::*;
mod water;
pub use water::*;


// -------------------------------------------------------------------------------------------------

/// Names an entry of a [`BlockPalette`], or one of the two special non-blocks.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
#[expect(clippy::exhaustive_enums)]
pub enum BlockId {
    /// No block; air. Has no geometry and no material.
    #[default]
    Empty,
    /// Stands for “any block” in scene data. Never intersected, never shaded.
    Wildcard,
    /// An entry of the palette. The number is never [`BlockId::WILDCARD_RAW`].
    Defined(NonZeroU32),
}

impl BlockId {
    /// The integer that [`BlockId::Wildcard`] is encoded as in packed scene data.
    pub const WILDCARD_RAW: u32 = 0x7FFF_FFFE;

    /// Decodes an integer block id.
    pub const fn from_raw(raw: u32) -> Self {
        match NonZeroU32::new(raw) {
            None => Self::Empty,
            Some(_) if raw == Self::WILDCARD_RAW => Self::Wildcard,
            Some(n) => Self::Defined(n),
        }
    }

    /// Encodes this id as an integer; the inverse of [`BlockId::from_raw()`].
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::Wildcard => Self::WILDCARD_RAW,
            Self::Defined(n) => n.get(),
        }
    }

    /// Returns whether this id names an actual block.
    pub const fn is_defined(self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl From<u32> for BlockId {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<BlockId> for u32 {
    fn from(id: BlockId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Wildcard => f.write_str("wildcard"),
            Self::Defined(n) => write!(f, "block #{n}"),
        }
    }
}

/// The variant of a [`Shape`], without its data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum ModelType {
    #[allow(missing_docs)]
    Empty,
    #[allow(missing_docs)]
    FullCube,
    #[allow(missing_docs)]
    BoxSet,
    #[allow(missing_docs)]
    QuadMesh,
    #[allow(missing_docs)]
    HiddenEmitter,
    #[allow(missing_docs)]
    Water,
}

impl ModelType {
    /// The tag used for this variant in packed scene data.
    pub const fn tag(self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::FullCube => 1,
            Self::BoxSet => 2,
            Self::QuadMesh => 3,
            Self::HiddenEmitter => 4,
            Self::Water => 5,
        }
    }

    /// Decodes a packed tag.
    pub const fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            0 => Self::Empty,
            1 => Self::FullCube,
            2 => Self::BoxSet,
            3 => Self::QuadMesh,
            4 => Self::HiddenEmitter,
            5 => Self::Water,
            _ => return None,
        })
    }
}

/// The geometry and material assignment of one kind of block.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[expect(clippy::exhaustive_enums)]
pub enum Shape {
    /// Nothing at all.
    #[default]
    Empty,
    /// The whole unit cube, with one material on every face.
    FullCube {
        #[allow(missing_docs)]
        material: MaterialId,
    },
    /// A union of axis-aligned boxes, each with its own face materials.
    BoxSet {
        #[allow(missing_docs)]
        boxes: Vec<TexturedBox>,
    },
    /// A set of one-sided parallelograms.
    QuadMesh {
        #[allow(missing_docs)]
        quads: Vec<Quad>,
    },
    /// A light source with no visible geometry.
    HiddenEmitter {
        #[allow(missing_docs)]
        material: MaterialId,
    },
    /// A liquid surface.
    Water(WaterModel),
}

/// A point on a light-emitting face, from [`BlockPalette::sample_emitter_face()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct FaceSample {
    /// Block-local position.
    pub position: FreePoint,
    /// Outward unit normal of the face.
    pub normal: FreeVector,
    /// Area of the whole face.
    pub area: f64,
}

impl Shape {
    /// Which variant this is.
    pub fn model_type(&self) -> ModelType {
        match self {
            Shape::Empty => ModelType::Empty,
            Shape::FullCube { .. } => ModelType::FullCube,
            Shape::BoxSet { .. } => ModelType::BoxSet,
            Shape::QuadMesh { .. } => ModelType::QuadMesh,
            Shape::HiddenEmitter { .. } => ModelType::HiddenEmitter,
            Shape::Water(_) => ModelType::Water,
        }
    }

    /// The material which best represents the block as a whole, or [`MaterialId::AIR`].
    pub fn primary_material(&self) -> MaterialId {
        match self {
            Shape::Empty => MaterialId::AIR,
            Shape::FullCube { material } | Shape::HiddenEmitter { material } => *material,
            Shape::BoxSet { boxes } => boxes
                .iter()
                .flat_map(|b| b.faces.iter_block_order().map(|(_, face)| face.material))
                .find(|m| !m.is_air())
                .unwrap_or(MaterialId::AIR),
            Shape::QuadMesh { quads } => quads.first().map_or(MaterialId::AIR, |q| q.material),
            Shape::Water(water) => water.material,
        }
    }

    /// Number of faces [`Self::sample_emitter_face()`] accepts.
    pub fn emitter_face_count(&self) -> usize {
        match self {
            Shape::FullCube { .. } => 6,
            Shape::BoxSet { boxes } => boxes.iter().map(TexturedBox::visible_face_count).sum(),
            Shape::QuadMesh { quads } => quads.len(),
            Shape::Empty | Shape::HiddenEmitter { .. } | Shape::Water(_) => 0,
        }
    }

    /// Maps `uv ∈ [0, 1)²` to a point on the `face_index`-th emitting face.
    ///
    /// Returns [`None`] if `face_index` is not less than [`Self::emitter_face_count()`].
    pub fn sample_emitter_face(&self, face_index: usize, uv: [f64; 2]) -> Option<FaceSample> {
        match self {
            Shape::FullCube { .. } => {
                let face = *Face6::BLOCK_ORDER.get(face_index)?;
                Some(sample_box_face(Aab::UNIT, face, uv))
            }
            Shape::BoxSet { boxes } => boxes
                .iter()
                .flat_map(|b| b.visible_faces().map(move |face| (b.bounds, face)))
                .nth(face_index)
                .map(|(bounds, face)| sample_box_face(bounds, face, uv)),
            Shape::QuadMesh { quads } => Some(quads.get(face_index)?.sample(uv)),
            Shape::Empty | Shape::HiddenEmitter { .. } | Shape::Water(_) => None,
        }
    }

    /// Intersects a ray in block-local coordinates with this shape.
    ///
    /// Returns [`None`] unless there is a hit nearer than `record`'s distance.
    /// The returned hit's [`block`](Hit::block) is [`BlockId::Empty`]; see
    /// [`BlockPalette::intersect()`].
    pub fn intersect(
        &self,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        match self {
            Shape::Empty | Shape::HiddenEmitter { .. } => None,
            Shape::FullCube { material } => intersect_full_cube(*material, ray, record, materials),
            Shape::BoxSet { boxes } => boxes.iter().fold(None, |best, b| {
                b.intersect(ray, best.unwrap_or(record), materials).or(best)
            }),
            Shape::QuadMesh { quads } => quads.iter().fold(None, |best, q| {
                q.intersect(ray, best.unwrap_or(record), materials).or(best)
            }),
            Shape::Water(water) => water.intersect(ray, record, materials),
        }
    }
}

fn intersect_full_cube(
    material: MaterialId,
    ray: &Ray,
    record: IntersectionRecord,
    materials: &MaterialPalette,
) -> Option<IntersectionRecord> {
    let hit = Aab::UNIT.intersect_ray(ray, EPSILON_F64)?;
    if hit.t >= record.distance() {
        return None;
    }
    let normal = hit.normal();
    let tex_coord = cube_face_tex_coord(hit.face, hit.uv);
    let mut sample = materials.sample(material, tex_coord, SampleMode::AllowAlpha)?;

    let m = materials.get(material);
    if !hit.entering
        && m.is_refractive()
        && !m.is_opaque()
        && normal.dot(ray.direction) > 0.0
        && sample.color.alpha() <= crate::EPSILON
    {
        // Leaving clear glass: keep the medium boundary but draw nothing.
        sample = sample.with_color(Rgba::new(1.0, 1.0, 1.0, 0.0));
    }

    record.accept(Hit {
        distance: hit.t,
        tex_coord,
        normal,
        material,
        block: BlockId::Empty,
        sample,
    })
}

/// Mirrors the plane coordinates of [`AabHit::uv`](crate::math::AabHit::uv) so that every
/// face's texture reads left to right and bottom to top when viewed from outside.
pub(crate) fn cube_face_tex_coord(face: Face6, plane_uv: TexPoint) -> TexPoint {
    let mut uv = plane_uv;
    if matches!(face, Face6::PX | Face6::NZ) {
        uv.x = 1.0 - uv.x;
    }
    if face == Face6::PY {
        uv.y = 1.0 - uv.y;
    }
    uv
}

/// Maps `uv` to a point on `face` of `bounds`.
fn sample_box_face(bounds: Aab, face: Face6, [u, v]: [f64; 2]) -> FaceSample {
    let l = bounds.lower_bounds_p();
    let h = bounds.upper_bounds_p();
    let size = bounds.size();
    let (position, area) = match face {
        Face6::NZ => (
            FreePoint::new(l.x + u * size.width, l.y + v * size.height, l.z),
            size.width * size.height,
        ),
        Face6::PX => (
            FreePoint::new(h.x, l.y + v * size.height, l.z + u * size.depth),
            size.depth * size.height,
        ),
        Face6::PZ => (
            FreePoint::new(h.x - u * size.width, l.y + v * size.height, h.z),
            size.width * size.height,
        ),
        Face6::NX => (
            FreePoint::new(l.x, l.y + v * size.height, h.z - u * size.depth),
            size.depth * size.height,
        ),
        Face6::PY => (
            FreePoint::new(l.x + u * size.width, h.y, h.z - v * size.depth),
            size.width * size.depth,
        ),
        Face6::NY => (
            FreePoint::new(l.x + u * size.width, l.y, l.z + v * size.depth),
            size.width * size.depth,
        ),
    };
    FaceSample {
        position,
        normal: face.normal_vector(),
        area,
    }
}

// -------------------------------------------------------------------------------------------------

/// The shapes of all block ids of a scene.
///
/// Queries on [`BlockId::Empty`], [`BlockId::Wildcard`], or ids not in the palette behave as
/// [`Shape::Empty`]. Ids need not be contiguous: a palette decoded from packed tables uses
/// each record's word offset as its id, so only even ids have shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPalette {
    /// Indexed by raw block id. Entry 0 is always [`Shape::Empty`].
    shapes: Vec<Shape>,
}

static EMPTY_SHAPE: Shape = Shape::Empty;

impl BlockPalette {
    /// Constructs a palette containing no blocks.
    pub fn new() -> Self {
        Self {
            shapes: vec![Shape::Empty],
        }
    }

    /// Adds a shape, returning its newly allocated id.
    pub fn push(&mut self, shape: Shape) -> BlockId {
        let raw = self.shapes.len() as u32;
        if raw == BlockId::WILDCARD_RAW {
            // Never hand out the wildcard's number.
            self.shapes.push(Shape::Empty);
            return self.push(shape);
        }
        self.shapes.push(shape);
        BlockId::from_raw(raw)
    }

    /// One past the largest id that may have a shape.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false, since [`BlockId::Empty`] is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the defined ids which have a non-empty shape.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Shape)> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, shape)| (BlockId::from_raw(i as u32), shape))
            .filter(|(id, shape)| id.is_defined() && **shape != Shape::Empty)
    }

    /// Returns the shape of `id`.
    pub fn get(&self, id: BlockId) -> &Shape {
        match id {
            BlockId::Defined(n) => self.shapes.get(n.get() as usize).unwrap_or(&EMPTY_SHAPE),
            BlockId::Empty | BlockId::Wildcard => &EMPTY_SHAPE,
        }
    }

    /// See [`Shape::model_type()`].
    pub fn model_type(&self, id: BlockId) -> ModelType {
        self.get(id).model_type()
    }

    /// See [`Shape::primary_material()`].
    pub fn primary_material(&self, id: BlockId) -> MaterialId {
        self.get(id).primary_material()
    }

    /// See [`Shape::emitter_face_count()`].
    pub fn emitter_face_count(&self, id: BlockId) -> usize {
        self.get(id).emitter_face_count()
    }

    /// See [`Shape::sample_emitter_face()`].
    pub fn sample_emitter_face(
        &self,
        id: BlockId,
        face_index: usize,
        uv: [f64; 2],
    ) -> Option<FaceSample> {
        self.get(id).sample_emitter_face(face_index, uv)
    }

    /// Intersects a world-space ray with the block `id` placed at `cube`.
    ///
    /// Returns [`None`] unless there is a hit nearer than `record`'s distance, in which case
    /// the hit is tagged with `id`. Distances are unchanged by the translation into
    /// block-local space.
    pub fn intersect(
        &self,
        id: BlockId,
        cube: GridPoint,
        ray: &Ray,
        record: IntersectionRecord,
        materials: &MaterialPalette,
    ) -> Option<IntersectionRecord> {
        let local = Ray {
            origin: ray.origin - cube_lower_corner(cube).to_vector(),
            direction: ray.direction,
        };
        self.get(id)
            .intersect(&local, record, materials)
            .map(|r| r.with_block(id))
    }

    pub(crate) fn from_shapes(shapes: Vec<Shape>) -> Self {
        debug_assert!(shapes.first().is_none_or(|s| *s == Shape::Empty));
        Self { shapes }
    }
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance along `ray` to the plane perpendicular to `face` at `plane`, if it is ahead
/// of the ray and nearer than `limit`.
pub(crate) fn plane_distance(
    ray: &Ray,
    face: Face6,
    plane: FreeCoordinate,
    limit: FreeCoordinate,
) -> Option<FreeCoordinate> {
    let direction = ray.direction[face.axis()];
    if direction == 0.0 {
        return None;
    }
    let t = (plane - ray.origin[face.axis()]) / direction;
    (t > EPSILON_F64 && t < limit).then_some(t)
}
