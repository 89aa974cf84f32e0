//! The six faces of a voxel, [`Face6`], and [`FaceMap`] for storing per-face data.
//! This module is private but reexported by its parent.

use core::ops;

use crate::math::{Axis, FreeVector};

/// One face of a cube, equivalently an axis-aligned unit normal.
///
/// Compass names follow the block model convention: north is −Z and east is +X.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Face6 {
    /// North, normal `(0, 0, -1)`.
    NZ = 0,
    /// East, normal `(1, 0, 0)`.
    PX = 1,
    /// South, normal `(0, 0, 1)`.
    PZ = 2,
    /// West, normal `(-1, 0, 0)`.
    NX = 3,
    /// Top, normal `(0, 1, 0)`.
    PY = 4,
    /// Bottom, normal `(0, -1, 0)`.
    NY = 5,
}

impl Face6 {
    /// The order in which block models store and enumerate faces:
    /// north, east, south, west, top, bottom.
    ///
    /// The discriminant of each face is its position in this list.
    pub const BLOCK_ORDER: [Face6; 6] = [
        Face6::NZ,
        Face6::PX,
        Face6::PZ,
        Face6::NX,
        Face6::PY,
        Face6::NY,
    ];

    /// The face lying on `axis` whose normal points toward positive or negative coordinates.
    #[inline]
    pub const fn from_axis(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::X, false) => Self::NX,
            (Axis::Y, false) => Self::NY,
            (Axis::Z, false) => Self::NZ,
            (Axis::X, true) => Self::PX,
            (Axis::Y, true) => Self::PY,
            (Axis::Z, true) => Self::PZ,
        }
    }

    /// Returns which axis this face's normal vector is parallel to.
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Self::NX | Self::PX => Axis::X,
            Self::NY | Self::PY => Axis::Y,
            Self::NZ | Self::PZ => Axis::Z,
        }
    }

    /// Whether the normal's nonzero component is positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::PX | Self::PY | Self::PZ)
    }

    /// Returns the unit vector normal to this face, pointing out of the cube.
    #[inline]
    pub fn normal_vector(self) -> FreeVector {
        let mut normal = FreeVector::zero();
        normal[self.axis()] = if self.is_positive() { 1.0 } else { -1.0 };
        normal
    }

    #[inline]
    const fn block_index(self) -> usize {
        self as usize
    }
}

// -------------------------------------------------------------------------------------------------

/// One value per [`Face6`], stored in [`Face6::BLOCK_ORDER`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceMap<V>([V; 6]);

impl<V> FaceMap<V> {
    /// Constructs a [`FaceMap`] from values listed in [`Face6::BLOCK_ORDER`].
    #[inline]
    pub const fn from_block_order(values: [V; 6]) -> Self {
        Self(values)
    }

    /// Constructs a [`FaceMap`] containing clones of the provided value.
    #[inline]
    pub fn splat(value: V) -> Self
    where
        V: Clone,
    {
        Self(core::array::from_fn(|_| value.clone()))
    }

    /// Iterate over the map's key-value pairs in [`Face6::BLOCK_ORDER`].
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn iter_block_order(&self) -> impl Iterator<Item = (Face6, &V)> {
        Face6::BLOCK_ORDER.into_iter().zip(&self.0)
    }
}

impl<V> ops::Index<Face6> for FaceMap<V> {
    type Output = V;
    #[inline]
    fn index(&self, face: Face6) -> &V {
        &self.0[face.block_index()]
    }
}

impl<V> ops::IndexMut<Face6> for FaceMap<V> {
    #[inline]
    fn index_mut(&mut self, face: Face6) -> &mut V {
        &mut self.0[face.block_index()]
    }
}
