//! What a ray is currently travelling through.

use crate::block::BlockId;
use crate::material::MaterialId;
use crate::raycast::Ray;

/// The material, and the block made of it, that a ray is inside.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Medium {
    #[allow(missing_docs)]
    pub material: MaterialId,
    #[allow(missing_docs)]
    pub block: BlockId,
}

impl Medium {
    /// Empty space.
    pub const VACUUM: Self = Self {
        material: MaterialId::AIR,
        block: BlockId::Empty,
    };
}

/// The medium a ray is in and the one it was in before its last surface crossing.
///
/// Only one level of history is kept: after entering water and then glass, leaving the
/// glass by reflection returns to water, but a second crossing cannot unwind further.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct MediumHistory {
    previous: Medium,
    current: Medium,
}

impl MediumHistory {
    /// Starts in vacuum.
    pub const VACUUM: Self = Self {
        previous: Medium::VACUUM,
        current: Medium::VACUUM,
    };

    /// Starts in `current`, having come from vacuum.
    pub const fn starting_in(current: Medium) -> Self {
        Self {
            previous: Medium::VACUUM,
            current,
        }
    }

    #[allow(missing_docs)]
    pub const fn previous(&self) -> Medium {
        self.previous
    }

    #[allow(missing_docs)]
    pub const fn current(&self) -> Medium {
        self.current
    }

    /// Records crossing a surface into `medium`.
    pub fn enter(&mut self, medium: Medium) {
        self.previous = self.current;
        self.current = medium;
    }

    /// Undoes the last [`enter()`](Self::enter), as happens when the ray is reflected
    /// rather than crossing the surface.
    pub fn revert(&mut self) {
        self.current = self.previous;
    }

    /// Both slots set to the previous medium; the state for a shadow ray leaving a surface
    /// on the side the path arrived from.
    #[must_use]
    pub fn reverted_both(self) -> Self {
        Self {
            previous: self.previous,
            current: self.previous,
        }
    }
}

bitflags::bitflags! {
    /// Markers carried along with a [`PathRay`].
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct RayFlags: u8 {
        /// The path has made at least one diffuse bounce.
        const INDIRECT = 1 << 0;
        /// The ray belongs to a preview render.
        const PREVIEW = 1 << 1;
    }
}

/// A ray together with its medium state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct PathRay {
    /// Geometric ray; the direction is kept normalized.
    pub ray: Ray,
    #[allow(missing_docs)]
    pub media: MediumHistory,
    #[allow(missing_docs)]
    pub flags: RayFlags,
}

impl PathRay {
    /// A ray in vacuum with no flags.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray: ray.normalized(),
            media: MediumHistory::VACUUM,
            flags: RayFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn medium(n: u32) -> Medium {
        Medium {
            material: MaterialId(n),
            block: BlockId::Defined(NonZeroU32::new(n).unwrap()),
        }
    }

    #[test]
    fn two_slot_history() {
        let mut h = MediumHistory::VACUUM;
        h.enter(medium(1));
        h.enter(medium(2));
        assert_eq!((h.previous(), h.current()), (medium(1), medium(2)));
        h.revert();
        assert_eq!((h.previous(), h.current()), (medium(1), medium(1)));
        // no deeper history
        h.revert();
        assert_eq!(h.current(), medium(1));
    }

    #[test]
    fn reverted_both() {
        let mut h = MediumHistory::starting_in(medium(3));
        h.enter(medium(4));
        let shadow = h.reverted_both();
        assert_eq!((shadow.previous(), shadow.current()), (medium(3), medium(3)));
    }
}
