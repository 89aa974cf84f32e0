//! Mathematical utilities and decisions.

mod aab;
pub use aab::*;
mod axis;
pub use axis::*;
mod color;
pub use color::*;
mod coord;
pub use coord::*;
mod face;
pub use face::*;
mod grid_aab;
pub use grid_aab::*;

// Grid indexing converts volumes to `usize` and assumes that cannot overflow.
#[cfg(target_pointer_width = "16")]
compile_error!("blocktrace does not support platforms with less than 32-bit `usize`");

/// Swap `a` and `b` if `a > b`.
#[inline]
#[doc(hidden)]
pub fn sort_two<T: PartialOrd>(a: &mut T, b: &mut T) {
    if *a > *b {
        core::mem::swap(a, b);
    }
}
