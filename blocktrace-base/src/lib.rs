//! This library is an internal component of [`blocktrace`],
//! which defines some core mathematical types and functions.
//! Do not depend on this library; use only [`blocktrace`] instead.
//!
//! [`blocktrace`]: https://crates.io/crates/blocktrace/

#![no_std]
// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    warn(clippy::std_instead_of_core, clippy::std_instead_of_alloc)
)]
#![warn(clippy::missing_inline_in_public_items)]

#[cfg(any(feature = "std", test))]
#[cfg_attr(test, macro_use)]
extern crate std;
#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

/// Do not use this module directly; its contents are re-exported from `blocktrace`.
pub mod math;

/// Do not use this module directly; its contents are re-exported from `blocktrace`.
pub mod raycast;

/// Do not use this module directly; its contents are re-exported from `blocktrace`.
pub mod util;

// reexport for convenience of our tests
#[doc(hidden)]
pub use euclid;
