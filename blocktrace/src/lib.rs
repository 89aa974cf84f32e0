//! Monte Carlo path tracer for worlds made of parametric blocks.
//!
//! A scene is a grid of block ids, each of which names a [`Shape`](block::Shape):
//! a full cube, a set of textured boxes, a set of quads, a liquid surface, or nothing
//! visible at all. Surfaces get their appearance from a [`MaterialPalette`](material::MaterialPalette).
//! [`Renderer`](render::Renderer) traces one path per pixel per pass, with next-event
//! estimation toward emissive blocks (found through an [`EmitterGrid`](emitter_grid::EmitterGrid))
//! and toward the [`Sun`](environment::Sun), and averages passes into an
//! [`AccumulationBuffer`](accum::AccumulationBuffer).
//!
//! Scenes may be assembled directly from Rust values, or decoded from the flat integer
//! tables produced by an external scene packer; see [`packed`].
//!
//! ## Package features
//!
//! This package, `blocktrace`, defines the following feature flags:
//!
//! * `"auto-threads"`:
//!   Enable use of threads for parallel rendering, via [`rayon`]’s global thread pool.
//!   This feature does not affect the public API, only performance and dependencies.
//! * `"serde"`:
//!   Adds serialization for [`RenderSettings`](settings::RenderSettings) and the
//!   scene description types.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

// -------------------------------------------------------------------------------------------------

pub use blocktrace_base::{math, raycast, util};

pub mod accum;
pub mod block;
pub mod camera;
pub mod emitter_grid;
pub mod environment;
pub mod integrator;
pub mod intersect;
pub mod light;
pub mod material;
pub mod medium;
pub mod packed;
pub mod render;
pub mod scene;
pub mod settings;
mod triangle;
pub mod triangles;
pub mod voxels;

#[doc(hidden)]
pub use blocktrace_base::euclid;

// -------------------------------------------------------------------------------------------------

/// Tolerance used for comparisons of distances, probabilities, and colors against zero.
pub const EPSILON: f32 = 5e-6;

/// Distance in world units by which a ray is moved off a surface after interacting with it,
/// so that it does not immediately hit the same surface again.
pub const SURFACE_OFFSET: f64 = 1e-4;

/// [`EPSILON`] at geometry precision.
pub(crate) const EPSILON_F64: f64 = 5e-6;

/// Random number generator used for path sampling.
///
/// Each pixel sample gets its own generator, seeded from the render seed and the
/// sample's linear index.
pub type PathRng = rand_xoshiro::Xoshiro256Plus;
