//! Components of the `blocktrace` command-line renderer.
//!
//! This is not a general-purpose library. It exists separately from the binary so that
//! the scene file format, settings files, and image output can be tested and reused by
//! development tools.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

mod config_files;
pub use config_files::{SettingsArgs, load_config};
pub mod logging;
pub mod scene_file;
pub mod write_png;
