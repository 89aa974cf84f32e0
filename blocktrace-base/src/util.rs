//! Helpers shared by the library and the command line tool.

mod log;
pub use log::standard_filter;
