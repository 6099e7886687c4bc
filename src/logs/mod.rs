//! Network monitor log access.
//!
//! The monitor appends one CSV row per measurement; this module reads that
//! file back as typed samples.

mod models;
mod reader;

pub use models::*;
pub use reader::*;
