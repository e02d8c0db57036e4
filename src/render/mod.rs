//! Rendering of outlines and extraction reports.

mod json;
mod result;

pub use json::{to_json, JsonFormat};
pub use result::{DegradeReason, OutlineReport, ProcessingStats, ProcessingStatus};
