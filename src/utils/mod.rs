//! Utility modules for the viewer.

pub mod formatting;

pub use formatting::{format_memory_mb, format_time_ms, format_time_scale, get_current_memory_mb};
