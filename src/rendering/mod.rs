//! Rendering subsystem
//!
//! - Channel traces and event markers
//! - Time axis (millisecond labels and tick marks)

pub mod signal_renderer;
pub mod time_axis_renderer;
