//! UI panel rendering subsystem
//!
//! - Header panel (file and project controls, time scale, paging, event focus)
//! - Channels panel (channel display settings, overlay groups)
//! - Signal panel (traces, time axes, event markers)
//! - Events panel (event track editing)
//! - Status bar (session summary)
//! - Panel manager (panel orchestration and layout)
//! - Input handling (keyboard shortcuts)

pub mod header;
pub mod channels_panel;
pub mod signal_panel;
pub mod events_panel;
pub mod status_bar;
pub mod panel_manager;
pub mod input;
