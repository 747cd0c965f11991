//! State management modules for the viewer (no UI code):
//! - Signal state (decoded samples per loaded recording)
//! - Selection state (edited recording, ticked codes, hover)
//! - Layout state (panel sizes, input buffers)

mod signal_state;
mod selection;
mod layout_state;

pub use signal_state::SignalState;
pub use selection::SelectionState;
pub use layout_state::LayoutState;
