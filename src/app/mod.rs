//! Application-level modules: the coordinator, settings persistence and
//! centralized state.

mod app_state;
mod application_coordinator;
pub mod settings_coordinator;

pub use app_state::AppState;
pub use application_coordinator::{ApplicationCoordinator, ZOOM_STEP};
pub use settings_coordinator::{SettingsCoordinator, ViewerSettings};
