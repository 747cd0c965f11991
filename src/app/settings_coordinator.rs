//! Settings persistence coordination.
//!
//! Viewer preferences are stored in eframe's persistent storage as JSON
//! strings, one key per setting group.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use eegscope::project::DEFAULT_BACKGROUND;
use eegscope::DEFAULT_TIME_SCALE_MS;

use crate::state::LayoutState;

pub const VIEWER_SETTINGS_KEY: &str = "viewer_settings";
pub const LAYOUT_KEY: &str = "layout";

/// Preferences that outlive a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Time scale applied when the first recording opens
    pub initial_time_scale_ms: u64,
    pub background_color: [u8; 3],
    /// Directory of the last opened file, for file dialogs
    pub last_directory: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            initial_time_scale_ms: DEFAULT_TIME_SCALE_MS,
            background_color: DEFAULT_BACKGROUND,
            last_directory: None,
        }
    }
}

impl ViewerSettings {
    /// Where file dialogs open: the last used directory, else the home directory.
    pub fn dialog_directory(&self) -> Option<PathBuf> {
        self.last_directory
            .clone()
            .filter(|dir| dir.is_dir())
            .or_else(dirs::home_dir)
    }

    pub fn remember_directory_of(&mut self, file: &std::path::Path) {
        if let Some(parent) = file.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
    }
}

/// Coordinates settings persistence.
pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Loads a setting, falling back to `T::default()` when missing or invalid.
    pub fn load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        Self::try_load_setting(storage, key).unwrap_or_default()
    }

    pub fn save_setting<T>(storage: &mut dyn eframe::Storage, key: &str, value: &T)
    where
        T: Serialize,
    {
        match serde_json::to_string(value) {
            Ok(json_str) => {
                storage.set_string(key, json_str);
                storage.flush();
            }
            Err(e) => log::warn!("failed to serialize setting '{}': {}", key, e),
        }
    }

    /// Returns None if the key is missing or does not parse.
    pub fn try_load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let storage = storage?;
        let json_str = storage.get_string(key)?;
        serde_json::from_str(&json_str).ok()
    }

    pub fn load_viewer_settings(storage: Option<&dyn eframe::Storage>) -> (ViewerSettings, LayoutState) {
        (
            Self::load_setting(storage, VIEWER_SETTINGS_KEY),
            Self::load_setting(storage, LAYOUT_KEY),
        )
    }

    pub fn save_viewer_settings(
        storage: &mut dyn eframe::Storage,
        settings: &ViewerSettings,
        layout: &LayoutState,
    ) {
        Self::save_setting(storage, VIEWER_SETTINGS_KEY, settings);
        Self::save_setting(storage, LAYOUT_KEY, layout);
    }
}
