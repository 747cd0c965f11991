//! UI layout state management.
//!
//! Panel sizes and the text buffers behind the side panels' input fields.

use serde::{Deserialize, Serialize};

/// State related to UI layout and sizing.
///
/// Responsibilities:
/// - Side panel widths and minimum channel row height (persisted)
/// - Text buffers for event code entry, recoding and overlay names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutState {
    /// Width of the channels panel on the left
    channels_panel_width: f32,
    /// Width of the events panel on the right
    events_panel_width: f32,
    /// Channel rows never shrink below this height
    min_row_height: f32,
    #[serde(skip, default = "default_event_code_text")]
    new_event_code_text: String,
    #[serde(skip)]
    recode_target_text: String,
    #[serde(skip)]
    overlay_name_text: String,
}

fn default_event_code_text() -> String {
    "1".to_string()
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            channels_panel_width: 200.0,
            events_panel_width: 260.0,
            min_row_height: 28.0,
            new_event_code_text: default_event_code_text(),
            recode_target_text: String::new(),
            overlay_name_text: String::new(),
        }
    }

    // ===== Layout Queries =====

    pub fn channels_panel_width(&self) -> f32 {
        self.channels_panel_width
    }

    pub fn events_panel_width(&self) -> f32 {
        self.events_panel_width
    }

    pub fn min_row_height(&self) -> f32 {
        self.min_row_height
    }

    /// Code used for events added by clicking the traces.
    pub fn new_event_code(&self) -> Option<i32> {
        self.new_event_code_text.trim().parse().ok()
    }

    pub fn recode_target(&self) -> Option<i32> {
        self.recode_target_text.trim().parse().ok()
    }

    // ===== Text Input Accessors =====

    pub fn new_event_code_text_mut(&mut self) -> &mut String {
        &mut self.new_event_code_text
    }

    pub fn recode_target_text_mut(&mut self) -> &mut String {
        &mut self.recode_target_text
    }

    pub fn overlay_name_text_mut(&mut self) -> &mut String {
        &mut self.overlay_name_text
    }

    /// Takes the overlay name buffer, leaving it empty. None if blank.
    pub fn take_overlay_name(&mut self) -> Option<String> {
        let name = std::mem::take(&mut self.overlay_name_text);
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
