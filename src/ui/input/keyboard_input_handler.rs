//! Keyboard shortcuts for paging, event stepping and zooming.
//!
//! - PageUp / PageDown: previous / next page
//! - Left / Right: previous / next browsable event
//! - `+` / `-`: halve / double the time scale
//! - `E`: toggle event focus

use eframe::egui;
use eegscope::StepDirection;

/// Action bound to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Page(StepDirection),
    Event(StepDirection),
    ZoomIn,
    ZoomOut,
    ToggleViewMode,
}

/// Maps a single key to its command, ignoring presses with Ctrl or Alt held.
pub fn command_for_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<KeyCommand> {
    if modifiers.ctrl || modifiers.alt || modifiers.command {
        return None;
    }
    match key {
        egui::Key::PageUp => Some(KeyCommand::Page(StepDirection::Previous)),
        egui::Key::PageDown => Some(KeyCommand::Page(StepDirection::Next)),
        egui::Key::ArrowLeft => Some(KeyCommand::Event(StepDirection::Previous)),
        egui::Key::ArrowRight => Some(KeyCommand::Event(StepDirection::Next)),
        egui::Key::Plus | egui::Key::Equals => Some(KeyCommand::ZoomIn),
        egui::Key::Minus => Some(KeyCommand::ZoomOut),
        egui::Key::E => Some(KeyCommand::ToggleViewMode),
        _ => None,
    }
}

/// Returns the command of the first bound key pressed this frame. Nothing
/// fires while a text field has keyboard focus.
pub fn handle_keyboard_input(ctx: &egui::Context) -> Option<KeyCommand> {
    if ctx.wants_keyboard_input() {
        return None;
    }
    ctx.input(|i| {
        i.events.iter().find_map(|event| match event {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => command_for_key(*key, *modifiers),
            _ => None,
        })
    })
}
