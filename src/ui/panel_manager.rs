//! Panel orchestration and layout management.
//!
//! Lays out the header, status bar, channels and events side panels and the
//! central signal panel, and forwards whatever the user did to the caller.

use crate::app::AppState;
use crate::io::AsyncLoader;
use crate::ui::channels_panel::{self, ChannelsPanelInteraction};
use crate::ui::events_panel::{self, EventsPanelInteraction};
use crate::ui::header::{self, HeaderInteraction};
use crate::ui::input::keyboard_input_handler::{self, KeyCommand};
use crate::ui::signal_panel::{self, SignalPanelInteraction};
use crate::ui::status_bar;

/// Result of panel interactions that need to be handled by the application coordinator.
pub enum PanelInteraction {
    Header(HeaderInteraction),
    Signal(SignalPanelInteraction),
    Events(EventsPanelInteraction),
    Channels(ChannelsPanelInteraction),
    Key(KeyCommand),
}

/// Manages the layout and rendering of all UI panels.
pub struct PanelManager;

impl PanelManager {
    /// Renders all panels in the application window.
    ///
    /// Called once per frame from `eframe::App::update()`. At most one
    /// interaction is reported per frame; panels rendered later win.
    pub fn render_all_panels(
        ctx: &egui::Context,
        state: &mut AppState,
        loader: &AsyncLoader,
    ) -> Option<PanelInteraction> {
        let mut interaction: Option<PanelInteraction> = None;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            if let Some(header_interaction) = header::render_header(ui, state) {
                interaction = Some(PanelInteraction::Header(header_interaction));
            }
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar::render_status_bar(ui, state);
        });

        let side_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(4))
            .fill(ctx.style().visuals.panel_fill);

        egui::SidePanel::left("channels_panel")
            .default_width(state.layout.channels_panel_width())
            .resizable(true)
            .frame(side_frame)
            .show(ctx, |ui| {
                if let Some(channels_interaction) = channels_panel::render_channels_panel(ui, state) {
                    interaction = Some(PanelInteraction::Channels(channels_interaction));
                }
            });

        egui::SidePanel::right("events_panel")
            .default_width(state.layout.events_panel_width())
            .resizable(true)
            .frame(side_frame)
            .show(ctx, |ui| {
                if let Some(events_interaction) = events_panel::render_events_panel(ui, state) {
                    interaction = Some(PanelInteraction::Events(events_interaction));
                }
            });

        let signal_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(4))
            .fill(ctx.style().visuals.panel_fill);

        egui::CentralPanel::default()
            .frame(signal_frame)
            .show(ctx, |ui| {
                if let Some(signal_interaction) = signal_panel::render_signal_panel(ui, ctx, state, loader) {
                    interaction = Some(PanelInteraction::Signal(signal_interaction));
                }
            });

        if interaction.is_none() && !state.session.is_empty() {
            interaction = keyboard_input_handler::handle_keyboard_input(ctx).map(PanelInteraction::Key);
        }

        interaction
    }
}
