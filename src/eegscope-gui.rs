//! EEG/MEG Recording Viewer GUI Application
//!
//! Interactive viewer for multichannel electrophysiology recordings built on
//! egui. The viewer features:
//! - Several recordings shown side by side on one shared time scale
//! - Paged browsing and event-focused browsing across all recordings
//! - Event editing (add, delete, recode, visibility, accept/reject)
//! - Overlay groups drawing channels of different recordings on one row
//! - Project files restoring the whole session
//! - Asynchronous file loading with a loading indicator
//!
//! The application is built with a modular architecture:
//! - `app/` - Application state, coordination and settings persistence
//! - `domain/` - Coordinate conversions and trace decimation
//! - `presentation/` - Colours (separated from domain logic)
//! - `io/` - Background decoding and virtual recording generation
//! - `utils/` - Formatting helpers
//! - `ui/` - UI panel rendering, interaction and keyboard input
//! - `rendering/` - Low-level trace, marker and axis drawing
//! - `state/` - GUI state: samples, selection, layout

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use std::path::PathBuf;

mod utils;
mod domain;
mod presentation;
mod io;
mod app;
mod rendering;
mod ui;
mod state;

use app::{AppState, ApplicationCoordinator, SettingsCoordinator, ZOOM_STEP};
use io::AsyncLoader;
use ui::channels_panel::ChannelsPanelInteraction;
use ui::events_panel::EventsPanelInteraction;
use ui::header::HeaderInteraction;
use ui::input::keyboard_input_handler::KeyCommand;
use ui::panel_manager::{PanelInteraction, PanelManager};
use ui::signal_panel::SignalPanelInteraction;

/// Main application entry point that initializes and launches the viewer GUI.
fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A recording (or a .eegp project) may be passed on the command line
    let initial_file = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("EEGScope"),
        ..Default::default()
    };

    eframe::run_native(
        "EEGScope",
        options,
        Box::new(move |cc| Ok(Box::new(EegScopeApp::new(cc, initial_file)))),
    )
}

/// The main viewer application.
///
/// Delegates most functionality to coordinators:
/// - `ApplicationCoordinator` handles loading, projects, paging and event editing
/// - `SettingsCoordinator` handles preference persistence
/// - `PanelManager` handles UI panel layout and rendering
struct EegScopeApp {
    /// Centralized application state
    state: AppState,

    /// Asynchronous file loader
    loader: AsyncLoader,

    /// Optional file to load on first frame
    pending_file_load: Option<PathBuf>,
}

impl Default for EegScopeApp {
    fn default() -> Self {
        Self {
            state: AppState::new(),
            loader: AsyncLoader::new(),
            pending_file_load: None,
        }
    }
}

impl EegScopeApp {
    /// Creates a new viewer instance with preferences loaded from persistent storage.
    /// Optionally accepts an initial recording or project to open on startup.
    fn new(cc: &eframe::CreationContext, initial_file: Option<PathBuf>) -> Self {
        let (settings, layout) = SettingsCoordinator::load_viewer_settings(cc.storage);

        Self {
            state: AppState::with_settings(settings, layout),
            loader: AsyncLoader::new(),
            pending_file_load: initial_file,
        }
    }

    fn open_path(&mut self, path: PathBuf, ctx: &egui::Context) {
        let is_project = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("eegp"));
        if is_project {
            ApplicationCoordinator::open_project(&mut self.state, &path);
        } else {
            ApplicationCoordinator::open_file(&mut self.state, &mut self.loader, path, ctx);
        }
    }

    /// Handles panel interactions by delegating to ApplicationCoordinator.
    fn handle_panel_interaction(&mut self, interaction: PanelInteraction, ctx: &egui::Context) {
        match interaction {
            PanelInteraction::Header(header) => self.handle_header(header, ctx),
            PanelInteraction::Signal(signal) => self.handle_signal(signal),
            PanelInteraction::Events(events) => self.handle_events(events),
            PanelInteraction::Channels(channels) => self.handle_channels(channels),
            PanelInteraction::Key(command) => self.handle_key(command),
        }
    }

    fn handle_header(&mut self, interaction: HeaderInteraction, ctx: &egui::Context) {
        let state = &mut self.state;
        match interaction {
            HeaderInteraction::OpenFileRequested(path) => self.open_path(path, ctx),
            HeaderInteraction::OpenVirtualRecordingRequested => {
                ApplicationCoordinator::open_virtual_recording(state, &mut self.loader);
            }
            HeaderInteraction::OpenProjectRequested(path) => {
                ApplicationCoordinator::open_project(state, &path);
            }
            HeaderInteraction::SaveProjectRequested(path) => {
                ApplicationCoordinator::save_project(state, &path);
            }
            HeaderInteraction::TimeScaleSelected(ms) => ApplicationCoordinator::set_time_scale(state, ms),
            HeaderInteraction::PageStep(direction) => ApplicationCoordinator::step_page(state, direction),
            HeaderInteraction::PageRequested(page) => ApplicationCoordinator::goto_page(state, page),
            HeaderInteraction::ViewModeToggled => ApplicationCoordinator::toggle_view_mode(state),
            HeaderInteraction::EventStep(direction) => ApplicationCoordinator::step_event(state, direction),
        }
    }

    fn handle_signal(&mut self, interaction: SignalPanelInteraction) {
        let state = &mut self.state;
        match interaction {
            SignalPanelInteraction::AddEventRequested { recording, sample } => {
                ApplicationCoordinator::add_event_at(state, recording, sample);
            }
            SignalPanelInteraction::ToggleAcceptRequested { recording, event_index } => {
                ApplicationCoordinator::toggle_accept(state, recording, event_index);
            }
            SignalPanelInteraction::RecordingSelected(id) => state.selection.select_recording(Some(id)),
            SignalPanelInteraction::CloseRequested(id) => ApplicationCoordinator::unload_recording(state, id),
        }
    }

    fn handle_events(&mut self, interaction: EventsPanelInteraction) {
        let state = &mut self.state;
        match interaction {
            EventsPanelInteraction::RecordingSelected(id) => state.selection.select_recording(Some(id)),
            EventsPanelInteraction::TrackSelected { recording, index } => {
                ApplicationCoordinator::select_event_track(state, recording, index);
            }
            EventsPanelInteraction::CodeVisibilityChanged { recording, code, visible } => {
                ApplicationCoordinator::set_code_visibility(state, recording, code, visible);
            }
            EventsPanelInteraction::CodeBrowsabilityChanged { recording, code, browsable } => {
                ApplicationCoordinator::set_code_browsability(state, recording, code, browsable);
            }
            EventsPanelInteraction::DeleteSelectedCodes => ApplicationCoordinator::delete_selected_codes(state),
            EventsPanelInteraction::RecodeSelectedCodes => ApplicationCoordinator::recode_selected_codes(state),
            EventsPanelInteraction::OpenEventFileRequested { recording, path } => {
                ApplicationCoordinator::open_event_file(state, recording, &path);
            }
            EventsPanelInteraction::SaveEventsRequested { recording, path } => {
                ApplicationCoordinator::save_events(state, recording, &path);
            }
        }
    }

    fn handle_channels(&mut self, interaction: ChannelsPanelInteraction) {
        let state = &mut self.state;
        match interaction {
            ChannelsPanelInteraction::DisplayedChanged { recording, channel, displayed } => {
                ApplicationCoordinator::set_channel_displayed(state, recording, channel, displayed);
            }
            ChannelsPanelInteraction::AmplitudeChanged { recording, channel, amplitude_max } => {
                ApplicationCoordinator::set_channel_amplitude(state, recording, channel, amplitude_max);
            }
            ChannelsPanelInteraction::AllDisplayed { recording, displayed } => {
                ApplicationCoordinator::set_all_channels_displayed(state, recording, displayed);
            }
            ChannelsPanelInteraction::CreateOverlayRequested => ApplicationCoordinator::create_overlay(state),
            ChannelsPanelInteraction::AddToOverlay(member) => ApplicationCoordinator::add_to_overlay(state, member),
            ChannelsPanelInteraction::RemoveOverlay(name) => ApplicationCoordinator::remove_overlay(state, &name),
        }
    }

    fn handle_key(&mut self, command: KeyCommand) {
        let state = &mut self.state;
        match command {
            KeyCommand::Page(direction) => ApplicationCoordinator::step_page(state, direction),
            KeyCommand::Event(direction) => ApplicationCoordinator::step_event(state, direction),
            KeyCommand::ZoomIn => ApplicationCoordinator::zoom(state, 1.0 / ZOOM_STEP),
            KeyCommand::ZoomOut => ApplicationCoordinator::zoom(state, ZOOM_STEP),
            KeyCommand::ToggleViewMode => ApplicationCoordinator::toggle_view_mode(state),
        }
    }
}

impl eframe::App for EegScopeApp {
    /// Called when the app is being shut down - ensures preferences are saved.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        SettingsCoordinator::save_viewer_settings(storage, &self.state.settings, &self.state.layout);
    }

    /// Main update loop:
    /// 1. Check for async loading completion
    /// 2. Open the command-line file on the first frame
    /// 3. Render all panels via PanelManager
    /// 4. Handle panel interactions
    /// 5. Drain the session's change notifications
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ApplicationCoordinator::check_loading_completion(&mut self.state, &mut self.loader);

        if let Some(path) = self.pending_file_load.take() {
            self.open_path(path, ctx);
        }

        if let Some(interaction) = PanelManager::render_all_panels(ctx, &mut self.state, &self.loader) {
            self.handle_panel_interaction(interaction, ctx);
        }

        if ApplicationCoordinator::process_view_changes(&mut self.state) {
            ctx.request_repaint();
        }
    }
}
