//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists, popups)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Now-playing bar
//! - `overlays`: Modal overlays (notification, forms, playlist picker, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        content_state: &ContentState,
        liked: &HashSet<String>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + account + device
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Now-playing bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, &playback.device_name);

        // Middle: Sidebar (Library + Playlists) and Main Content
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Playlists)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state);

        let current_id = playback.track.as_ref().map(|t| t.id.as_str());
        content::render_main_content(frame, main_chunks[1], ui_state, content_state, current_id, liked);

        progress::render_progress_bar(frame, chunks[2], playback);

        if ui_state.show_playlist_picker {
            overlays::render_playlist_picker(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        if let Some(form) = &ui_state.form {
            overlays::render_form(frame, form);
        }

        // Drawn last so it stays visible over forms
        if ui_state.notification.is_some() {
            overlays::render_notification(frame, ui_state);
        }
    }
}
