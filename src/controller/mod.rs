//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback surface.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Play/pause/skip, queue and like actions
//! - `navigation`: Library, playlist, search and session flows
//! - `player_events`: Playback surface events and the progress tick

mod input;
mod playback;
mod navigation;
mod player_events;

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::config::{LibrarySettings, UiSettings};
use crate::model::{AppModel, Track};

/// Lock order is always model before audio backend.
#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<AudioBackend>>,
    ui: Arc<UiSettings>,
    library: Arc<LibrarySettings>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        audio_backend: Arc<Mutex<AudioBackend>>,
        ui: UiSettings,
        library: LibrarySettings,
    ) -> Self {
        Self {
            model,
            audio_backend,
            ui: Arc::new(ui),
            library: Arc::new(library),
        }
    }

    /// Run a network-bound action off the input path
    pub(crate) fn spawn_task<F, Fut>(&self, action: F)
    where
        F: FnOnce(AppController) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(action(self.clone()));
    }

    /// Bring the playback surface in line with the queue's current state
    pub(crate) async fn sync_surface(&self) {
        let (current, is_playing) = self.model.lock().await.playback_snapshot().await;
        self.audio_backend
            .lock()
            .await
            .apply(current.as_ref(), is_playing);
    }

    /// Start `track` on the surface from the beginning
    pub(crate) async fn start_on_surface(&self, track: &Track) {
        self.audio_backend.lock().await.play(track);
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        if error_str.contains("HTTP 401") {
            "Session expired. Please sign in again.".to_string()
        } else if error_str.contains("HTTP 403") {
            "Action forbidden. You can only change your own playlists.".to_string()
        } else if error_str.contains("HTTP 404") {
            "Not found. It may have been deleted.".to_string()
        } else if error_str.contains("HTTP 429") {
            "Rate limited. Please wait a moment.".to_string()
        } else if error_str.contains("error sending request") {
            "Could not reach the server. Check your connection.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }
}
