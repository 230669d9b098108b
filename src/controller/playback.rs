//! Playback control methods

use crate::model::{SelectedItem, Track};

use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        let model = self.model.lock().await;
        if model.current_track().await.is_none() {
            model.notify("Nothing to play. Pick a track first.".to_string()).await;
            return;
        }

        let is_playing = model.is_playing().await;
        tracing::debug!(is_playing, "Toggling playback");
        if is_playing {
            model.pause().await;
        } else {
            model.resume().await;
        }
        drop(model);

        self.sync_surface().await;
        tracing::info!(action = if is_playing { "paused" } else { "resumed" }, "Playback toggled");
    }

    /// Play `track` now, from the beginning
    pub async fn play(&self, track: Track) {
        tracing::info!(track_id = %track.id, title = %track.title, "Playing track");
        let model = self.model.lock().await;
        model.play_track(track.clone()).await;
        drop(model);

        self.start_on_surface(&track).await;
        self.refresh_queue_if_visible().await;
    }

    pub async fn play_selected(&self, item: SelectedItem) {
        self.play(item.track().clone()).await;
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        let model = self.model.lock().await;
        if !model.advance().await {
            tracing::debug!("Queue is empty, nothing to skip to");
            return;
        }
        let current = model.current_track().await;
        drop(model);

        if let Some(track) = current {
            self.start_on_surface(&track).await;
        }
        self.refresh_queue_if_visible().await;
    }

    /// Jumps to the last queued track while more than one is queued; it
    /// does not walk back through play history.
    pub async fn previous_track(&self) {
        let model = self.model.lock().await;
        if !model.retreat().await {
            return;
        }
        let current = model.current_track().await;
        drop(model);

        if let Some(track) = current {
            self.start_on_surface(&track).await;
        }
        self.refresh_queue_if_visible().await;
    }

    pub async fn add_to_queue(&self, track: Track) {
        let model = self.model.lock().await;
        tracing::info!(track_id = %track.id, "Adding track to queue");
        let title = track.title.clone();
        model.enqueue(track).await;
        model.notify(format!("Added to queue: {}", title)).await;
        drop(model);
        self.refresh_queue_if_visible().await;
    }

    /// Remove the selected row from the queue view
    pub async fn remove_queued(&self, index: usize) {
        let model = self.model.lock().await;
        if let Some(track) = model.remove_from_queue(index).await {
            tracing::info!(track_id = %track.id, index, "Removed track from queue");
            model.notify(format!("Removed from queue: {}", track.title)).await;
        }
        model.update_queue_if_visible().await;
    }

    /// Like or unlike `track`, or the current track when none is given
    pub async fn toggle_liked_track(&self, track: Option<Track>) {
        let model = self.model.lock().await;
        let track = match track {
            Some(track) => track,
            None => match model.current_track().await {
                Some(track) => track,
                None => return,
            },
        };

        let liked = model.toggle_like(&track).await;
        let message = if liked {
            format!("Added to Liked Songs: {}", track.title)
        } else {
            format!("Removed from Liked Songs: {}", track.title)
        };
        model.notify(message).await;
        model.refresh_liked_if_visible().await;
    }

    pub async fn refresh_queue_if_visible(&self) {
        let model = self.model.lock().await;
        model.update_queue_if_visible().await;
    }
}

// the test player is `sh`
#[cfg(all(test, unix))]
mod tests {
    use super::super::tests::{controller, track};
    use crate::model::ContentView;

    #[tokio::test]
    async fn toggle_without_current_track_only_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.toggle_playback().await;
        let model = c.model.lock().await;
        assert!(!model.is_playing().await);
        assert!(model.has_notification().await);
        assert!(c.audio_backend.lock().await.playing_track_id().is_none());
    }

    #[tokio::test]
    async fn pause_stops_surface_and_resume_restarts_it() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.play(track("a")).await;
        assert_eq!(c.audio_backend.lock().await.playing_track_id(), Some("a"));

        c.toggle_playback().await;
        assert!(!c.model.lock().await.is_playing().await);
        assert!(c.audio_backend.lock().await.playing_track_id().is_none());

        c.toggle_playback().await;
        assert!(c.model.lock().await.is_playing().await);
        assert_eq!(c.audio_backend.lock().await.playing_track_id(), Some("a"));
    }

    #[tokio::test]
    async fn next_on_empty_queue_leaves_current_track_playing() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.play(track("a")).await;
        c.next_track().await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "a");
        assert!(model.is_playing().await);
    }

    #[tokio::test]
    async fn skipping_moves_surface_to_queue_head() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.add_to_queue(track("b")).await;
        c.add_to_queue(track("c")).await;
        c.next_track().await;

        assert_eq!(c.model.lock().await.current_track().await.unwrap().id, "b");
        assert_eq!(c.audio_backend.lock().await.playing_track_id(), Some("b"));

        // one queued entry left: previous does nothing
        c.previous_track().await;
        assert_eq!(c.model.lock().await.current_track().await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn liking_updates_open_liked_view() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        {
            let model = c.model.lock().await;
            model.set_liked_songs(Vec::new()).await;
        }
        c.toggle_liked_track(Some(track("a"))).await;

        match c.model.lock().await.get_content_state().await.view {
            ContentView::LikedSongs { tracks, .. } => assert_eq!(tracks.len(), 1),
            other => panic!("unexpected view {other:?}"),
        }

        // no current track and no selection: nothing to like
        c.toggle_liked_track(None).await;
        assert!(c.model.lock().await.is_liked("a").await);
    }

    #[tokio::test]
    async fn removing_from_queue_view_updates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.add_to_queue(track("a")).await;
        c.add_to_queue(track("b")).await;
        c.show_queue().await;
        c.remove_queued(0).await;

        match c.model.lock().await.get_content_state().await.view {
            ContentView::Queue { queue, .. } => {
                assert_eq!(queue.len(), 1);
                assert_eq!(queue[0].id, "b");
            }
            other => panic!("unexpected view {other:?}"),
        }
    }
}
