//! Listener for playback surface events, plus the progress tick

use std::time::Duration;

use crate::audio::{PlayerEvent, PlayerEventChannel};
use super::AppController;

const PROGRESS_TICK: Duration = Duration::from_secs(1);

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.handle_player_event(event).await;
            }
        });
    }

    pub(crate) async fn handle_player_event(&self, event: PlayerEvent) {
        let model = self.model.lock().await;
        let current_id = model.current_track().await.map(|t| t.id);

        {
            let mut backend = self.audio_backend.lock().await;
            // From a process replaced, restarted or stopped since it was started
            if !backend.is_latest(&event) || current_id.as_deref() != Some(event.track_id()) {
                tracing::debug!(
                    track_id = event.track_id(),
                    generation = event.generation(),
                    "Ignoring event from a player that is no longer current"
                );
                return;
            }
            backend.mark_exited(event.generation());
        }

        match event {
            PlayerEvent::Finished { track_id, .. } => {
                tracing::info!(track_id, "PlayerEvent::Finished");
                if !model.is_playing().await {
                    tracing::debug!("Playback paused, not advancing");
                    return;
                }

                if !model.advance().await {
                    // Queue exhausted: the surface goes idle, state is left as is
                    tracing::debug!("Queue empty after track finished");
                    return;
                }
                let next = model.current_track().await;
                drop(model);

                if let Some(track) = next {
                    self.start_on_surface(&track).await;
                }
                self.refresh_queue_if_visible().await;
            }
            PlayerEvent::Failed { track_id, reason, .. } => {
                tracing::warn!(track_id, reason = %reason, "PlayerEvent::Failed");
                model.set_error(format!("Playback failed: {}", reason)).await;
            }
        }
    }

    /// Advance the cosmetic elapsed counter once a second while playing
    pub fn start_progress_ticker(&self) {
        let model = self.model.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_TICK);
            interval.tick().await;
            loop {
                interval.tick().await;
                let model = model.lock().await;
                if model.should_quit().await {
                    break;
                }
                model.tick_progress().await;
            }
        });
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::super::tests::{controller, track};
    use super::super::AppController;
    use crate::audio::PlayerEvent;

    /// A finish event from the player `c` started most recently
    async fn finished(c: &AppController, id: &str) -> PlayerEvent {
        PlayerEvent::Finished {
            track_id: id.to_string(),
            generation: c.audio_backend.lock().await.generation(),
        }
    }

    #[tokio::test]
    async fn finished_track_advances_to_queue_head() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;
        c.add_to_queue(track("b")).await;

        let event = finished(&c, "a").await;
        c.handle_player_event(event).await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "b");
        assert!(model.queue_snapshot().await.1.is_empty());
        assert_eq!(c.audio_backend.lock().await.playing_track_id(), Some("b"));
    }

    #[tokio::test]
    async fn finished_with_empty_queue_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;

        let event = finished(&c, "a").await;
        c.handle_player_event(event).await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "a");
        assert!(model.is_playing().await);
        assert!(c.audio_backend.lock().await.playing_track_id().is_none());
    }

    #[tokio::test]
    async fn stale_finish_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;
        let stale = finished(&c, "a").await;
        c.add_to_queue(track("b")).await;
        c.play(track("c")).await;

        c.handle_player_event(stale).await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "c");
        assert_eq!(model.queue_snapshot().await.1.len(), 1);
    }

    #[tokio::test]
    async fn failure_is_reported_without_changing_playback_state() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;
        c.add_to_queue(track("b")).await;

        let generation = c.audio_backend.lock().await.generation();
        c.handle_player_event(PlayerEvent::Failed {
            track_id: "a".to_string(),
            generation,
            reason: "no such video".to_string(),
        })
        .await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "a");
        assert_eq!(model.queue_snapshot().await.1.len(), 1);
        assert!(model.has_notification().await);
    }

    #[tokio::test]
    async fn exit_of_replaced_process_does_not_skip_restarted_track() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;
        let earlier = finished(&c, "a").await;
        c.add_to_queue(track("b")).await;
        c.play(track("a")).await;

        c.handle_player_event(earlier).await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "a");
        assert_eq!(model.queue_snapshot().await.1.len(), 1);
        assert_eq!(c.audio_backend.lock().await.playing_track_id(), Some("a"));
    }

    #[tokio::test]
    async fn finish_racing_a_pause_keeps_playback_paused() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.play(track("a")).await;
        let in_flight = finished(&c, "a").await;
        c.add_to_queue(track("b")).await;
        c.toggle_playback().await;

        c.handle_player_event(in_flight).await;

        let model = c.model.lock().await;
        assert_eq!(model.current_track().await.unwrap().id, "a");
        assert!(!model.is_playing().await);
        assert_eq!(model.queue_snapshot().await.1.len(), 1);
        assert!(c.audio_backend.lock().await.playing_track_id().is_none());
    }
}
