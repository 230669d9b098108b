use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::config::PlayerSettings;
use crate::model::{SourceRef, Track};

const DEVICE_NAME: &str = "redtune";

/// What the playback surface reports back about a track it was given.
///
/// `generation` identifies the `play` call that produced the event, so a
/// restart of the same track can tell old and new processes apart.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The player ran to the end on its own
    Finished { track_id: String, generation: u64 },
    /// The player could not be started or could not resolve the source
    Failed {
        track_id: String,
        generation: u64,
        reason: String,
    },
}

impl PlayerEvent {
    pub fn track_id(&self) -> &str {
        match self {
            PlayerEvent::Finished { track_id, .. } | PlayerEvent::Failed { track_id, .. } => track_id,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            PlayerEvent::Finished { generation, .. } | PlayerEvent::Failed { generation, .. } => {
                *generation
            }
        }
    }
}

pub type PlayerEventChannel = mpsc::UnboundedReceiver<PlayerEvent>;

struct Running {
    track_id: String,
    generation: u64,
    stop: oneshot::Sender<()>,
}

/// Playback surface backed by an external player process.
///
/// One process per playing track. Pausing kills it and resuming starts
/// the track over from the beginning.
pub struct AudioBackend {
    settings: PlayerSettings,
    device_name: String,
    events: mpsc::UnboundedSender<PlayerEvent>,
    running: Option<Running>,
    /// Bumped on every start and stop; events from older values are stale
    generation: u64,
}

impl AudioBackend {
    pub fn new(settings: PlayerSettings) -> (Self, PlayerEventChannel) {
        let (events, rx) = mpsc::unbounded_channel();
        let backend = Self {
            settings,
            device_name: Self::get_device_name(),
            events,
            running: None,
            generation: 0,
        };
        (backend, rx)
    }

    fn get_device_name() -> String {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        format!("{}@{}", DEVICE_NAME, hostname)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn playing_track_id(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.track_id.as_str())
    }

    /// Generation of the most recent `play`, or of the last `stop`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `event` comes from the latest `play` and nothing has stopped it since
    pub fn is_latest(&self, event: &PlayerEvent) -> bool {
        event.generation() == self.generation
    }

    /// The argument handed to the player for `track`
    pub fn locator(&self, track: &Track) -> String {
        match &track.source_ref {
            SourceRef::Remote(id) => format!("{}{}", self.settings.watch_url, id),
            SourceRef::Local(path) => path.display().to_string(),
        }
    }

    /// Bring the surface in line with the playback queue.
    ///
    /// Keeps a process that is already playing `current`, starts one when
    /// playback should run and none is, stops it otherwise.
    pub fn apply(&mut self, current: Option<&Track>, is_playing: bool) {
        match current {
            Some(track) if is_playing => {
                if self.playing_track_id() != Some(track.id.as_str()) {
                    self.play(track);
                }
            }
            _ => self.stop(),
        }
    }

    /// Start `track` from the beginning, replacing whatever is playing
    pub fn play(&mut self, track: &Track) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;

        if let SourceRef::Local(path) = &track.source_ref {
            if !path.exists() {
                self.report(PlayerEvent::Failed {
                    track_id: track.id.clone(),
                    generation,
                    reason: format!("File not found: {}", path.display()),
                });
                return;
            }
        }

        let locator = self.locator(track);
        tracing::info!(track_id = %track.id, locator = %locator, "Starting player");

        let spawned = Command::new(&self.settings.command)
            .args(&self.settings.args)
            .arg(&locator)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, command = %self.settings.command, "Failed to spawn player");
                self.report(PlayerEvent::Failed {
                    track_id: track.id.clone(),
                    generation,
                    reason: format!("Could not start {}: {}", self.settings.command, e),
                });
                return;
            }
        };

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let events = self.events.clone();
        let track_id = track.id.clone();
        self.running = Some(Running {
            track_id: track_id.clone(),
            generation,
            stop: stop_tx,
        });

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    let event = match status {
                        Ok(status) => exit_event(track_id, generation, status),
                        Err(e) => PlayerEvent::Failed {
                            track_id,
                            generation,
                            reason: e.to_string(),
                        },
                    };
                    let _ = events.send(event);
                }
                _ = &mut stop_rx => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(error = %e, "Failed to kill player process");
                    }
                }
            }
        });
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            tracing::debug!(track_id = %running.track_id, generation = running.generation, "Stopping player");
            let _ = running.stop.send(());
            self.generation += 1;
        }
    }

    /// Drop the bookkeeping for the process of `generation` once it has exited
    pub fn mark_exited(&mut self, generation: u64) {
        if self.running.as_ref().is_some_and(|r| r.generation == generation) {
            self.running = None;
        }
    }

    fn report(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn exit_event(track_id: String, generation: u64, status: ExitStatus) -> PlayerEvent {
    if status.success() {
        PlayerEvent::Finished { track_id, generation }
    } else {
        PlayerEvent::Failed {
            track_id,
            generation,
            reason: match status.code() {
                Some(code) => format!("Player exited with status {}", code),
                None => "Player was terminated".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(command: &str, args: &[&str]) -> PlayerSettings {
        PlayerSettings {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..PlayerSettings::default()
        }
    }

    fn remote(id: &str) -> Track {
        Track {
            id: id.into(),
            title: id.into(),
            artist: "a".into(),
            thumbnail_url: String::new(),
            duration_label: "1:00".into(),
            source_ref: SourceRef::Remote(id.into()),
        }
    }

    #[test]
    fn locators_follow_the_source_kind() {
        let (backend, _rx) = AudioBackend::new(PlayerSettings::default());
        assert_eq!(backend.locator(&remote("abc")), "https://www.youtube.com/watch?v=abc");

        let mut local = remote("local-1-0");
        local.source_ref = SourceRef::Local(PathBuf::from("/music/a.mp3"));
        assert_eq!(backend.locator(&local), "/music/a.mp3");
        assert!(backend.device_name().starts_with("redtune@"));
    }

    #[tokio::test]
    async fn missing_local_file_is_reported_as_failure() {
        let (mut backend, mut rx) = AudioBackend::new(PlayerSettings::default());
        let mut local = remote("local-1-0");
        local.source_ref = SourceRef::Local(PathBuf::from("/definitely/not/here.mp3"));

        backend.apply(Some(&local), true);
        match rx.recv().await {
            Some(PlayerEvent::Failed { track_id, generation, reason }) => {
                assert_eq!(track_id, "local-1-0");
                assert_eq!(generation, backend.generation());
                assert!(reason.contains("not found"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(backend.playing_track_id().is_none());
    }

    #[tokio::test]
    async fn unknown_player_command_is_reported_as_failure() {
        let (mut backend, mut rx) = AudioBackend::new(settings("redtune-no-such-player", &[]));
        backend.play(&remote("abc"));
        assert!(matches!(rx.recv().await, Some(PlayerEvent::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_exit_reports_finished() {
        let (mut backend, mut rx) = AudioBackend::new(settings("true", &[]));
        backend.apply(Some(&remote("abc")), true);
        assert_eq!(backend.playing_track_id(), Some("abc"));
        let generation = backend.generation();
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            PlayerEvent::Finished { track_id: "abc".into(), generation }
        );
        assert!(backend.is_latest(&event));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn restart_makes_earlier_exit_stale() {
        let (mut backend, mut rx) = AudioBackend::new(settings("true", &[]));
        let track = remote("abc");
        backend.play(&track);
        let first = rx.recv().await.unwrap();

        backend.play(&track);
        assert!(!backend.is_latest(&first));

        // the old process must not clear the record of the new one
        backend.mark_exited(first.generation());
        assert_eq!(backend.playing_track_id(), Some("abc"));
        assert!(backend.is_latest(&rx.recv().await.unwrap()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pause_stops_without_reporting() {
        // the locator lands in $0 and is ignored
        let (mut backend, mut rx) = AudioBackend::new(settings("sh", &["-c", "sleep 30"]));
        let track = remote("abc");
        backend.apply(Some(&track), true);
        // already playing this track: no restart
        backend.apply(Some(&track), true);
        backend.apply(Some(&track), false);
        assert!(backend.playing_track_id().is_none());

        let waited = tokio::time::timeout(std::time::Duration::from_millis(300), rx.recv()).await;
        assert!(waited.is_err(), "a stopped player sends no event");
    }
}
