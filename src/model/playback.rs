//! Now-playing display state

use super::track::Track;

/// Assumed length when a track carries no usable duration
pub const FALLBACK_DURATION_SECS: u32 = 180;

/// Cosmetic progress counter driven by a one-second tick.
///
/// Never consulted by the playback queue: reaching the end of the
/// duration does not advance anything, it only stops the counter.
#[derive(Clone, Debug, Default)]
pub struct PlaybackTiming {
    pub elapsed_secs: u32,
    pub duration_secs: u32,
}

impl PlaybackTiming {
    pub fn restart(&mut self, track: Option<&Track>) {
        self.elapsed_secs = 0;
        self.duration_secs = track
            .and_then(|t| t.duration_secs())
            .unwrap_or(FALLBACK_DURATION_SECS);
    }

    pub fn tick(&mut self, is_playing: bool) {
        if is_playing && self.elapsed_secs < self.duration_secs {
            self.elapsed_secs += 1;
        }
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub is_playing: bool,
    pub liked: bool,
    pub queue_len: usize,
    pub elapsed_secs: u32,
    pub duration_secs: u32,
    pub device_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::SourceRef;

    fn track(duration: &str) -> Track {
        Track {
            id: "a".into(),
            title: "A".into(),
            artist: "B".into(),
            thumbnail_url: String::new(),
            duration_label: duration.into(),
            source_ref: SourceRef::Remote("a".into()),
        }
    }

    #[test]
    fn unknown_duration_falls_back_to_three_minutes() {
        let mut timing = PlaybackTiming::default();
        timing.restart(Some(&track("0:00")));
        assert_eq!(timing.duration_secs, FALLBACK_DURATION_SECS);
        timing.restart(Some(&track("4:13")));
        assert_eq!(timing.duration_secs, 253);
        timing.restart(None);
        assert_eq!(timing.duration_secs, FALLBACK_DURATION_SECS);
    }

    #[test]
    fn tick_only_counts_while_playing_and_stops_at_end() {
        let mut timing = PlaybackTiming::default();
        timing.restart(Some(&track("0:02")));

        timing.tick(false);
        assert_eq!(timing.elapsed_secs, 0);
        for _ in 0..5 {
            timing.tick(true);
        }
        assert_eq!(timing.elapsed_secs, 2);
    }
}
