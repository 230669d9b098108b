//! Track value type shared by the catalog, the backend records and the queue

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const LOCAL_PREFIX: &str = "file://";

/// Where the playback surface finds the audio for a track
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceRef {
    /// Remote media id (a YouTube video id)
    Remote(String),
    /// Locally imported file
    Local(PathBuf),
}

impl From<String> for SourceRef {
    fn from(raw: String) -> Self {
        match raw.strip_prefix(LOCAL_PREFIX) {
            Some(path) => SourceRef::Local(PathBuf::from(path)),
            None => SourceRef::Remote(raw),
        }
    }
}

impl From<SourceRef> for String {
    fn from(source: SourceRef) -> Self {
        match source {
            SourceRef::Remote(id) => id,
            SourceRef::Local(path) => format!("{}{}", LOCAL_PREFIX, path.display()),
        }
    }
}

/// An immutable playable media descriptor.
///
/// Serializes to the same denormalized song shape the backend keeps in
/// `playlist_songs.song_data`, so a track read back from a playlist entry
/// is indistinguishable from the one that was stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
    /// Human-readable clock string such as `4:13`, not seconds
    #[serde(rename = "duration", default = "zero_label")]
    pub duration_label: String,
    #[serde(rename = "videoId")]
    pub source_ref: SourceRef,
}

fn zero_label() -> String {
    ZERO_DURATION.to_string()
}

pub const ZERO_DURATION: &str = "0:00";

impl Track {
    /// Duration in whole seconds parsed back from the clock label.
    ///
    /// Returns `None` for `0:00` and for anything that is not `M:SS` or `H:MM:SS`.
    pub fn duration_secs(&self) -> Option<u32> {
        parse_clock_label(&self.duration_label).filter(|secs| *secs > 0)
    }
}

/// Parse `M:SS` / `H:MM:SS` into seconds
pub fn parse_clock_label(label: &str) -> Option<u32> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let mut total: u32 = 0;
    for part in parts {
        let value: u32 = part.parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

/// Format seconds as `M:SS`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
