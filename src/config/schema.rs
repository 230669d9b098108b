use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/redtune/config.toml` or `~/.config/redtune/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `REDTUNE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub backend: BackendSettings,
    pub storage: StorageSettings,
    pub player: PlayerSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// YouTube Data API v3 key.
    pub api_key: String,
    pub base_url: String,
    /// Region used for the trending chart.
    pub region_code: String,
    /// Appended to every free-text search to bias results towards music.
    pub search_suffix: String,
    /// Video category filter ("10" is Music).
    pub category_id: String,
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            region_code: "US".to_string(),
            search_suffix: " official music video".to_string(),
            category_id: "10".to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the liked-songs store and the cached refresh token.
    pub cache_dir: PathBuf,
    /// Directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            log_dir: PathBuf::from(".logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// External player executable used as the playback surface.
    pub command: String,
    /// Arguments placed before the media locator.
    pub args: Vec<String>,
    /// Prefix turned into a playable URL by appending the remote media id.
    pub watch_url: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--no-video".to_string(), "--really-quiet".to_string()],
            watch_url: "https://www.youtube.com/watch?v=".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Max results for a free-text search.
    pub search_limit: u32,
    /// Max results in the "Trending Now" row.
    pub trending_limit: u32,
    /// Max results in each recommendation row on the home view.
    pub row_limit: u32,
    /// Queries shorter than this clear the results instead of searching.
    pub min_query_len: usize,
    pub new_releases_query: String,
    pub made_for_you_query: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            search_limit: 24,
            trending_limit: 18,
            row_limit: 12,
            min_query_len: 3,
            new_releases_query: "new music 2024".to_string(),
            made_for_you_query: "top hits 2024".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions treated as audio on local import (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
                "opus".into(),
            ],
        }
    }
}
