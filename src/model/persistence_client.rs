//! PostgREST client for the user's playlists and playlist entries

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::BackendSettings;
use crate::log_api_result;

use super::track::Track;

const PLAYLISTS: &str = "playlists";
const ENTRIES: &str = "playlist_songs";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A playlist row holding a denormalized copy of the track
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub playlist_id: String,
    pub song_data: Track,
    pub position: i64,
}

#[derive(Serialize)]
struct NewPlaylist<'a> {
    user_id: &'a str,
    name: &'a str,
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct NewEntry<'a> {
    playlist_id: &'a str,
    song_data: &'a Track,
    position: i64,
}

#[derive(Deserialize)]
struct PositionRow {
    position: i64,
}

#[derive(Deserialize)]
struct BackendError {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

/// CRUD over the two backend tables.
///
/// Every request carries the anon key plus the signed-in user's bearer
/// token, so row-level security scopes results to that user.
#[derive(Clone)]
pub struct PersistenceClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl PersistenceClient {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building backend HTTP client")?;
        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", settings.url.trim_end_matches('/')),
            anon_key: settings.anon_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Called by the session store whenever the access token changes
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.rest_url, name)
    }

    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let req = self
            .http
            .get(self.table(PLAYLISTS))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let result: Result<Vec<Playlist>> =
            async { json_or_error(self.authorized(req).await.send().await?).await }.await;
        log_api_result!("list_playlists", result);
        result
    }

    pub async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        let filter = format!("eq.{id}");
        let req = self
            .http
            .get(self.table(PLAYLISTS))
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let rows: Vec<Playlist> = json_or_error(self.authorized(req).await.send().await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Playlist not found"))
    }

    /// Create a playlist owned by `user_id`; a blank description is stored as null
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Playlist name must not be empty");
        }
        let description = Some(description.trim()).filter(|d| !d.is_empty());

        let req = self
            .http
            .post(self.table(PLAYLISTS))
            .header("Prefer", "return=representation")
            .json(&NewPlaylist {
                user_id,
                name,
                description,
            });
        let result: Result<Playlist> = async {
            let rows: Vec<Playlist> =
                json_or_error(self.authorized(req).await.send().await?).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| anyhow!("Backend returned no playlist row"))
        }
        .await;
        log_api_result!("create_playlist", result);
        if let Ok(playlist) = &result {
            tracing::info!(playlist_id = %playlist.id, name, "Playlist created");
        }
        result
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        let filter = format!("eq.{id}");
        let req = self
            .http
            .delete(self.table(PLAYLISTS))
            .query(&[("id", filter.as_str())]);
        let result: Result<()> =
            async { ok_or_error(self.authorized(req).await.send().await?).await }.await;
        log_api_result!("delete_playlist", result);
        result
    }

    /// Entries of a playlist in ascending `position`
    pub async fn list_entries(&self, playlist_id: &str) -> Result<Vec<PlaylistEntry>> {
        let filter = format!("eq.{playlist_id}");
        let req = self.http.get(self.table(ENTRIES)).query(&[
            ("select", "*"),
            ("playlist_id", filter.as_str()),
            ("order", "position.asc"),
        ]);
        let result: Result<Vec<PlaylistEntry>> =
            async { json_or_error(self.authorized(req).await.send().await?).await }.await;
        log_api_result!("list_entries", result);
        result
    }

    /// Position a new entry takes: one past the current maximum, `0` when empty
    pub async fn next_position(&self, playlist_id: &str) -> Result<i64> {
        let filter = format!("eq.{playlist_id}");
        let req = self.http.get(self.table(ENTRIES)).query(&[
            ("select", "position"),
            ("playlist_id", filter.as_str()),
            ("order", "position.desc"),
            ("limit", "1"),
        ]);
        let rows: Vec<PositionRow> = json_or_error(self.authorized(req).await.send().await?).await?;
        Ok(position_after(&rows))
    }

    /// Append `track` to the end of a playlist.
    ///
    /// The position is read and then written in two requests, so two
    /// concurrent appends can end up sharing a position.
    pub async fn add_entry(&self, playlist_id: &str, track: &Track) -> Result<()> {
        let result: Result<()> = async {
            let position = self.next_position(playlist_id).await?;
            let req = self.http.post(self.table(ENTRIES)).json(&NewEntry {
                playlist_id,
                song_data: track,
                position,
            });
            ok_or_error(self.authorized(req).await.send().await?).await
        }
        .await;
        log_api_result!("add_entry", result);
        result
    }

    pub async fn remove_entry(&self, entry_id: &str) -> Result<()> {
        let filter = format!("eq.{entry_id}");
        let req = self
            .http
            .delete(self.table(ENTRIES))
            .query(&[("id", filter.as_str())]);
        let result: Result<()> =
            async { ok_or_error(self.authorized(req).await.send().await?).await }.await;
        log_api_result!("remove_entry", result);
        result
    }
}

fn position_after(rows: &[PositionRow]) -> i64 {
    rows.iter().map(|r| r.position).max().map_or(0, |max| max + 1)
}

async fn json_or_error<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(describe_failure(status.as_u16(), &body));
    }
    serde_json::from_str(&body).context("decoding backend response")
}

async fn ok_or_error(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(describe_failure(status.as_u16(), &body))
}

/// Prefer the backend's own message over the bare status code
pub(crate) fn describe_failure(status: u16, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<BackendError>(body)
        .ok()
        .and_then(|e| e.message.or(e.error_description).or(e.msg));
    match message {
        Some(message) => anyhow!("{message} (HTTP {status})"),
        None => anyhow!("Backend request failed (HTTP {status})"),
    }
}
