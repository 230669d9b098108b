//! YouTube Data API v3 client that turns videos into [`Track`] values

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::instrument;

use crate::config::CatalogSettings;

use super::track::{SourceRef, Track, ZERO_DURATION};

/// The API rejects `maxResults` above this
const MAX_RESULTS_CAP: usize = 50;

#[derive(Deserialize, Debug)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// `search` returns `{"kind": ..., "videoId": ...}`, `videos` a bare string
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum VideoIdField {
    Plain(String),
    Nested {
        #[serde(rename = "videoId", default)]
        video_id: Option<String>,
    },
}

impl VideoIdField {
    fn as_id(&self) -> Option<&str> {
        match self {
            VideoIdField::Plain(id) => Some(id),
            VideoIdField::Nested { video_id } => video_id.as_deref(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct VideoItem {
    id: VideoIdField,
    snippet: Snippet,
    #[serde(rename = "contentDetails", default)]
    content_details: Option<ContentDetails>,
}

#[derive(Deserialize, Debug)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Debug, Default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize, Debug)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize, Debug)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Deserialize, Debug)]
struct DurationItem {
    id: String,
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

/// Catalog search and trending lookups.
///
/// The plain methods never fail: any network or parse error is logged and
/// becomes an empty list. Use the `try_` variants to see the error.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    settings: CatalogSettings,
}

impl CatalogClient {
    pub fn new(settings: CatalogSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("building catalog HTTP client")?;
        Ok(Self { http, settings })
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<Track> {
        match self.try_search(query, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(query, error = %e, "Catalog search failed");
                Vec::new()
            }
        }
    }

    pub async fn trending(&self, limit: usize) -> Vec<Track> {
        match self.try_trending(limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog trending lookup failed");
                Vec::new()
            }
        }
    }

    /// Home-screen rows are plain searches under a fixed query
    pub async fn recommendations(&self, query: &str, limit: usize) -> Vec<Track> {
        self.search(query, limit).await
    }

    #[instrument(skip(self), err(Display))]
    pub async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        let q = format!("{}{}", query, self.settings.search_suffix);
        let max_results = clamp_limit(limit).to_string();

        let found: ListResponse<VideoItem> = self
            .http
            .get(format!("{}/search", self.settings.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", self.settings.category_id.as_str()),
                ("q", q.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", self.settings.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding search response")?;

        let ids: Vec<String> = found
            .items
            .iter()
            .filter_map(|item| item.id.as_id().map(str::to_owned))
            .collect();

        let durations = if ids.is_empty() {
            HashMap::new()
        } else {
            // A failed details call only costs the durations
            self.fetch_durations(&ids).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not fetch durations for search results");
                HashMap::new()
            })
        };

        let tracks = tracks_from_search(found, &durations);
        tracing::debug!(query, count = tracks.len(), "Catalog search complete");
        Ok(tracks)
    }

    #[instrument(skip(self), err(Display))]
    pub async fn try_trending(&self, limit: usize) -> Result<Vec<Track>> {
        let max_results = clamp_limit(limit).to_string();

        let found: ListResponse<VideoItem> = self
            .http
            .get(format!("{}/videos", self.settings.base_url))
            .query(&[
                ("part", "snippet,contentDetails"),
                ("chart", "mostPopular"),
                ("videoCategoryId", self.settings.category_id.as_str()),
                ("regionCode", self.settings.region_code.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", self.settings.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding trending response")?;

        Ok(found.items.into_iter().filter_map(track_from_video).collect())
    }

    async fn fetch_durations(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        let joined = ids.join(",");
        let details: ListResponse<DurationItem> = self
            .http
            .get(format!("{}/videos", self.settings.base_url))
            .query(&[
                ("part", "contentDetails"),
                ("id", joined.as_str()),
                ("key", self.settings.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding video details response")?;

        Ok(details
            .items
            .into_iter()
            .map(|item| (item.id, item.content_details.duration))
            .collect())
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_RESULTS_CAP)
}

fn tracks_from_search(
    found: ListResponse<VideoItem>,
    durations: &HashMap<String, String>,
) -> Vec<Track> {
    found
        .items
        .into_iter()
        .filter_map(|item| {
            let mut track = track_from_video(item)?;
            track.duration_label = durations
                .get(&track.id)
                .map(|iso| format_iso_duration(iso))
                .unwrap_or_else(|| ZERO_DURATION.to_string());
            Some(track)
        })
        .collect()
}

fn track_from_video(item: VideoItem) -> Option<Track> {
    let id = item.id.as_id()?.to_string();
    let thumbs = item.snippet.thumbnails;
    let thumbnail_url = thumbs
        .high
        .or(thumbs.medium)
        .or(thumbs.default)
        .map(|t| t.url)
        .unwrap_or_default();
    let duration_label = item
        .content_details
        .map(|d| format_iso_duration(&d.duration))
        .unwrap_or_else(|| ZERO_DURATION.to_string());

    Some(Track {
        id: id.clone(),
        title: unescape_html(&item.snippet.title),
        artist: unescape_html(&item.snippet.channel_title),
        thumbnail_url,
        duration_label,
        source_ref: SourceRef::Remote(id),
    })
}

/// Snippet text arrives HTML-escaped
fn unescape_html(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Convert an ISO-8601 `PT#H#M#S` duration into `H:MM:SS` or `M:SS`.
///
/// The hour field is left out when zero. Anything that does not parse,
/// including day components, becomes `0:00`.
pub fn format_iso_duration(iso: &str) -> String {
    match parse_iso_duration(iso) {
        Some((0, m, s)) => format!("{}:{:02}", m, s),
        Some((h, m, s)) => format!("{}:{:02}:{:02}", h, m, s),
        None => ZERO_DURATION.to_string(),
    }
}

fn parse_iso_duration(iso: &str) -> Option<(u64, u64, u64)> {
    let rest = iso.trim().strip_prefix("PT")?;
    let (mut hours, mut minutes, mut seconds) = (0, 0, 0);
    let mut digits = String::new();
    // each unit at most once, in H, M, S order
    let mut last_unit = 0;

    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'H' => 1,
            'M' => 2,
            'S' => 3,
            _ => return None,
        };
        if unit <= last_unit {
            return None;
        }
        last_unit = unit;
        match unit {
            1 => hours = value,
            2 => minutes = value,
            _ => seconds = value,
        }
    }

    if !digits.is_empty() {
        return None;
    }
    Some((hours, minutes, seconds))
}
