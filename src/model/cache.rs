//! Durable local key-value store and the liked songs set kept in it

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::track::Track;

/// Fixed key the liked set lives under
pub const LIKED_SONGS_KEY: &str = "likedSongs";

/// One JSON file per key inside a directory
#[derive(Clone, Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(content))
    }

    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("creating {}", self.dir.display()))?;
        }
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Liked tracks keyed by id.
///
/// Keeps the full track next to each id so a liked song can always be
/// displayed, even when no other list in memory holds it.
#[derive(Clone, Debug)]
pub struct LikedSongsCache {
    store: LocalStore,
    liked_ids: HashSet<String>,
    tracks: Vec<Track>,
}

impl LikedSongsCache {
    /// Load the liked set from the store, starting empty when the key is
    /// absent or its content cannot be read.
    pub fn load(store: LocalStore) -> Self {
        let mut cache = Self {
            store,
            liked_ids: HashSet::new(),
            tracks: Vec::new(),
        };

        match cache.store.read(LIKED_SONGS_KEY) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Track>>(&content) {
                Ok(tracks) => {
                    for track in tracks {
                        if cache.liked_ids.insert(track.id.clone()) {
                            cache.tracks.push(track);
                        }
                    }
                    tracing::debug!(count = cache.tracks.len(), "Liked songs loaded from disk");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Liked songs store is malformed, starting empty");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Could not read liked songs store, starting empty");
            }
        }

        cache
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.liked_ids.contains(track_id)
    }

    /// Flip membership of `track.id` and persist. Returns the new liked state.
    pub fn toggle(&mut self, track: &Track) -> bool {
        let liked = if self.liked_ids.remove(&track.id) {
            self.tracks.retain(|t| t.id != track.id);
            false
        } else {
            self.liked_ids.insert(track.id.clone());
            self.tracks.push(track.clone());
            true
        };

        // In-memory state stays authoritative when the write fails
        if let Err(e) = self.save_to_disk() {
            tracing::error!(error = %e, track_id = %track.id, "Failed to persist liked songs");
        }

        liked
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn save_to_disk(&self) -> Result<()> {
        let content = serde_json::to_string(&self.tracks)?;
        self.store.write(LIKED_SONGS_KEY, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::SourceRef;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("title {id}"),
            artist: "artist".to_string(),
            thumbnail_url: String::new(),
            duration_label: "3:00".to_string(),
            source_ref: SourceRef::Remote(id.to_string()),
        }
    }

    #[test]
    fn store_reads_back_what_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        assert_eq!(store.read("k").unwrap(), None);
        store.write("k", "[1,2]").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn toggle_persists_full_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = LikedSongsCache::load(LocalStore::new(dir.path()));

        assert!(cache.toggle(&track("a")));
        assert!(cache.toggle(&track("b")));
        assert!(!cache.toggle(&track("a")));

        let reloaded = LikedSongsCache::load(LocalStore::new(dir.path()));
        assert!(!reloaded.is_liked("a"));
        assert!(reloaded.is_liked("b"));
        assert_eq!(reloaded.tracks()[0].title, "title b");
    }

    #[test]
    fn malformed_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.write(LIKED_SONGS_KEY, "{not json").unwrap();

        let cache = LikedSongsCache::load(store);
        assert!(cache.tracks().is_empty());
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the store directory should be makes every write fail
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let mut cache = LikedSongsCache::load(LocalStore::new(blocker.join("store")));

        assert!(cache.toggle(&track("a")));
        assert!(cache.is_liked("a"));
    }
}
