//! Main application model with state management

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;

use crate::auth::SessionStore;

use super::catalog_client::CatalogClient;
use super::content::{ContentState, ContentView, HomeRows, PlaylistDetail};
use super::persistence_client::PersistenceClient;
use super::playback::{PlaybackInfo, PlaybackTiming};
use super::queue::PlaybackQueue;
use super::track::Track;
use super::types::{
    ActiveSection, FormKind, FormState, HomeRow, LibraryKind, Notification, NotificationKind,
    PlaylistItem, SelectedItem, UiState,
};

const NOTIFICATION_TTL_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel {
    catalog: Option<CatalogClient>,
    backend: Option<PersistenceClient>,
    session: Option<SessionStore>,
    playback: Arc<Mutex<PlaybackQueue>>,
    playback_timing: Arc<Mutex<PlaybackTiming>>,
    device_name: Arc<Mutex<String>>,
    local_files: Arc<Mutex<Vec<Track>>>,
    search_token: Arc<AtomicU64>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(playback: PlaybackQueue) -> Self {
        Self {
            catalog: None,
            backend: None,
            session: None,
            playback: Arc::new(Mutex::new(playback)),
            playback_timing: Arc::new(Mutex::new(PlaybackTiming::default())),
            device_name: Arc::new(Mutex::new(String::new())),
            local_files: Arc::new(Mutex::new(Vec::new())),
            search_token: Arc::new(AtomicU64::new(0)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_clients(
        &mut self,
        catalog: CatalogClient,
        backend: PersistenceClient,
        session: SessionStore,
    ) {
        self.catalog = Some(catalog);
        self.backend = Some(backend);
        self.session = Some(session);
    }

    pub fn catalog(&self) -> Option<CatalogClient> {
        self.catalog.clone()
    }

    pub fn backend(&self) -> Option<PersistenceClient> {
        self.backend.clone()
    }

    pub fn session(&self) -> Option<SessionStore> {
        self.session.clone()
    }

    // ========================================================================
    // Playback & Queue
    // ========================================================================

    pub async fn play_track(&self, track: Track) {
        self.playback_timing.lock().await.restart(Some(&track));
        self.playback.lock().await.play_track(track);
    }

    pub async fn pause(&self) {
        self.playback.lock().await.pause();
    }

    /// Resuming starts the track over, so the counter does too
    pub async fn resume(&self) {
        let mut playback = self.playback.lock().await;
        if playback.current().is_some() {
            self.playback_timing.lock().await.restart(playback.current());
        }
        playback.resume();
    }

    pub async fn advance(&self) -> bool {
        let mut playback = self.playback.lock().await;
        let advanced = playback.advance();
        if advanced {
            self.playback_timing.lock().await.restart(playback.current());
        }
        advanced
    }

    pub async fn retreat(&self) -> bool {
        let mut playback = self.playback.lock().await;
        let moved = playback.retreat();
        if moved {
            self.playback_timing.lock().await.restart(playback.current());
        }
        moved
    }

    pub async fn enqueue(&self, track: Track) {
        self.playback.lock().await.enqueue(track);
    }

    pub async fn remove_from_queue(&self, index: usize) -> Option<Track> {
        self.playback.lock().await.remove_from_queue(index)
    }

    pub async fn toggle_like(&self, track: &Track) -> bool {
        let liked = self.playback.lock().await.toggle_like(track);
        tracing::debug!(track_id = %track.id, liked, "Toggled like");
        liked
    }

    pub async fn is_liked(&self, track_id: &str) -> bool {
        self.playback.lock().await.is_liked(track_id)
    }

    pub async fn liked_tracks(&self) -> Vec<Track> {
        self.playback.lock().await.liked_tracks().to_vec()
    }

    /// Ids for the heart column in track lists
    pub async fn liked_ids(&self) -> HashSet<String> {
        self.playback
            .lock()
            .await
            .liked_tracks()
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.playback.lock().await.current().cloned()
    }

    /// What the playback surface should be doing right now
    pub async fn playback_snapshot(&self) -> (Option<Track>, bool) {
        let playback = self.playback.lock().await;
        (playback.current().cloned(), playback.is_playing())
    }

    pub async fn queue_snapshot(&self) -> (Option<Track>, Vec<Track>) {
        let playback = self.playback.lock().await;
        (
            playback.current().cloned(),
            playback.queue().iter().cloned().collect(),
        )
    }

    pub async fn is_playing(&self) -> bool {
        self.playback.lock().await.is_playing()
    }

    pub async fn tick_progress(&self) {
        let is_playing = self.playback.lock().await.is_playing();
        self.playback_timing.lock().await.tick(is_playing);
    }

    pub async fn set_device_name(&self, name: String) {
        *self.device_name.lock().await = name;
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let playback = self.playback.lock().await;
        let timing = self.playback_timing.lock().await.clone();
        let track = playback.current().cloned();
        let liked = track.as_ref().is_some_and(|t| playback.is_liked(&t.id));

        PlaybackInfo {
            liked,
            is_playing: playback.is_playing(),
            queue_len: playback.queue().len(),
            elapsed_secs: timing.elapsed_secs,
            duration_secs: timing.duration_secs,
            device_name: self.device_name.lock().await.clone(),
            track,
        }
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                state.library_selected = state.library_selected.saturating_sub(1);
            }
            ActiveSection::Playlists => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected < state.library_items.len().saturating_sub(1) {
                    state.library_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < state.playlists.len().saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            _ => {}
        }
    }

    pub async fn get_selected_library_item(&self) -> Option<LibraryKind> {
        let state = self.ui_state.lock().await;
        state.library_items.get(state.library_selected).map(|i| i.kind)
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    pub async fn search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn set_playlists(&self, playlists: Vec<PlaylistItem>) {
        let mut state = self.ui_state.lock().await;
        state.playlist_selected = state
            .playlist_selected
            .min(playlists.len().saturating_sub(1));
        state.playlists = playlists;
    }

    pub async fn get_selected_playlist(&self) -> Option<PlaylistItem> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn set_signed_in_as(&self, email: Option<String>) {
        self.ui_state.lock().await.signed_in_as = email;
    }

    pub async fn is_signed_in(&self) -> bool {
        self.ui_state.lock().await.signed_in_as.is_some()
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    async fn push_notification(&self, message: String, kind: NotificationKind) {
        let mut state = self.ui_state.lock().await;
        state.notification = Some(Notification {
            message,
            kind,
            timestamp: Instant::now(),
        });
    }

    pub async fn set_error(&self, message: String) {
        self.push_notification(message, NotificationKind::Error).await;
    }

    pub async fn notify(&self, message: String) {
        self.push_notification(message, NotificationKind::Info).await;
    }

    pub async fn clear_notification(&self) {
        self.ui_state.lock().await.notification = None;
    }

    pub async fn has_notification(&self) -> bool {
        self.ui_state.lock().await.notification.is_some()
    }

    pub async fn auto_clear_old_notifications(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(n) = &state.notification {
            if n.timestamp.elapsed().as_secs() > NOTIFICATION_TTL_SECS {
                state.notification = None;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------------

    pub async fn show_playlist_picker(&self, track: Track) {
        let mut state = self.ui_state.lock().await;
        state.picker_track = Some(track);
        state.picker_selected = 0;
        state.show_playlist_picker = true;
    }

    pub async fn hide_playlist_picker(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_playlist_picker = false;
        state.picker_track = None;
    }

    pub async fn is_playlist_picker_open(&self) -> bool {
        self.ui_state.lock().await.show_playlist_picker
    }

    pub async fn playlist_picker_move_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.picker_selected = state.picker_selected.saturating_sub(1);
    }

    pub async fn playlist_picker_move_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.picker_selected < state.playlists.len().saturating_sub(1) {
            state.picker_selected += 1;
        }
    }

    /// Playlist and track the picker would add
    pub async fn get_picker_selection(&self) -> Option<(PlaylistItem, Track)> {
        let state = self.ui_state.lock().await;
        let playlist = state.playlists.get(state.picker_selected).cloned()?;
        let track = state.picker_track.clone()?;
        Some((playlist, track))
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn open_form(&self, form: FormState) {
        self.ui_state.lock().await.form = Some(form);
    }

    pub async fn close_form(&self) -> Option<FormState> {
        self.ui_state.lock().await.form.take()
    }

    pub async fn form_kind(&self) -> Option<FormKind> {
        self.ui_state.lock().await.form.as_ref().map(|f| f.kind)
    }

    pub async fn edit_form(&self, edit: impl FnOnce(&mut FormState)) {
        if let Some(form) = self.ui_state.lock().await.form.as_mut() {
            edit(form);
        }
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    pub async fn set_home(&self, rows: HomeRows) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Home {
            rows,
            row: HomeRow::default(),
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn switch_home_row(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Home { rows, row, selected_index } = &mut state.view {
            *row = if forward { row.next() } else { row.prev() };
            *selected_index = (*selected_index).min(rows.row(*row).len().saturating_sub(1));
        }
    }

    /// Start a search and return its request token. Any earlier token is
    /// now stale.
    pub fn begin_search(&self) -> u64 {
        self.search_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Leaving for another view makes any search in flight stale
    fn cancel_pending_search(&self) {
        self.search_token.fetch_add(1, Ordering::SeqCst);
    }

    /// Apply results for `token`. Returns false, leaving the view untouched,
    /// when a newer search has started since.
    pub async fn apply_search_results(&self, token: u64, query: String, tracks: Vec<Track>) -> bool {
        if self.search_token.load(Ordering::SeqCst) != token {
            tracing::debug!(token, query = %query, "Discarding stale search results");
            return false;
        }

        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty | ContentView::SearchResults { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::SearchResults {
            query,
            tracks,
            selected_index: 0,
        };
        state.is_loading = false;
        true
    }

    /// A query too short to search clears the results and cancels any
    /// search still in flight.
    pub async fn clear_search_results(&self, query: String) {
        let token = self.begin_search();
        self.apply_search_results(token, query, Vec::new()).await;
    }

    pub async fn set_liked_songs(&self, tracks: Vec<Track>) {
        self.cancel_pending_search();
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::LikedSongs {
            tracks,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    /// Keep an open Liked Songs view in step with the liked store
    pub async fn refresh_liked_if_visible(&self) {
        let liked = self.liked_tracks().await;
        let mut state = self.content_state.lock().await;
        if let ContentView::LikedSongs { tracks, selected_index } = &mut state.view {
            *selected_index = (*selected_index).min(liked.len().saturating_sub(1));
            *tracks = liked;
        }
    }

    pub async fn set_queue(&self, currently_playing: Option<Track>, queue: Vec<Track>) {
        self.cancel_pending_search();
        let mut state = self.content_state.lock().await;

        if !matches!(state.view, ContentView::Empty | ContentView::Queue { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::Queue {
            currently_playing,
            queue,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn update_queue_if_visible(&self) {
        let (currently_playing, queue) = self.queue_snapshot().await;
        let mut state = self.content_state.lock().await;
        if let ContentView::Queue { selected_index, .. } = &state.view {
            // Preserve selection but clamp to new queue size
            let new_index = (*selected_index).min(queue.len().saturating_sub(1));
            state.view = ContentView::Queue {
                currently_playing,
                queue,
                selected_index: new_index,
            };
        }
    }

    pub async fn add_local_files(&self, tracks: Vec<Track>) -> usize {
        let added = tracks.len();
        self.local_files.lock().await.extend(tracks);
        added
    }

    pub async fn show_local_files(&self) {
        self.cancel_pending_search();
        let tracks = self.local_files.lock().await.clone();
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::LocalFiles {
            tracks,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_playlist_detail(&self, detail: PlaylistDetail) {
        self.cancel_pending_search();
        let mut state = self.content_state.lock().await;

        if !matches!(state.view, ContentView::Empty | ContentView::PlaylistDetail { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::PlaylistDetail {
            detail,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    /// Id of the playlist whose detail is on screen
    pub async fn visible_playlist_id(&self) -> Option<String> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::PlaylistDetail { detail, .. } => Some(detail.playlist.id.clone()),
            _ => None,
        }
    }

    pub async fn remove_entry_from_view(&self, entry_id: &str) {
        let mut state = self.content_state.lock().await;
        if let ContentView::PlaylistDetail { detail, selected_index } = &mut state.view {
            detail.entries.retain(|e| e.id != entry_id);
            *selected_index = (*selected_index).min(detail.entries.len().saturating_sub(1));
        }
    }

    /// Leave a deleted playlist's detail view
    pub async fn close_playlist_view(&self, playlist_id: &str) {
        let showing = self.visible_playlist_id().await;
        if showing.as_deref() == Some(playlist_id) {
            self.navigate_back().await;
        }
    }

    pub async fn navigate_back(&self) -> bool {
        self.cancel_pending_search();
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        if let Some(idx) = state.view.selected_index_mut() {
            *idx = idx.saturating_sub(1);
        }
    }

    pub async fn content_move_down(&self) {
        let mut state = self.content_state.lock().await;
        if state.view.is_empty() {
            return;
        }
        let len = state.view.len();
        if let Some(idx) = state.view.selected_index_mut() {
            if *idx < len.saturating_sub(1) {
                *idx += 1;
            }
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Empty => None,
            ContentView::Home { rows, row, selected_index } => rows
                .row(*row)
                .get(*selected_index)
                .cloned()
                .map(SelectedItem::Track),
            ContentView::SearchResults { tracks, selected_index, .. }
            | ContentView::LikedSongs { tracks, selected_index }
            | ContentView::LocalFiles { tracks, selected_index } => {
                tracks.get(*selected_index).cloned().map(SelectedItem::Track)
            }
            ContentView::Queue { queue, selected_index, .. } => {
                queue.get(*selected_index).map(|t| SelectedItem::QueuedTrack {
                    index: *selected_index,
                    track: t.clone(),
                })
            }
            ContentView::PlaylistDetail { detail, selected_index } => {
                detail.entries.get(*selected_index).map(|e| SelectedItem::PlaylistEntry {
                    playlist_id: detail.playlist.id.clone(),
                    entry: e.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cache::{LikedSongsCache, LocalStore};
    use crate::model::track::SourceRef;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_string(),
            artist: "artist".to_string(),
            thumbnail_url: String::new(),
            duration_label: "2:00".to_string(),
            source_ref: SourceRef::Remote(id.to_string()),
        }
    }

    fn model(dir: &std::path::Path) -> AppModel {
        AppModel::new(PlaybackQueue::new(LikedSongsCache::load(LocalStore::new(dir))))
    }

    fn search_tracks(state: &ContentState) -> Option<(&str, usize)> {
        match &state.view {
            ContentView::SearchResults { query, tracks, .. } => Some((query.as_str(), tracks.len())),
            _ => None,
        }
    }

    #[tokio::test]
    async fn stale_search_results_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        let first = m.begin_search();
        let second = m.begin_search();

        assert!(m.apply_search_results(second, "newer".into(), vec![track("b")]).await);
        assert!(!m.apply_search_results(first, "older".into(), vec![track("a")]).await);

        let state = m.get_content_state().await;
        assert_eq!(search_tracks(&state), Some(("newer", 1)));
    }

    #[tokio::test]
    async fn empty_search_clears_previous_results() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        let t = m.begin_search();
        m.apply_search_results(t, "jazz".into(), vec![track("a"), track("b")]).await;

        let t = m.begin_search();
        m.set_content_loading(true).await;
        assert!(m.apply_search_results(t, "lofi".into(), Vec::new()).await);

        let state = m.get_content_state().await;
        assert_eq!(search_tracks(&state), Some(("lofi", 0)));
        assert!(!state.is_loading);
        assert!(!m.has_notification().await, "no results is not an error");
    }

    #[tokio::test]
    async fn short_query_cancels_search_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        let pending = m.begin_search();
        m.clear_search_results("lo".into()).await;
        assert!(!m.apply_search_results(pending, "lofi".into(), vec![track("a")]).await);

        let state = m.get_content_state().await;
        assert_eq!(search_tracks(&state), Some(("lo", 0)));
    }

    #[tokio::test]
    async fn moving_through_an_empty_list_keeps_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.clear_search_results("lo".into()).await;
        m.content_move_down().await;

        let state = m.get_content_state().await;
        assert!(state.view.is_empty());
        assert!(matches!(state.view, ContentView::SearchResults { selected_index: 0, .. }));
        assert!(m.get_selected_content_item().await.is_none());
    }

    #[tokio::test]
    async fn late_search_does_not_replace_view_opened_since() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        let pending = m.begin_search();
        m.set_liked_songs(vec![track("liked")]).await;
        assert!(!m.apply_search_results(pending, "rock".into(), vec![track("r")]).await);

        let state = m.get_content_state().await;
        assert!(matches!(state.view, ContentView::LikedSongs { .. }));
        assert!(state.navigation_stack.is_empty());
    }

    #[tokio::test]
    async fn liked_current_track_keeps_like_after_advance() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.enqueue(track("a")).await;
        m.enqueue(track("b")).await;
        assert!(m.advance().await);

        let current = m.current_track().await.unwrap();
        assert!(m.toggle_like(&current).await);
        assert!(m.advance().await);

        assert_eq!(m.current_track().await.unwrap().id, "b");
        assert!(m.is_liked("a").await);
        let info = m.get_playback_info().await;
        assert!(!info.liked);
        assert_eq!(info.queue_len, 0);
    }

    #[tokio::test]
    async fn resume_restarts_the_progress_counter() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.play_track(track("a")).await;
        m.tick_progress().await;
        m.tick_progress().await;
        assert_eq!(m.get_playback_info().await.elapsed_secs, 2);

        m.pause().await;
        m.tick_progress().await;
        assert_eq!(m.get_playback_info().await.elapsed_secs, 2);

        m.resume().await;
        let info = m.get_playback_info().await;
        assert!(info.is_playing);
        assert_eq!(info.elapsed_secs, 0);
        assert_eq!(info.duration_secs, 120);
    }

    #[tokio::test]
    async fn navigation_stack_returns_to_previous_view() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.set_home(HomeRows {
            trending: vec![track("t1"), track("t2")],
            ..HomeRows::default()
        })
        .await;
        let t = m.begin_search();
        m.apply_search_results(t, "rock".into(), vec![track("r")]).await;

        assert!(m.navigate_back().await);
        assert!(matches!(m.get_content_state().await.view, ContentView::Home { .. }));

        m.content_move_down().await;
        m.content_move_down().await;
        match m.get_selected_content_item().await {
            Some(SelectedItem::Track(t)) => assert_eq!(t.id, "t2"),
            other => panic!("unexpected selection {other:?}"),
        }

        m.switch_home_row(true).await;
        assert!(m.get_selected_content_item().await.is_none());

        assert!(!m.navigate_back().await);
        assert!(matches!(m.get_content_state().await.view, ContentView::Empty));
    }

    #[tokio::test]
    async fn queue_view_follows_queue_changes() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.enqueue(track("a")).await;
        m.enqueue(track("b")).await;
        let (current, queue) = m.queue_snapshot().await;
        m.set_queue(current, queue).await;
        m.content_move_down().await;

        match m.get_selected_content_item().await {
            Some(SelectedItem::QueuedTrack { index, track }) => {
                assert_eq!(index, 1);
                assert_eq!(track.id, "b");
                m.remove_from_queue(index).await;
            }
            other => panic!("unexpected selection {other:?}"),
        }
        m.update_queue_if_visible().await;

        match m.get_content_state().await.view {
            ContentView::Queue { queue, selected_index, .. } => {
                assert_eq!(queue.len(), 1);
                assert_eq!(selected_index, 0);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test]
    async fn notifications_expire() {
        let dir = tempfile::tempdir().unwrap();
        let m = model(dir.path());

        m.set_error("boom".into()).await;
        m.auto_clear_old_notifications().await;
        assert!(m.has_notification().await);

        m.ui_state.lock().await.notification.as_mut().unwrap().timestamp =
            Instant::now() - std::time::Duration::from_secs(NOTIFICATION_TTL_SECS + 1);
        m.auto_clear_old_notifications().await;
        assert!(!m.has_notification().await);
    }
}
