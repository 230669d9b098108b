//! Library, playlist, search and session flows

use crate::auth::Session;
use crate::model::local::{import_paths, parse_path_list};
use crate::model::{
    ActiveSection, FormKind, FormState, HomeRows, LibraryKind, PlaylistDetail, PlaylistItem,
    SelectedItem, Track,
};

use super::AppController;

impl AppController {
    pub async fn perform_search(&self, query: &str) {
        let query = query.trim().to_string();
        let model = self.model.lock().await;

        if query.chars().count() < self.ui.min_query_len {
            tracing::debug!(query = %query, "Query too short, clearing results");
            model.clear_search_results(query).await;
            return;
        }

        let Some(catalog) = model.catalog() else {
            return;
        };
        let token = model.begin_search();
        model.set_content_loading(true).await;
        model.set_active_section(ActiveSection::MainContent).await;
        drop(model);

        tracing::info!(query = %query, token, "Searching catalog");
        let limit = self.ui.search_limit as usize;
        let model = self.model.clone();
        tokio::spawn(async move {
            let tracks = catalog.search(&query, limit).await;
            let count = tracks.len();
            let model = model.lock().await;
            if model.apply_search_results(token, query, tracks).await {
                tracing::debug!(token, count, "Search results applied");
            }
        });
    }

    /// Fill the three home rows concurrently
    pub async fn load_home(&self) {
        let model = self.model.lock().await;
        let Some(catalog) = model.catalog() else {
            return;
        };
        model.set_content_loading(true).await;
        drop(model);

        let row_limit = self.ui.row_limit as usize;
        let (trending, new_releases, made_for_you) = futures::join!(
            catalog.trending(self.ui.trending_limit as usize),
            catalog.recommendations(&self.ui.new_releases_query, row_limit),
            catalog.recommendations(&self.ui.made_for_you_query, row_limit),
        );
        tracing::info!(
            trending = trending.len(),
            new_releases = new_releases.len(),
            made_for_you = made_for_you.len(),
            "Home rows loaded"
        );

        let model = self.model.lock().await;
        model
            .set_home(HomeRows {
                trending,
                new_releases,
                made_for_you,
            })
            .await;
    }

    pub async fn load_user_playlists(&self) {
        let model = self.model.lock().await;
        let Some(backend) = model.backend() else {
            return;
        };
        drop(model);

        let result = backend.list_playlists().await;
        let model = self.model.lock().await;
        match result {
            Ok(playlists) => {
                let items = playlists
                    .into_iter()
                    .map(|p| PlaylistItem { id: p.id, name: p.name })
                    .collect();
                model.set_playlists(items).await;
            }
            Err(e) => {
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn open_playlist(&self, playlist_id: &str) {
        let model = self.model.lock().await;
        let Some(backend) = model.backend() else {
            return;
        };
        model.set_content_loading(true).await;
        drop(model);

        let result = futures::try_join!(
            backend.get_playlist(playlist_id),
            backend.list_entries(playlist_id)
        );

        let model = self.model.lock().await;
        match result {
            Ok((playlist, entries)) => {
                tracing::debug!(playlist_id, entries = entries.len(), "Opened playlist");
                model.set_playlist_detail(PlaylistDetail { playlist, entries }).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                model.set_content_loading(false).await;
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn create_playlist(&self, name: &str, description: &str) {
        let model = self.model.lock().await;
        let (Some(backend), Some(session)) = (model.backend(), model.session()) else {
            return;
        };
        drop(model);

        let Some(user) = session.current_session().await else {
            let model = self.model.lock().await;
            model.set_error("Sign in to create playlists.".to_string()).await;
            return;
        };

        let result = backend.create_playlist(&user.user_id, name, description).await;
        let model = self.model.lock().await;
        match result {
            Ok(playlist) => {
                model.notify(format!("Playlist created: {}", playlist.name)).await;
                drop(model);
                self.load_user_playlists().await;
            }
            Err(e) => {
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn delete_selected_playlist(&self) {
        let model = self.model.lock().await;
        let (Some(backend), Some(playlist)) = (model.backend(), model.get_selected_playlist().await)
        else {
            return;
        };
        drop(model);

        tracing::info!(playlist_id = %playlist.id, name = %playlist.name, "Deleting playlist");
        let result = backend.delete_playlist(&playlist.id).await;
        let model = self.model.lock().await;
        match result {
            Ok(()) => {
                model.close_playlist_view(&playlist.id).await;
                model.notify(format!("Playlist deleted: {}", playlist.name)).await;
                drop(model);
                self.load_user_playlists().await;
            }
            Err(e) => {
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn add_to_playlist(&self, playlist: PlaylistItem, track: Track) {
        let model = self.model.lock().await;
        let Some(backend) = model.backend() else {
            return;
        };
        drop(model);

        let result = backend.add_entry(&playlist.id, &track).await;
        let model = self.model.lock().await;
        match result {
            Ok(()) => {
                model.notify(format!("Added to {}", playlist.name)).await;
                let showing = model.visible_playlist_id().await;
                drop(model);
                if showing.as_deref() == Some(playlist.id.as_str()) {
                    self.open_playlist(&playlist.id).await;
                }
            }
            Err(e) => {
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn remove_playlist_entry(&self, entry_id: &str) {
        let model = self.model.lock().await;
        let Some(backend) = model.backend() else {
            return;
        };
        drop(model);

        let result = backend.remove_entry(entry_id).await;
        let model = self.model.lock().await;
        match result {
            Ok(()) => {
                model.remove_entry_from_view(entry_id).await;
                model.notify("Song removed from playlist".to_string()).await;
            }
            Err(e) => {
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }

    pub async fn show_liked_songs(&self) {
        let model = self.model.lock().await;
        let tracks = model.liked_tracks().await;
        model.set_liked_songs(tracks).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn show_queue(&self) {
        let model = self.model.lock().await;
        let (current, queue) = model.queue_snapshot().await;
        model.set_queue(current, queue).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn show_local_files(&self) {
        let model = self.model.lock().await;
        model.show_local_files().await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    /// Import the files and folders named in `input`. Tracks stay in memory only.
    pub async fn import_local_files(&self, input: &str) {
        let paths = parse_path_list(input);
        if paths.is_empty() {
            let model = self.model.lock().await;
            model.notify("No paths given.".to_string()).await;
            return;
        }

        let extensions = self.library.extensions.clone();
        let imported = tokio::task::spawn_blocking(move || import_paths(&paths, &extensions)).await;

        let model = self.model.lock().await;
        let tracks = match imported {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::error!(error = %e, "Local import task failed");
                model.set_error("Import failed.".to_string()).await;
                return;
            }
        };

        if tracks.is_empty() {
            model.notify("No audio files found.".to_string()).await;
            return;
        }
        let added = model.add_local_files(tracks).await;
        tracing::info!(added, "Imported local files");
        model.notify(format!("Imported {} file(s)", added)).await;
        drop(model);
        self.show_local_files().await;
    }

    pub async fn open_library_item(&self, kind: LibraryKind) {
        match kind {
            LibraryKind::Home => {
                self.load_home().await;
                let model = self.model.lock().await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            LibraryKind::LikedSongs => self.show_liked_songs().await,
            LibraryKind::Queue => self.show_queue().await,
            LibraryKind::LocalFiles => self.show_local_files().await,
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        self.play_selected(item).await;
    }

    pub async fn submit_form(&self, form: FormState) {
        tracing::debug!(kind = ?form.kind, "Submitting form");
        match form.kind {
            FormKind::SignIn => self.sign_in(form.value(0), form.value(1)).await,
            FormKind::CreatePlaylist => self.create_playlist(form.value(0), form.value(1)).await,
            FormKind::ImportFiles => self.import_local_files(form.value(0)).await,
        }
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    /// Sign in from the cached refresh token, or ask for credentials
    pub async fn restore_session(&self) {
        let model = self.model.lock().await;
        let Some(session) = model.session() else {
            return;
        };
        drop(model);

        match session.restore().await {
            Ok(Some(restored)) => self.after_sign_in(restored).await,
            Ok(None) => {
                let model = self.model.lock().await;
                model.open_form(FormState::sign_in()).await;
            }
            Err(e) => {
                let model = self.model.lock().await;
                model
                    .set_error(format!("Saved session expired: {}", Self::format_error(&e)))
                    .await;
                model.open_form(FormState::sign_in()).await;
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) {
        let model = self.model.lock().await;
        let Some(session) = model.session() else {
            return;
        };
        drop(model);

        match session.sign_in(email, password).await {
            Ok(signed_in) => self.after_sign_in(signed_in).await,
            Err(e) => {
                let model = self.model.lock().await;
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;

                let mut form = FormState::sign_in();
                email.chars().for_each(|c| form.push_char(c));
                form.focus_next();
                model.open_form(form).await;
            }
        }
    }

    async fn after_sign_in(&self, session: Session) {
        let model = self.model.lock().await;
        model.set_signed_in_as(Some(session.email.clone())).await;
        model.notify(format!("Signed in as {}", session.email)).await;
        drop(model);

        futures::join!(self.load_home(), self.load_user_playlists());
    }

    pub async fn sign_out(&self) {
        let model = self.model.lock().await;
        let Some(session) = model.session() else {
            return;
        };
        model.pause().await;
        drop(model);

        self.sync_surface().await;
        session.sign_out().await;

        let model = self.model.lock().await;
        model.set_signed_in_as(None).await;
        model.set_playlists(Vec::new()).await;
        while model.navigate_back().await {}
        model.open_form(FormState::sign_in()).await;
    }

    /// Refresh the access token when close to expiry; a failed refresh signs out
    pub async fn refresh_session(&self) {
        let model = self.model.lock().await;
        let Some(session) = model.session() else {
            return;
        };
        drop(model);

        if let Err(e) = session.refresh_if_needed().await {
            let model = self.model.lock().await;
            let error_msg = Self::format_error(&e);
            model.set_error(error_msg).await;
            model.set_signed_in_as(None).await;
            model.open_form(FormState::sign_in()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::super::tests::controller;
    use crate::model::{ContentView, FormKind};

    #[tokio::test]
    async fn short_query_clears_results_without_searching() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.perform_search(" lo ").await;
        let model = c.model.lock().await;
        let state = model.get_content_state().await;
        match state.view {
            ContentView::SearchResults { query, tracks, .. } => {
                assert_eq!(query, "lo");
                assert!(tracks.is_empty());
            }
            other => panic!("unexpected view {other:?}"),
        }
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn import_form_adds_audio_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        fs::create_dir_all(&music).unwrap();
        fs::write(music.join("one.mp3"), b"").unwrap();
        fs::write(music.join("cover.jpg"), b"").unwrap();
        let c = controller(dir.path());

        c.import_local_files(&format!("\"{}\"", music.display())).await;

        let model = c.model.lock().await;
        match model.get_content_state().await.view {
            ContentView::LocalFiles { tracks, .. } => {
                assert_eq!(tracks.len(), 1);
                assert_eq!(tracks[0].title, "one");
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test]
    async fn import_of_nothing_usable_keeps_view() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.import_local_files("   ").await;
        c.import_local_files(&dir.path().join("missing.mp3").display().to_string())
            .await;

        let model = c.model.lock().await;
        assert!(matches!(model.get_content_state().await.view, ContentView::Empty));
        assert!(model.has_notification().await);
        assert_eq!(model.form_kind().await, None::<FormKind>);
    }
}
