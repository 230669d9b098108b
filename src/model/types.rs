//! Core type definitions for the application

use std::time::Instant;

use super::persistence_client::PlaylistEntry;
use super::track::Track;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Library,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// Fixed destinations in the Library section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryKind {
    Home,
    LikedSongs,
    Queue,
    LocalFiles,
}

#[derive(Clone, Debug)]
pub struct LibraryItem {
    pub name: String,
    pub kind: LibraryKind,
}

/// A user's playlist (for sidebar display)
#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
}

/// Rows of the home view, top to bottom
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HomeRow {
    #[default]
    Trending,
    NewReleases,
    MadeForYou,
}

impl HomeRow {
    pub const ALL: [HomeRow; 3] = [HomeRow::Trending, HomeRow::NewReleases, HomeRow::MadeForYou];

    pub fn title(self) -> &'static str {
        match self {
            HomeRow::Trending => "Trending Now",
            HomeRow::NewReleases => "New Releases",
            HomeRow::MadeForYou => "Made For You",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Trending => Self::NewReleases,
            Self::NewReleases => Self::MadeForYou,
            Self::MadeForYou => Self::Trending,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Trending => Self::MadeForYou,
            Self::NewReleases => Self::Trending,
            Self::MadeForYou => Self::NewReleases,
        }
    }
}

/// The item under the cursor in the main content area
#[derive(Clone, Debug)]
pub enum SelectedItem {
    Track(Track),
    PlaylistEntry { playlist_id: String, entry: PlaylistEntry },
    QueuedTrack { index: usize, track: Track },
}

impl SelectedItem {
    pub fn track(&self) -> &Track {
        match self {
            SelectedItem::Track(track) => track,
            SelectedItem::PlaylistEntry { entry, .. } => &entry.song_data,
            SelectedItem::QueuedTrack { track, .. } => track,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Transient message shown over the UI until dismissed or expired
#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    SignIn,
    CreatePlaylist,
    ImportFiles,
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }
}

/// A modal text form. Tab moves between fields, Enter submits.
#[derive(Clone, Debug)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl FormState {
    pub fn sign_in() -> Self {
        Self {
            kind: FormKind::SignIn,
            fields: vec![FormField::new("Email"), FormField::masked("Password")],
            focus: 0,
        }
    }

    pub fn create_playlist() -> Self {
        Self {
            kind: FormKind::CreatePlaylist,
            fields: vec![FormField::new("Name"), FormField::new("Description (optional)")],
            focus: 0,
        }
    }

    pub fn import_files() -> Self {
        Self {
            kind: FormKind::ImportFiles,
            fields: vec![FormField::new("Files or folders")],
            focus: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::SignIn => "Sign in",
            FormKind::CreatePlaylist => "Create playlist",
            FormKind::ImportFiles => "Import local files",
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_items: Vec<LibraryItem>,
    pub library_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    pub notification: Option<Notification>,
    pub show_playlist_picker: bool,
    pub picker_track: Option<Track>,
    pub picker_selected: usize,
    pub show_help_popup: bool,
    pub form: Option<FormState>,
    pub signed_in_as: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Library,
            search_query: String::new(),
            library_items: vec![
                LibraryItem { name: "Home".to_string(), kind: LibraryKind::Home },
                LibraryItem { name: "Liked Songs".to_string(), kind: LibraryKind::LikedSongs },
                LibraryItem { name: "Queue".to_string(), kind: LibraryKind::Queue },
                LibraryItem { name: "Local Files".to_string(), kind: LibraryKind::LocalFiles },
            ],
            library_selected: 0,
            playlists: vec![], // loaded from the backend after sign-in
            playlist_selected: 0,
            notification: None,
            show_playlist_picker: false,
            picker_track: None,
            picker_selected: 0,
            show_help_popup: false,
            form: None,
            signed_in_as: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_cycle_both_ways() {
        let mut s = ActiveSection::Search;
        for _ in 0..4 {
            s = s.next();
        }
        assert_eq!(s, ActiveSection::Search);
        assert_eq!(ActiveSection::Search.prev(), ActiveSection::MainContent);
        assert_eq!(HomeRow::Trending.prev(), HomeRow::MadeForYou);
    }

    #[test]
    fn form_edits_the_focused_field() {
        let mut form = FormState::sign_in();
        form.push_char('a');
        form.focus_next();
        form.push_char('p');
        form.push_char('w');
        form.backspace();
        assert_eq!(form.value(0), "a");
        assert_eq!(form.value(1), "p");
        assert!(form.fields[1].masked);

        form.focus_next();
        assert_eq!(form.focus, 0);
        form.focus_prev();
        assert_eq!(form.focus, 1);
        assert_eq!(form.value(7), "");
    }
}
