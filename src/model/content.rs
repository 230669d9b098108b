//! Content view state for the home rows, search results, playlists, etc.

use super::persistence_client::{Playlist, PlaylistEntry};
use super::track::Track;
use super::types::HomeRow;

/// The three rows of the home view
#[derive(Clone, Debug, Default)]
pub struct HomeRows {
    pub trending: Vec<Track>,
    pub new_releases: Vec<Track>,
    pub made_for_you: Vec<Track>,
}

impl HomeRows {
    pub fn row(&self, row: HomeRow) -> &[Track] {
        match row {
            HomeRow::Trending => &self.trending,
            HomeRow::NewReleases => &self.new_releases,
            HomeRow::MadeForYou => &self.made_for_you,
        }
    }
}

/// Playlist detail view data
#[derive(Clone, Debug)]
pub struct PlaylistDetail {
    pub playlist: Playlist,
    pub entries: Vec<PlaylistEntry>,
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Home {
        rows: HomeRows,
        row: HomeRow,
        selected_index: usize,
    },
    /// An empty `tracks` renders as "no results", never as an error
    SearchResults {
        query: String,
        tracks: Vec<Track>,
        selected_index: usize,
    },
    LikedSongs {
        tracks: Vec<Track>,
        selected_index: usize,
    },
    /// Queue view - shows currently playing and upcoming tracks
    Queue {
        currently_playing: Option<Track>,
        queue: Vec<Track>,
        selected_index: usize,
    },
    LocalFiles {
        tracks: Vec<Track>,
        selected_index: usize,
    },
    PlaylistDetail {
        detail: PlaylistDetail,
        selected_index: usize,
    },
}

impl ContentView {
    /// Number of selectable rows in the view
    pub fn len(&self) -> usize {
        match self {
            ContentView::Empty => 0,
            ContentView::Home { rows, row, .. } => rows.row(*row).len(),
            ContentView::SearchResults { tracks, .. }
            | ContentView::LikedSongs { tracks, .. }
            | ContentView::LocalFiles { tracks, .. } => tracks.len(),
            ContentView::Queue { queue, .. } => queue.len(),
            ContentView::PlaylistDetail { detail, .. } => detail.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selected_index_mut(&mut self) -> Option<&mut usize> {
        match self {
            ContentView::Empty => None,
            ContentView::Home { selected_index, .. }
            | ContentView::SearchResults { selected_index, .. }
            | ContentView::LikedSongs { selected_index, .. }
            | ContentView::Queue { selected_index, .. }
            | ContentView::LocalFiles { selected_index, .. }
            | ContentView::PlaylistDetail { selected_index, .. } => Some(selected_index),
        }
    }
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}
