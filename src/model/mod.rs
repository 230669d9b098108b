//! Model module - Application state and data types
//!
//! - `track`: the `Track` value and its wire shape
//! - `queue`: playback/queue state (current track, pending queue, likes)
//! - `cache`: durable key-value store and the liked songs kept in it
//! - `catalog_client` / `persistence_client`: the two HTTP collaborators
//! - `local`: local file import
//! - `types`, `playback`, `content`: UI-facing state
//! - `app_model`: main application model with state management methods

mod types;
mod playback;
mod content;
mod app_model;
pub mod cache;
pub mod catalog_client;
pub mod local;
pub mod persistence_client;
pub mod queue;
pub mod track;

pub use types::{
    ActiveSection, FormKind, FormState, HomeRow, LibraryKind, NotificationKind,
    PlaylistItem, SelectedItem, UiState,
};

pub use playback::PlaybackInfo;

pub use content::{ContentState, ContentView, HomeRows, PlaylistDetail};

pub use cache::{LikedSongsCache, LocalStore};
pub use catalog_client::CatalogClient;
pub use persistence_client::PersistenceClient;
pub use queue::PlaybackQueue;
pub use track::{SourceRef, Track};

pub use app_model::AppModel;
