//! Core type definitions for the application

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// A fresh id telling repeated occurrences of the same entry apart
pub fn next_unique_id() -> String {
    format!("u{}", NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed))
}

/// What an entry points at on the library service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Song,
    Album,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Song => write!(f, "song"),
            EntryKind::Album => write!(f, "album"),
            EntryKind::Directory => write!(f, "directory"),
        }
    }
}

/// One selectable row of a listing.
///
/// Entries are snapshots: updates produce a new value that is republished
/// wherever the old one was held.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: String,
    pub kind: EntryKind,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: u32,
    /// Position in the currently displayed sequence; not an identity
    pub row_index: usize,
    pub is_dir: bool,
    pub starred: bool,
    pub unique_id: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, kind: EntryKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            duration_secs: 0,
            row_index: 0,
            is_dir: kind != EntryKind::Song,
            starred: false,
            unique_id: next_unique_id(),
        }
    }

    /// Identity used for selection membership
    pub fn key(&self) -> (&str, &str) {
        (&self.id, &self.unique_id)
    }

    pub fn same_row(&self, other: &Entry) -> bool {
        self.key() == other.key()
    }

    pub fn with_starred(&self, starred: bool) -> Self {
        Self {
            starred,
            ..self.clone()
        }
    }
}

/// Modifier keys held during a pointer-down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS
    pub toggle: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const CTRL: Modifiers = Modifiers { toggle: true, shift: false };
    pub const SHIFT: Modifiers = Modifiers { toggle: false, shift: true };
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            toggle: mods.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A list that receives pointer input; each owns at most one pending click
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Folder,
    StarredTracks,
    StarredAlbums,
    AlbumList,
    Album,
    Playlist,
}

/// Tabs of the favorites view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StarredTab {
    #[default]
    Tracks,
    Albums,
}

impl StarredTab {
    pub fn toggle(self) -> Self {
        match self {
            StarredTab::Tracks => StarredTab::Albums,
            StarredTab::Albums => StarredTab::Tracks,
        }
    }
}

/// A user's playlist (for sidebar and picker display)
#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
    pub song_count: usize,
}

/// A navigable location; the navigation collaborator speaks in paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Folder(String),
    Album(String),
    AlbumList,
    Starred,
    Playlist(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Folder(id) => format!("/library/folder/{}", id),
            Route::Album(id) => format!("/library/album/{}", id),
            Route::AlbumList => "/library/album".to_string(),
            Route::Starred => "/starred".to_string(),
            Route::Playlist(id) => format!("/playlist/{}", id),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["library", "folder", id] if !id.is_empty() => Some(Route::Folder(id.to_string())),
            ["library", "album", id] if !id.is_empty() => Some(Route::Album(id.to_string())),
            ["library", "album"] => Some(Route::AlbumList),
            ["starred"] => Some(Route::Starred),
            ["playlist", id] if !id.is_empty() => Some(Route::Playlist(id.to_string())),
            _ => None,
        }
    }

    /// Route that a double click on a directory-like entry descends into
    pub fn for_entry(entry: &Entry) -> Option<Route> {
        match entry.kind {
            EntryKind::Directory => Some(Route::Folder(entry.id.clone())),
            EntryKind::Album => Some(Route::Album(entry.id.clone())),
            EntryKind::Song => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// A toast shown over the listing until it expires or is dismissed
#[derive(Clone, Debug)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Deep link offered with the message (e.g. "go to playlist")
    pub action: Option<Route>,
    pub created_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>, action: Option<Route>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            action,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            action: None,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            action: None,
            created_at: Instant::now(),
        }
    }
}

/// UI state for the application
#[derive(Clone, Default)]
pub struct UiState {
    pub search_active: bool,
    pub music_folders: Vec<Entry>,
    pub music_folder_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    /// Sidebar highlight; follows the playlist last opened from the sidebar
    pub playlist_selected: usize,
    pub show_playlist_picker: bool,
    pub picker_selected: usize,
    pub show_help_popup: bool,
    pub notification: Option<Notification>,
}

impl UiState {
    pub fn picked_playlist(&self) -> Option<&PlaylistItem> {
        self.playlists.get(self.picker_selected)
    }
}
