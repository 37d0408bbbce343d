//! Content view state: the listing currently on screen and its search filter

use std::collections::HashMap;

use super::cache::CacheName;
use super::types::{Entry, Route, StarredTab, Surface};

/// A folder on the library service with its direct children
#[derive(Clone, Debug, Default)]
pub struct Directory {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub children: Vec<Entry>,
}

/// Favorited songs and albums, in the order they were favorited
#[derive(Clone, Debug, Default)]
pub struct StarredLists {
    pub songs: Vec<Entry>,
    pub albums: Vec<Entry>,
}

/// Album detail view data
#[derive(Clone, Debug)]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub songs: Vec<Entry>,
}

/// Playlist detail view data
#[derive(Clone, Debug)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub songs: Vec<Entry>,
}

/// Which content is displayed in the main area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Folder { directory: Directory },
    Starred { starred: StarredLists, tab: StarredTab },
    AlbumList { albums: Vec<Entry> },
    Album { detail: AlbumDetail },
    Playlist { detail: PlaylistDetail },
}

impl ContentView {
    pub fn surface(&self) -> Option<Surface> {
        match self {
            ContentView::Empty => None,
            ContentView::Folder { .. } => Some(Surface::Folder),
            ContentView::Starred { tab: StarredTab::Tracks, .. } => Some(Surface::StarredTracks),
            ContentView::Starred { tab: StarredTab::Albums, .. } => Some(Surface::StarredAlbums),
            ContentView::AlbumList { .. } => Some(Surface::AlbumList),
            ContentView::Album { .. } => Some(Surface::Album),
            ContentView::Playlist { .. } => Some(Surface::Playlist),
        }
    }

    /// Query cache backing this view while it is mounted
    pub fn cache_name(&self) -> Option<CacheName> {
        match self {
            ContentView::Empty => None,
            ContentView::Folder { .. } => Some(CacheName::Folder),
            ContentView::Starred { .. } => Some(CacheName::Starred),
            ContentView::AlbumList { .. } => Some(CacheName::AlbumList),
            ContentView::Album { .. } => Some(CacheName::Album),
            ContentView::Playlist { .. } => Some(CacheName::Playlist),
        }
    }

    /// Where this view lives, for history and re-fetching
    pub fn route(&self) -> Option<Route> {
        match self {
            ContentView::Empty => None,
            ContentView::Folder { directory } => Some(Route::Folder(directory.id.clone())),
            ContentView::Starred { .. } => Some(Route::Starred),
            ContentView::AlbumList { .. } => Some(Route::AlbumList),
            ContentView::Album { detail } => Some(Route::Album(detail.id.clone())),
            ContentView::Playlist { detail } => Some(Route::Playlist(detail.id.clone())),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ContentView::Empty => " Library ".to_string(),
            ContentView::Folder { directory } => format!(" {} ", directory.name),
            ContentView::Starred { tab: StarredTab::Tracks, .. } => " Favorites: Tracks ".to_string(),
            ContentView::Starred { tab: StarredTab::Albums, .. } => " Favorites: Albums ".to_string(),
            ContentView::AlbumList { .. } => " Albums ".to_string(),
            ContentView::Album { detail } => format!(" {} - {} ", detail.artist, detail.name),
            ContentView::Playlist { detail } => format!(" Playlist: {} ", detail.name),
        }
    }

    /// The unfiltered ordered listing of the view
    pub fn source(&self) -> &[Entry] {
        match self {
            ContentView::Empty => &[],
            ContentView::Folder { directory } => &directory.children,
            ContentView::Starred { starred, tab: StarredTab::Tracks } => &starred.songs,
            ContentView::Starred { starred, tab: StarredTab::Albums } => &starred.albums,
            ContentView::AlbumList { albums } => albums,
            ContentView::Album { detail } => &detail.songs,
            ContentView::Playlist { detail } => &detail.songs,
        }
    }

    fn all_lists(&self) -> Vec<&Vec<Entry>> {
        match self {
            ContentView::Empty => vec![],
            ContentView::Folder { directory } => vec![&directory.children],
            ContentView::Starred { starred, .. } => vec![&starred.songs, &starred.albums],
            ContentView::AlbumList { albums } => vec![albums],
            ContentView::Album { detail } => vec![&detail.songs],
            ContentView::Playlist { detail } => vec![&detail.songs],
        }
    }

    fn all_lists_mut(&mut self) -> Vec<&mut Vec<Entry>> {
        match self {
            ContentView::Empty => vec![],
            ContentView::Folder { directory } => vec![&mut directory.children],
            ContentView::Starred { starred, .. } => vec![&mut starred.songs, &mut starred.albums],
            ContentView::AlbumList { albums } => vec![albums],
            ContentView::Album { detail } => vec![&mut detail.songs],
            ContentView::Playlist { detail } => vec![&mut detail.songs],
        }
    }
}

/// Content state: the mounted view plus its displayed (filtered) rows
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub search_query: String,
    /// Rows on screen; `row_index` equals the position in this vector
    rows: Vec<Entry>,
    pub cursor: usize,
    pub offset: usize,
    pub is_loading: bool,
}

impl ContentState {
    /// Mount a new view, dropping the filter and cursor of the old one
    pub fn set_view(&mut self, view: ContentView) {
        self.view = view;
        self.search_query.clear();
        self.cursor = 0;
        self.offset = 0;
        self.is_loading = false;
        self.reindex();
    }

    /// Swap in re-fetched data for the same view, keeping filter and cursor.
    ///
    /// Rows still present keep their `unique_id`, so selection membership
    /// survives the refresh.
    pub fn refresh_view(&mut self, mut view: ContentView) {
        for (fresh, previous) in view.all_lists_mut().into_iter().zip(self.view.all_lists()) {
            carry_unique_ids(fresh, previous);
        }
        self.view = view;
        self.is_loading = false;
        self.reindex();
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.cursor = 0;
        self.offset = 0;
        self.reindex();
    }

    pub fn rows(&self) -> &[Entry] {
        &self.rows
    }

    pub fn row_at(&self, index: usize) -> Option<&Entry> {
        self.rows.get(index)
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.rows.len().saturating_sub(1));
    }

    pub fn cursor_entry(&self) -> Option<&Entry> {
        self.rows.get(self.cursor)
    }

    /// Flip `starred` for every occurrence of `id`, listing and rows alike
    pub fn set_starred(&mut self, id: &str, starred: bool) {
        for list in self.view.all_lists_mut() {
            for entry in list.iter_mut().filter(|e| e.id == id) {
                entry.starred = starred;
            }
        }
        for entry in self.rows.iter_mut().filter(|e| e.id == id) {
            entry.starred = starred;
        }
    }

    /// Move the cursor, scrolling so it stays inside `visible_height` rows
    pub fn move_cursor(&mut self, delta: isize, visible_height: usize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        let height = visible_height.max(1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }

    fn reindex(&mut self) {
        let query = self.search_query.to_lowercase();
        self.rows = self
            .view
            .source()
            .iter()
            .filter(|e| query.is_empty() || matches_query(e, &query))
            .enumerate()
            .map(|(row_index, e)| Entry {
                row_index,
                ..e.clone()
            })
            .collect();
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        self.offset = self.offset.min(self.cursor);
    }
}

/// Give the n-th occurrence of an id in `fresh` the `unique_id` of its
/// n-th occurrence in `previous`
fn carry_unique_ids(fresh: &mut [Entry], previous: &[Entry]) {
    let mut known: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in previous {
        known
            .entry(entry.id.as_str())
            .or_default()
            .push(entry.unique_id.as_str());
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for entry in fresh.iter_mut() {
        let occurrence = seen.entry(entry.id.clone()).or_insert(0);
        if let Some(unique_id) = known.get(entry.id.as_str()).and_then(|ids| ids.get(*occurrence)) {
            entry.unique_id = unique_id.to_string();
        }
        *occurrence += 1;
    }
}

fn matches_query(entry: &Entry, query_lower: &str) -> bool {
    [&entry.title, &entry.artist, &entry.album]
        .iter()
        .any(|field| field.to_lowercase().contains(query_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::EntryKind;

    fn song(id: &str, title: &str, artist: &str) -> Entry {
        Entry {
            artist: artist.to_string(),
            ..Entry::new(id, EntryKind::Song, title)
        }
    }

    fn folder_state() -> ContentState {
        let mut state = ContentState::default();
        state.set_view(ContentView::Folder {
            directory: Directory {
                id: "d1".to_string(),
                name: "Rock".to_string(),
                parent: None,
                children: vec![
                    Entry::new("d2", EntryKind::Directory, "Live"),
                    song("s1", "Blue Sky", "Aria"),
                    song("s2", "Night", "Bram"),
                    song("s3", "Blue Moon", "Cole"),
                ],
            },
        });
        state
    }

    #[test]
    fn test_rows_are_indexed_by_position() {
        let state = folder_state();
        let indices: Vec<usize> = state.rows().iter().map(|e| e.row_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_filter_reindexes_visible_rows() {
        let mut state = folder_state();
        state.set_search_query("blue".to_string());
        let rows: Vec<(&str, usize)> = state
            .rows()
            .iter()
            .map(|e| (e.id.as_str(), e.row_index))
            .collect();
        assert_eq!(rows, vec![("s1", 0), ("s3", 1)]);

        // matches on artist too
        state.set_search_query("BRAM".to_string());
        assert_eq!(state.rows()[0].id, "s2");
    }

    #[test]
    fn test_filtered_rows_keep_unique_ids() {
        let mut state = folder_state();
        let original = state.view.source()[3].unique_id.clone();
        state.set_search_query("moon".to_string());
        assert_eq!(state.rows()[0].unique_id, original);
    }

    #[test]
    fn test_set_starred_updates_source_and_rows() {
        let mut state = folder_state();
        state.set_starred("s2", true);
        assert!(state.rows()[2].starred);
        assert!(state.view.source()[2].starred);
        assert!(!state.rows()[1].starred);
    }

    #[test]
    fn test_refresh_keeps_filter() {
        let mut state = folder_state();
        state.set_search_query("blue".to_string());
        let view = state.view.clone();
        state.refresh_view(view);
        assert_eq!(state.search_query, "blue");
        assert_eq!(state.rows().len(), 2);
    }

    #[test]
    fn test_refresh_keeps_row_identity() {
        let mut state = folder_state();
        let before: Vec<String> = state.rows().iter().map(|e| e.unique_id.clone()).collect();

        // a re-fetch builds every entry anew
        let fresh = ContentView::Folder {
            directory: Directory {
                id: "d1".to_string(),
                name: "Rock".to_string(),
                parent: None,
                children: vec![
                    Entry::new("d2", EntryKind::Directory, "Live"),
                    Entry {
                        starred: true,
                        ..song("s1", "Blue Sky", "Aria")
                    },
                    song("s2", "Night", "Bram"),
                    song("s3", "Blue Moon", "Cole"),
                    song("s4", "New", "Dara"),
                ],
            },
        };
        let added = fresh.source()[4].unique_id.clone();
        state.refresh_view(fresh);

        let after: Vec<String> = state.rows().iter().map(|e| e.unique_id.clone()).collect();
        assert_eq!(&after[..4], &before[..]);
        assert_eq!(after[4], added);
        assert!(state.rows()[1].starred);
    }

    #[test]
    fn test_refresh_matches_repeated_ids_by_occurrence() {
        let mut state = ContentState::default();
        let playlist = |songs: Vec<Entry>| ContentView::Playlist {
            detail: PlaylistDetail {
                id: "p1".to_string(),
                name: "Road".to_string(),
                songs,
            },
        };
        state.set_view(playlist(vec![
            song("s1", "One", "Aria"),
            song("s1", "One", "Aria"),
        ]));
        let before: Vec<String> = state.rows().iter().map(|e| e.unique_id.clone()).collect();
        assert_ne!(before[0], before[1]);

        state.refresh_view(playlist(vec![
            song("s1", "One", "Aria"),
            song("s1", "One", "Aria"),
            song("s1", "One", "Aria"),
        ]));
        let after: Vec<String> = state.rows().iter().map(|e| e.unique_id.clone()).collect();
        assert_eq!(&after[..2], &before[..]);
        assert!(!before.contains(&after[2]));
    }

    #[test]
    fn test_cursor_scrolls_window() {
        let mut state = folder_state();
        state.move_cursor(3, 2);
        assert_eq!(state.cursor, 3);
        assert_eq!(state.offset, 2);
        state.move_cursor(-10, 2);
        assert_eq!(state.cursor, 0);
        assert_eq!(state.offset, 0);
    }
}
