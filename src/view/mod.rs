//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, popup placement)
//! - `layout`: Top bar and sidebar
//! - `content`: Main content area (the listing)
//! - `status`: Status bar with playback and selection info
//! - `overlays`: Modal overlays (notification, playlist picker, help)

mod utils;
mod layout;
mod content;
mod status;
mod overlays;

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::model::{ContentState, PlayQueue, SelectionStore, UiState};

/// Everything one frame needs, copied out of the model
pub struct ViewState {
    pub ui_state: UiState,
    pub content_state: ContentState,
    pub selection: SelectionStore,
    pub play_queue: PlayQueue,
    /// Playlists with an add in flight
    pub processing: HashSet<String>,
}

struct Areas {
    top_bar: Rect,
    sidebar: Rect,
    content: Rect,
    status: Rect,
}

fn split_screen(screen: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter + music folder
            Constraint::Min(0),    // Main content (sidebar + content)
            Constraint::Length(3), // Status bar
        ])
        .split(screen);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // Sidebar (sections + playlists)
            Constraint::Percentage(75), // Main content
        ])
        .split(chunks[1]);

    Areas {
        top_bar: chunks[0],
        sidebar: main_chunks[0],
        content: main_chunks[1],
        status: chunks[2],
    }
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, state: &ViewState) {
        let areas = split_screen(frame.area());

        layout::render_top_bar(frame, areas.top_bar, &state.ui_state, &state.content_state);

        layout::render_sidebar(
            frame,
            areas.sidebar,
            &state.ui_state,
            state.content_state.view.surface(),
            &state.processing,
        );

        let playing = state
            .play_queue
            .current()
            .map(|song| song.unique_id.as_str());
        content::render_main_content(
            frame,
            areas.content,
            &state.content_state,
            &state.selection,
            playing,
        );

        status::render_status_bar(
            frame,
            areas.status,
            &state.play_queue,
            &state.selection,
            state.processing.len(),
        );

        // Playlist picker overlay (if open)
        if state.ui_state.show_playlist_picker {
            overlays::render_playlist_picker(
                frame,
                &state.ui_state,
                state.selection.len(),
                &state.processing,
            );
        }

        // Help popup overlay (if open)
        if state.ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        // Notification toast (if any)
        if state.ui_state.notification.is_some() {
            overlays::render_notification(frame, &state.ui_state);
        }
    }

    /// Screen area holding the listing rows, for mouse hit-testing
    pub fn listing_area(screen: Rect) -> Rect {
        content::listing_rows_area(split_screen(screen).content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::model::{
        Directory, Entry, EntryKind, Notification, PlayQueueRequest, PlaylistItem, ContentView,
    };

    fn state() -> ViewState {
        let mut content_state = ContentState::default();
        content_state.set_view(ContentView::Folder {
            directory: Directory {
                id: "root".to_string(),
                name: "Music".to_string(),
                parent: None,
                children: vec![
                    Entry::new("jazz", EntryKind::Directory, "Jazz"),
                    Entry {
                        starred: true,
                        duration_secs: 200,
                        ..Entry::new("s1", EntryKind::Song, "Blue in Green")
                    },
                ],
            },
        });
        let rows = content_state.rows().to_vec();

        let mut selection = SelectionStore::new();
        selection.toggle_selected(&rows[1]);

        let mut play_queue = PlayQueue::default();
        if let Some(request) = PlayQueueRequest::from_row(&rows, &rows[1]) {
            play_queue.set_by_row_click(request);
        }

        let ui_state = UiState {
            playlists: vec![PlaylistItem {
                id: "p1".to_string(),
                name: "Road".to_string(),
                song_count: 2,
            }],
            show_playlist_picker: true,
            notification: Some(Notification::info("Hello")),
            ..Default::default()
        };

        ViewState {
            ui_state,
            content_state,
            selection,
            play_queue,
            processing: HashSet::from(["p1".to_string()]),
        }
    }

    #[test]
    fn test_render_full_frame() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let state = state();
        terminal.draw(|f| AppView::render(f, &state)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Blue in Green"));
        assert!(text.contains("1 selected"));
        assert!(text.contains("Road (adding...)"));
    }

    #[test]
    fn test_listing_area_is_inside_content() {
        let screen = Rect::new(0, 0, 120, 40);
        let listing = AppView::listing_area(screen);
        assert!(listing.x >= 30);
        // top bar (3) + border (1) + header (1)
        assert_eq!(listing.y, 5);
    }
}
