//! Layout rendering (top bar, sidebar)

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ContentState, Surface, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, content_state: &ContentState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),        // Search input
            Constraint::Length(25),    // Music folder
        ])
        .split(area);

    let search_style = if ui_state.search_active {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if content_state.search_query.is_empty() && !ui_state.search_active {
        "Press / to filter..."
    } else {
        content_state.search_query.as_str()
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter ")
                .padding(Padding::horizontal(1))
                .border_style(if ui_state.search_active {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let folder_name = ui_state
        .music_folders
        .get(ui_state.music_folder_selected)
        .map(|f| f.title.as_str())
        .unwrap_or("-");
    let folder = Paragraph::new(format!("♫ {}", folder_name))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Music folder (M) "));
    frame.render_widget(folder, chunks[1]);
}

const SECTIONS: [(&str, &str); 3] = [("1", "Folders"), ("2", "Favorites"), ("3", "Albums")];

pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    current: Option<Surface>,
    processing: &HashSet<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Sections (3 items + 2 borderlines)
            Constraint::Min(0),    // Playlists (fills remaining space)
        ])
        .split(area);

    let active_section = match current {
        Some(Surface::Folder) => Some(0),
        Some(Surface::StarredTracks) | Some(Surface::StarredAlbums) => Some(1),
        Some(Surface::AlbumList) | Some(Surface::Album) => Some(2),
        _ => None,
    };

    let section_items: Vec<ListItem> = SECTIONS
        .iter()
        .enumerate()
        .map(|(i, (key, name))| {
            let style = if Some(i) == active_section {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{}  {}", key, name)).style(style)
        })
        .collect();

    let sections = List::new(section_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(sections, chunks[0]);

    let in_playlist = current == Some(Surface::Playlist);
    let playlist_items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ui_state.playlist_selected && in_playlist {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            // Adds in flight show a busy marker instead of the count
            let suffix = if processing.contains(&item.id) {
                " ⟳".to_string()
            } else {
                format!(" ({})", item.song_count)
            };
            ListItem::new(format!("{}{}", item.name, suffix)).style(style)
        })
        .collect();

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists (Tab) ")
                .padding(Padding::horizontal(1))
                .border_style(if in_playlist {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}
