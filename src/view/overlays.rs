//! Overlay rendering (notification toast, playlist picker, help popup)

use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{NotificationLevel, UiState};
use super::utils::centered_popup;

pub fn render_notification(frame: &mut Frame, ui_state: &UiState) {
    let Some(notification) = &ui_state.notification else {
        return;
    };
    let area = frame.area();

    let (color, title) = match notification.level {
        NotificationLevel::Success => (Color::Green, " Done "),
        NotificationLevel::Error => (Color::Red, " Error "),
        NotificationLevel::Info => (Color::Cyan, " Info "),
    };
    let hint = if notification.action.is_some() {
        " G: go to playlist  Esc: dismiss "
    } else {
        " Esc: dismiss "
    };

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(2).max(1) as usize;
    let line_count = notification.message.chars().count().div_ceil(inner_width).max(1) as u16;

    // Bottom-right corner, above the status bar
    let popup_height = (2 + line_count).min(area.height.saturating_sub(4));
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width + 1),
        y: area.height.saturating_sub(popup_height + 3),
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let toast = Paragraph::new(notification.message.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_bottom(Line::from(hint).right_aligned())
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(toast, popup_area);
}

/// Playlist picker; entries with an add in flight are shown disabled
pub fn render_playlist_picker(
    frame: &mut Frame,
    ui_state: &UiState,
    selected_count: usize,
    processing: &HashSet<String>,
) {
    let max_name_len = ui_state
        .playlists
        .iter()
        .map(|p| p.name.chars().count() + 14)
        .max()
        .unwrap_or(30);

    let popup_width = (max_name_len as u16 + 6).clamp(40, 60);
    let popup_height = (ui_state.playlists.len() as u16 + 2).max(5);
    let popup_area = centered_popup(frame.area(), popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let is_selected = i == ui_state.picker_selected;
            let is_busy = processing.contains(&playlist.id);

            let text = if is_busy {
                format!("{} (adding...)", playlist.name)
            } else {
                format!("{} ({})", playlist.name, playlist.song_count)
            };

            let style = match (is_selected, is_busy) {
                (true, false) => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                (true, true) => Style::default().fg(Color::Black).bg(Color::DarkGray),
                (false, true) => Style::default().fg(Color::DarkGray),
                (false, false) => Style::default().fg(Color::White),
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Add {} song(s) to (↑↓ Enter Esc) ", selected_count))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.picker_selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_help_popup(frame: &mut Frame) {
    // Define keybindings organized by category
    let keybindings = vec![
        ("", "── Navigation ──"),
        ("1 / 2 / 3", "Folders / Favorites / Albums"),
        ("M", "Next music folder"),
        ("Tab / Shift+Tab", "Next / previous playlist"),
        ("↑ / ↓", "Move cursor"),
        ("← / →", "Favorites: tracks / albums"),
        ("Enter", "Open / Play (as double click)"),
        ("P", "Parent folder"),
        ("Backspace", "Go back"),
        ("/", "Filter listing"),
        ("R", "Reload"),
        ("", ""),
        ("", "── Selection ──"),
        ("Ctrl+Click / Space", "Toggle row"),
        ("Shift+Click / V", "Toggle range from anchor"),
        ("Double click", "Open / Play"),
        ("Esc", "Clear selection"),
        ("", ""),
        ("", "── Actions ──"),
        ("F", "Add to favorites"),
        ("O", "Add to favorites (ordered)"),
        ("U", "Remove from favorites"),
        ("A", "Add to playlist"),
        ("G", "Go to playlist (after adding)"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_height = keybindings.len() as u16 + 2;
    let popup_area = centered_popup(frame.area(), 62, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    // Create help text lines
    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>20}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
