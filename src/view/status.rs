//! Status bar rendering (now playing, selection count, busy playlists)

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::{PlayQueue, PlayerStatus, SelectionStore};
use super::utils::format_duration;

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    play_queue: &PlayQueue,
    selection: &SelectionStore,
    processing_count: usize,
) {
    let status_text = match (play_queue.status, play_queue.current()) {
        (PlayerStatus::Playing, Some(song)) => format!(
            " ▶ {} | {} ({}) ",
            song.title,
            song.artist,
            format_duration(song.duration_secs)
        ),
        _ => " Nothing playing ".to_string(),
    };

    let queue_text = if play_queue.entries.is_empty() {
        String::new()
    } else {
        format!(
            "Queue {}/{}",
            play_queue.current_index + 1,
            play_queue.entries.len()
        )
    };

    let mut info = if selection.is_empty() {
        " No selection ".to_string()
    } else {
        match selection.anchor() {
            Some(anchor) => format!(" {} selected (from {}) ", selection.len(), anchor.title),
            None => format!(" {} selected ", selection.len()),
        }
    };
    if processing_count > 0 {
        info.push_str(&format!("| adding to {} playlist(s) ", processing_count));
    }

    let bar = Paragraph::new(queue_text)
        .style(Style::default().fg(Color::Green))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(status_text)
                .title_bottom(Line::from(info).right_aligned()),
        );

    frame.render_widget(bar, area);
}
