//! Main content area rendering (the mounted listing)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ContentState, ContentView, Entry, EntryKind, SelectionStore};
use super::utils::{calculate_num_width, format_duration, truncate_string};

fn content_block(title: String, is_busy: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(if is_busy {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green)
        })
}

/// Where listing rows are drawn inside the content `area` (below the header)
pub fn listing_rows_area(area: Rect) -> Rect {
    let inner = content_block(String::new(), false).inner(area);
    Rect {
        y: inner.y.saturating_add(1),
        height: inner.height.saturating_sub(1),
        ..inner
    }
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    content_state: &ContentState,
    selection: &SelectionStore,
    playing_unique_id: Option<&str>,
) {
    let title = content_state.view.title();

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(content_block(title, true));
        frame.render_widget(loading, area);
        return;
    }

    if let ContentView::Empty = content_state.view {
        let content = Paragraph::new("Press 1 for folders, 2 for favorites, 3 for albums\n\nPress H for help")
            .style(Style::default().fg(Color::DarkGray))
            .block(content_block(title, false));
        frame.render_widget(content, area);
        return;
    }

    let block = content_block(title, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows_area = listing_rows_area(area);
    let rows = content_state.rows();
    let content_width = inner.width as usize;
    let columns = Columns::new(content_width, rows.len());

    let header = Paragraph::new(columns.header()).style(
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    );
    frame.render_widget(header, Rect { height: 1.min(inner.height), ..inner });

    if rows.is_empty() {
        let empty_text = if content_state.search_query.is_empty() {
            "Nothing here"
        } else {
            "No matches"
        };
        let empty = Paragraph::new(empty_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows_area);
        return;
    }

    let visible = rows
        .iter()
        .skip(content_state.offset)
        .take(rows_area.height as usize);

    let items: Vec<ListItem> = visible
        .map(|entry| {
            let is_cursor = entry.row_index == content_state.cursor;
            let is_selected = selection.is_selected(entry);
            let is_playing = playing_unique_id == Some(entry.unique_id.as_str());
            let mut style = if is_cursor {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_playing {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if is_selected {
                style = style.bg(Color::DarkGray);
            }
            ListItem::new(columns.row(entry, is_selected, is_playing)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items), rows_area);
}

/// Column widths of a listing: " {mark}{num}   {star}   {title}   {artist}   {duration}"
struct Columns {
    num_width: usize,
    title_width: usize,
    artist_width: usize,
}

impl Columns {
    const STAR_WIDTH: usize = 1;
    const DURATION_WIDTH: usize = 8;

    fn new(content_width: usize, item_count: usize) -> Self {
        let num_width = calculate_num_width(item_count);
        let fixed_width = 2 + num_width + 3 + Self::STAR_WIDTH + 3 + 3 + 3 + Self::DURATION_WIDTH;
        let remaining_width = content_width.saturating_sub(fixed_width);
        let title_width = (remaining_width * 55) / 100;
        let artist_width = remaining_width.saturating_sub(title_width);
        Self {
            num_width,
            title_width,
            artist_width,
        }
    }

    fn header(&self) -> String {
        format!(
            "  {:<num_width$}   {}   {:<title_width$}   {:<artist_width$}   {}",
            "#",
            " ",
            "Title",
            "Artist",
            "Duration",
            num_width = self.num_width,
            title_width = self.title_width,
            artist_width = self.artist_width
        )
    }

    fn row(&self, entry: &Entry, is_selected: bool, is_playing: bool) -> Line<'static> {
        let mark = if is_playing {
            "▶"
        } else if is_selected {
            "●"
        } else {
            " "
        };
        let num = format!("{:<num_width$}", entry.row_index + 1, num_width = self.num_width);
        let star = if entry.starred { "★" } else { " " };

        let title = match entry.kind {
            EntryKind::Directory => format!("▸ {}", entry.title),
            EntryKind::Album | EntryKind::Song => entry.title.clone(),
        };
        let duration = match entry.kind {
            EntryKind::Song => format_duration(entry.duration_secs),
            EntryKind::Album => "album".to_string(),
            EntryKind::Directory => "folder".to_string(),
        };

        Line::from(vec![
            Span::raw(format!(" {}{}   ", mark, num)),
            Span::styled(star, Style::default().fg(Color::Yellow)),
            Span::raw(format!(
                "   {}   {}   {}",
                truncate_string(&title, self.title_width),
                truncate_string(&entry.artist, self.artist_width),
                duration
            )),
        ])
    }
}
