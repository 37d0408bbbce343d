//! Key and mouse event handling

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::model::{Modifiers, Route};
use super::click::{self, ClickEvent, SingleClick};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.toggle_help_popup().await;
            }
            return Ok(());
        }

        // Handle playlist picker modal
        if model.is_playlist_picker_open().await {
            match key.code {
                KeyCode::Up => model.picker_move(-1).await,
                KeyCode::Down => model.picker_move(1).await,
                KeyCode::Enter => {
                    drop(model);
                    self.submit_playlist_picker().await;
                }
                KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('A') => {
                    model.hide_playlist_picker().await;
                }
                _ => {}
            }
            return Ok(());
        }

        // Handle search input
        if model.get_ui_state().await.search_active {
            match key.code {
                KeyCode::Enter => model.set_search_active(false).await,
                KeyCode::Esc => {
                    model.clear_search().await;
                    model.set_search_active(false).await;
                }
                KeyCode::Backspace => model.backspace_search().await,
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                    } else {
                        model.append_to_search(c).await;
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Char('/') => {
                model.set_search_active(true).await;
            }
            KeyCode::Up => model.move_cursor(-1).await,
            KeyCode::Down => model.move_cursor(1).await,
            KeyCode::PageUp => model.move_cursor(-10).await,
            KeyCode::PageDown => model.move_cursor(10).await,
            // Same as a double click on the cursor row
            KeyCode::Enter => {
                if let Some(entry) = model.cursor_entry().await {
                    model.clear_selection().await;
                    drop(model);
                    self.activate_row(entry).await;
                }
            }
            // Keyboard counterparts of Ctrl+click and Shift+click
            KeyCode::Char(' ') => {
                drop(model);
                self.select_cursor_row(Modifiers::CTRL).await;
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                drop(model);
                self.select_cursor_row(Modifiers::SHIFT).await;
            }
            KeyCode::Esc => {
                if model.has_notification().await {
                    model.clear_notification().await;
                } else {
                    model.clear_selection().await;
                }
            }
            KeyCode::Char('f') => {
                drop(model);
                self.favorite_selection(false).await;
            }
            KeyCode::Char('F') | KeyCode::Char('o') | KeyCode::Char('O') => {
                drop(model);
                self.favorite_selection(true).await;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.unfavorite_selection().await;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                drop(model);
                self.open_playlist_picker().await;
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                drop(model);
                self.follow_notification_action().await;
            }
            KeyCode::Backspace => {
                drop(model);
                self.navigate_back().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.go_up().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                self.reload_view().await;
            }
            KeyCode::Char('1') => {
                let folder = model.current_music_folder().await;
                drop(model);
                if let Some(folder) = folder {
                    self.open_route(Route::Folder(folder.id)).await;
                }
            }
            KeyCode::Char('2') => {
                drop(model);
                self.open_route(Route::Starred).await;
            }
            KeyCode::Char('3') => {
                drop(model);
                self.open_route(Route::AlbumList).await;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                drop(model);
                self.next_music_folder().await;
            }
            KeyCode::Left | KeyCode::Right => {
                drop(model);
                self.switch_starred_tab().await;
            }
            KeyCode::Tab => {
                drop(model);
                self.step_sidebar_playlist(1).await;
            }
            KeyCode::BackTab => {
                drop(model);
                self.step_sidebar_playlist(-1).await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.toggle_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Mouse input over the listing; `listing` is where its rows were drawn
    pub async fn handle_mouse_event(&self, mouse: MouseEvent, listing: Rect, now: Instant) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let inside = mouse.column >= listing.x
                    && mouse.column < listing.x + listing.width
                    && mouse.row >= listing.y
                    && mouse.row < listing.y + listing.height;
                if !inside {
                    return;
                }
                let offset = self.model.lock().await.get_content_state().await.offset;
                let index = offset + (mouse.row - listing.y) as usize;
                self.handle_pointer_down(index, mouse.modifiers.into(), now).await;
            }
            MouseEventKind::ScrollUp => self.model.lock().await.move_cursor(-1).await,
            MouseEventKind::ScrollDown => self.model.lock().await.move_cursor(1).await,
            _ => {}
        }
    }

    /// Pointer-down on displayed row `index` of the mounted surface
    pub async fn handle_pointer_down(&self, index: usize, modifiers: Modifiers, now: Instant) {
        let model = self.model.lock().await;
        let (Some(surface), Some(entry)) = (model.current_surface().await, model.row_at(index).await)
        else {
            return;
        };
        model.set_cursor(index).await;
        drop(model);

        let events = self
            .clicks
            .lock()
            .await
            .pointer_down(surface, entry, modifiers, now);
        self.dispatch_clicks(events).await;
    }

    pub(crate) async fn dispatch_clicks(&self, events: Vec<ClickEvent>) {
        for event in events {
            match event {
                ClickEvent::Single(click) => {
                    let model = self.model.lock().await;
                    // The listing may have changed under a late click
                    if model.current_surface().await != Some(click.surface) {
                        continue;
                    }
                    let listing = model.displayed_rows().await;
                    let mut selection = model.selection.lock().await;
                    click::apply_single_click(&mut selection, &click, &listing);
                }
                ClickEvent::Double { entry, .. } => {
                    let model = self.model.lock().await;
                    model.clear_selection().await;
                    drop(model);
                    self.activate_row(entry).await;
                }
            }
        }
    }

    async fn select_cursor_row(&self, modifiers: Modifiers) {
        let model = self.model.lock().await;
        let (Some(surface), Some(entry)) = (model.current_surface().await, model.cursor_entry().await)
        else {
            return;
        };
        drop(model);
        self.dispatch_clicks(vec![ClickEvent::Single(SingleClick {
            surface,
            entry,
            modifiers,
        })])
        .await;
    }
}
