//! Main application model with state management

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::cache::{CacheName, MountedViews};
use super::content::{ContentState, ContentView};
use super::library_client::LibraryClient;
use super::playback::{PlayQueue, PlayQueueRequest};
use super::selection::SelectionStore;
use super::types::{Entry, Notification, PlaylistItem, Route, Surface, UiState};

/// Main application model containing all state
pub struct AppModel {
    pub library: Option<LibraryClient>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub selection: Arc<Mutex<SelectionStore>>,
    play_queue: Arc<Mutex<PlayQueue>>,
    mounted_views: Arc<Mutex<MountedViews>>,
    history: Arc<Mutex<Vec<Route>>>,
    viewport_height: Arc<Mutex<usize>>,
    notification_timeout: Duration,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(notification_timeout: Duration) -> Self {
        Self {
            library: None,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            selection: Arc::new(Mutex::new(SelectionStore::new())),
            play_queue: Arc::new(Mutex::new(PlayQueue::default())),
            mounted_views: Arc::new(Mutex::new(MountedViews::new())),
            history: Arc::new(Mutex::new(Vec::new())),
            viewport_height: Arc::new(Mutex::new(1)),
            notification_timeout,
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_library_client(&mut self, client: LibraryClient) {
        self.library = Some(client);
    }

    pub async fn get_library_client(&self) -> Option<LibraryClient> {
        self.library.clone()
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    /// Mount `view` in place of the current one.
    ///
    /// Row indices of the old listing mean nothing in the new one, so the
    /// selection is cleared with it.
    pub async fn mount_view(&self, view: ContentView) {
        let mut content = self.content_state.lock().await;
        let previous = content.view.cache_name();
        let next = view.cache_name();
        content.set_view(view);
        drop(content);

        self.mounted_views.lock().await.swap(previous, next);
        self.selection.lock().await.clear_selected();
    }

    /// Swap in re-fetched data if `cache` still backs the mounted view
    pub async fn refresh_view(&self, cache: CacheName, view: ContentView) -> bool {
        let mut content = self.content_state.lock().await;
        if content.view.cache_name() != Some(cache) {
            return false;
        }
        content.refresh_view(view);
        true
    }

    pub async fn is_mounted(&self, cache: CacheName) -> bool {
        self.mounted_views.lock().await.is_mounted(cache)
    }

    pub async fn current_view(&self) -> ContentView {
        self.content_state.lock().await.view.clone()
    }

    pub async fn current_surface(&self) -> Option<Surface> {
        self.content_state.lock().await.view.surface()
    }

    /// Rows as displayed (filtered and indexed)
    pub async fn displayed_rows(&self) -> Vec<Entry> {
        self.content_state.lock().await.rows().to_vec()
    }

    /// The mounted listing ignoring the search filter
    pub async fn full_listing(&self) -> Vec<Entry> {
        self.content_state.lock().await.view.source().to_vec()
    }

    pub async fn row_at(&self, index: usize) -> Option<Entry> {
        self.content_state.lock().await.row_at(index).cloned()
    }

    pub async fn cursor_entry(&self) -> Option<Entry> {
        self.content_state.lock().await.cursor_entry().cloned()
    }

    /// Rows the listing area showed on the last frame
    pub async fn set_viewport_height(&self, height: usize) {
        *self.viewport_height.lock().await = height;
    }

    pub async fn move_cursor(&self, delta: isize) {
        let height = *self.viewport_height.lock().await;
        self.content_state.lock().await.move_cursor(delta, height);
    }

    pub async fn set_cursor(&self, index: usize) {
        self.content_state.lock().await.set_cursor(index);
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub async fn append_to_search(&self, c: char) {
        let mut content = self.content_state.lock().await;
        let mut query = content.search_query.clone();
        query.push(c);
        content.set_search_query(query);
    }

    pub async fn backspace_search(&self) {
        let mut content = self.content_state.lock().await;
        let mut query = content.search_query.clone();
        query.pop();
        content.set_search_query(query);
    }

    pub async fn clear_search(&self) {
        self.content_state.lock().await.set_search_query(String::new());
    }

    pub async fn set_search_active(&self, active: bool) {
        self.ui_state.lock().await.search_active = active;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub async fn selection_snapshot(&self) -> Vec<Entry> {
        self.selection.lock().await.snapshot()
    }

    pub async fn selection_len(&self) -> usize {
        self.selection.lock().await.len()
    }

    pub async fn get_selection(&self) -> SelectionStore {
        self.selection.lock().await.clone()
    }

    pub async fn clear_selection(&self) {
        self.selection.lock().await.clear_selected();
    }

    /// Republish `entry` with `starred` flipped everywhere a copy is held
    pub async fn set_starred(&self, entry: &Entry, starred: bool) {
        self.content_state.lock().await.set_starred(&entry.id, starred);
        self.selection
            .lock()
            .await
            .republish(&entry.with_starred(starred));
        self.play_queue.lock().await.set_starred(&entry.id, starred);
    }

    // ========================================================================
    // Play queue
    // ========================================================================

    pub async fn set_play_queue(&self, request: PlayQueueRequest) {
        self.play_queue.lock().await.set_by_row_click(request);
    }

    pub async fn get_play_queue(&self) -> PlayQueue {
        self.play_queue.lock().await.clone()
    }

    // ========================================================================
    // Navigation history
    // ========================================================================

    pub async fn push_route(&self, route: Route) {
        self.history.lock().await.push(route);
    }

    /// Drop the current route and return the one before it
    pub async fn pop_route(&self) -> Option<Route> {
        let mut history = self.history.lock().await;
        if history.len() < 2 {
            return None;
        }
        history.pop();
        history.last().cloned()
    }

    pub async fn current_route(&self) -> Option<Route> {
        self.history.lock().await.last().cloned()
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub async fn notify(&self, notification: Notification) {
        self.ui_state.lock().await.notification = Some(notification);
    }

    pub async fn set_error(&self, message: String) {
        self.notify(Notification::error(message)).await;
    }

    pub async fn has_notification(&self) -> bool {
        self.ui_state.lock().await.notification.is_some()
    }

    pub async fn clear_notification(&self) {
        self.ui_state.lock().await.notification = None;
    }

    /// Take the deep link of the current notification, dismissing it
    pub async fn take_notification_action(&self) -> Option<Route> {
        let mut ui_state = self.ui_state.lock().await;
        let action = ui_state.notification.as_ref()?.action.clone()?;
        ui_state.notification = None;
        Some(action)
    }

    pub async fn auto_clear_old_notifications(&self) {
        let mut ui_state = self.ui_state.lock().await;
        if let Some(notification) = &ui_state.notification {
            if notification.created_at.elapsed() >= self.notification_timeout {
                ui_state.notification = None;
            }
        }
    }

    // ========================================================================
    // Music folders and sidebar
    // ========================================================================

    pub async fn set_music_folders(&self, folders: Vec<Entry>) {
        let mut ui_state = self.ui_state.lock().await;
        ui_state.music_folders = folders;
        ui_state.music_folder_selected = 0;
    }

    /// Advance to the next music folder, wrapping around
    pub async fn next_music_folder(&self) -> Option<Entry> {
        let mut ui_state = self.ui_state.lock().await;
        if ui_state.music_folders.is_empty() {
            return None;
        }
        ui_state.music_folder_selected =
            (ui_state.music_folder_selected + 1) % ui_state.music_folders.len();
        ui_state.music_folders.get(ui_state.music_folder_selected).cloned()
    }

    pub async fn current_music_folder(&self) -> Option<Entry> {
        let ui_state = self.ui_state.lock().await;
        ui_state.music_folders.get(ui_state.music_folder_selected).cloned()
    }

    /// Move the sidebar highlight by `delta` (wrapping) and return that playlist
    pub async fn sidebar_step(&self, delta: isize) -> Option<PlaylistItem> {
        let mut ui_state = self.ui_state.lock().await;
        let count = ui_state.playlists.len() as isize;
        if count == 0 {
            return None;
        }
        ui_state.playlist_selected =
            (ui_state.playlist_selected as isize + delta).rem_euclid(count) as usize;
        ui_state.playlists.get(ui_state.playlist_selected).cloned()
    }

    // ========================================================================
    // Playlists and picker
    // ========================================================================

    pub async fn set_playlists(&self, playlists: Vec<PlaylistItem>) {
        let mut ui_state = self.ui_state.lock().await;
        ui_state.playlists = playlists;
        let last = ui_state.playlists.len().saturating_sub(1);
        ui_state.picker_selected = ui_state.picker_selected.min(last);
        ui_state.playlist_selected = ui_state.playlist_selected.min(last);
    }

    pub async fn playlist_name(&self, playlist_id: &str) -> Option<String> {
        let ui_state = self.ui_state.lock().await;
        ui_state
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .map(|p| p.name.clone())
    }

    pub async fn is_playlist_picker_open(&self) -> bool {
        self.ui_state.lock().await.show_playlist_picker
    }

    pub async fn show_playlist_picker(&self) {
        self.ui_state.lock().await.show_playlist_picker = true;
    }

    pub async fn hide_playlist_picker(&self) {
        self.ui_state.lock().await.show_playlist_picker = false;
    }

    pub async fn picker_move(&self, delta: isize) {
        let mut ui_state = self.ui_state.lock().await;
        let last = ui_state.playlists.len().saturating_sub(1);
        ui_state.picker_selected = ui_state.picker_selected.saturating_add_signed(delta).min(last);
    }

    pub async fn picked_playlist(&self) -> Option<PlaylistItem> {
        self.ui_state.lock().await.picked_playlist().cloned()
    }

    // ========================================================================
    // Misc UI
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn toggle_help_popup(&self) {
        let mut ui_state = self.ui_state.lock().await;
        ui_state.show_help_popup = !ui_state.show_help_popup;
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}
