//! Navigation-related controller methods (folders, favorites, albums, playlists)

use anyhow::Result;

use crate::model::{ContentView, Entry, LibraryClient, Notification, Route};
use super::AppController;

impl AppController {
    /// Load the music folders and open the first one
    pub async fn load_music_folders(&self) {
        let model = self.model.lock().await;

        if let Some(library) = &model.library {
            match library.music_folders().await {
                Ok(folders) => {
                    tracing::info!(count = folders.len(), "Music folders loaded");
                    let first = folders.first().cloned();
                    model.set_music_folders(folders).await;
                    drop(model);
                    if let Some(folder) = first {
                        self.open_route(Route::Folder(folder.id)).await;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load music folders");
                    model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }

    pub async fn next_music_folder(&self) {
        let model = self.model.lock().await;
        let next = model.next_music_folder().await;
        drop(model);
        if let Some(folder) = next {
            self.open_route(Route::Folder(folder.id)).await;
        }
    }

    pub async fn load_playlists(&self) {
        let model = self.model.lock().await;

        if let Some(library) = &model.library {
            match library.get_playlists().await {
                Ok(playlists) => {
                    model.set_playlists(playlists).await;
                }
                Err(e) => {
                    model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }

    /// Open the next (or previous) playlist of the sidebar
    pub async fn step_sidebar_playlist(&self, delta: isize) {
        let model = self.model.lock().await;
        let playlist = model.sidebar_step(delta).await;
        drop(model);
        if let Some(playlist) = playlist {
            self.open_route(Route::Playlist(playlist.id)).await;
        }
    }

    /// Push a path; unknown paths are reported, not followed
    pub async fn navigate(&self, path: &str) {
        match Route::parse(path) {
            Some(route) => self.open_route(route).await,
            None => {
                tracing::warn!(path, "Unknown navigation path");
                let model = self.model.lock().await;
                model.set_error(format!("Unknown location: {}", path)).await;
            }
        }
    }

    pub async fn open_route(&self, route: Route) {
        self.show_route(route, true).await;
    }

    pub async fn navigate_back(&self) {
        let model = self.model.lock().await;
        let previous = model.pop_route().await;
        drop(model);
        if let Some(route) = previous {
            self.show_route(route, false).await;
        }
    }

    /// Open the parent of the mounted folder
    pub async fn go_up(&self) {
        let model = self.model.lock().await;
        let parent = match model.current_view().await {
            ContentView::Folder { directory } => directory.parent,
            _ => None,
        };
        let Some(parent) = parent else {
            model.notify(Notification::info("Already at the top folder")).await;
            return;
        };
        drop(model);
        self.open_route(Route::Folder(parent)).await;
    }

    pub async fn switch_starred_tab(&self) {
        let model = self.model.lock().await;
        if let ContentView::Starred { starred, tab } = model.current_view().await {
            model
                .mount_view(ContentView::Starred {
                    starred,
                    tab: tab.toggle(),
                })
                .await;
        }
    }

    /// Follow the deep link offered by the current notification
    pub async fn follow_notification_action(&self) {
        let model = self.model.lock().await;
        let action = model.take_notification_action().await;
        drop(model);
        if let Some(route) = action {
            self.navigate(&route.path()).await;
        }
    }

    /// Re-fetch the mounted view in place
    pub async fn reload_view(&self) {
        let model = self.model.lock().await;
        let view = model.current_view().await;
        let Some(cache) = view.cache_name() else {
            return;
        };

        if let Some(library) = &model.library {
            match Self::refetch_view(library, &view).await {
                Ok(fresh) => {
                    model.refresh_view(cache, fresh).await;
                }
                Err(e) => {
                    tracing::error!(cache = %cache, error = %e, "Reload failed");
                    model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }

    /// Double-click action: descend into directory-like rows, play songs
    pub(crate) async fn activate_row(&self, entry: Entry) {
        match Route::for_entry(&entry) {
            Some(route) => self.open_route(route).await,
            None => self.play_from_row(&entry).await,
        }
    }

    async fn show_route(&self, route: Route, push: bool) {
        tracing::debug!(path = %route.path(), "Opening route");
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(library) = &model.library {
            match Self::load_route(library, &route).await {
                Ok(view) => {
                    model.mount_view(view).await;
                    // Re-opening the current location does not grow the history
                    if push && model.current_route().await.as_ref() != Some(&route) {
                        model.push_route(route).await;
                    }
                }
                Err(e) => {
                    tracing::error!(path = %route.path(), error = %e, "Failed to open route");
                    model.set_content_loading(false).await;
                    model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }

    pub(crate) async fn load_route(library: &LibraryClient, route: &Route) -> Result<ContentView> {
        let view = match route {
            Route::Folder(id) => ContentView::Folder {
                directory: library.get_directory(id).await?,
            },
            Route::Album(id) => ContentView::Album {
                detail: library.get_album(id).await?,
            },
            Route::AlbumList => ContentView::AlbumList {
                albums: library.get_album_list().await?,
            },
            Route::Starred => ContentView::Starred {
                starred: library.get_starred().await?,
                tab: Default::default(),
            },
            Route::Playlist(id) => ContentView::Playlist {
                detail: library.get_playlist(id).await?,
            },
        };
        Ok(view)
    }

    /// Fetch fresh data for `view`, keeping its presentation (the favorites tab)
    pub(crate) async fn refetch_view(library: &LibraryClient, view: &ContentView) -> Result<ContentView> {
        match view {
            ContentView::Starred { tab, .. } => Ok(ContentView::Starred {
                starred: library.get_starred().await?,
                tab: *tab,
            }),
            other => match other.route() {
                Some(route) => Self::load_route(library, &route).await,
                None => Ok(ContentView::Empty),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    use crate::config::AppConfig;
    use crate::model::{AppModel, LibraryData, StarredTab, Surface};
    use super::*;

    fn controller() -> AppController {
        let data: LibraryData = serde_json::from_value(serde_json::json!({
            "folders": [
                { "id": "root", "name": "Music" },
                { "id": "jazz", "name": "Jazz", "parent": "root" }
            ],
            "albums": [{ "id": "al1", "name": "Blue", "artist": "Aria" }],
            "songs": [
                { "id": "s1", "title": "One", "artist": "Aria", "album_id": "al1", "folder_id": "jazz" }
            ],
            "starred": [{ "id": "al1", "kind": "album", "at": "2024-01-01T00:00:00Z" }]
        }))
        .unwrap();
        let library = LibraryClient::new(data);
        let mut model = AppModel::new(Duration::from_secs(5));
        model.set_library_client(library.clone());
        AppController::new(Arc::new(Mutex::new(model)), library, &AppConfig::default())
    }

    async fn surface(controller: &AppController) -> Option<Surface> {
        controller.model.lock().await.current_surface().await
    }

    #[tokio::test]
    async fn test_double_click_on_directory_descends_and_go_up_returns() {
        let controller = controller();
        controller.load_music_folders().await;
        let jazz = controller.model.lock().await.row_at(0).await.unwrap();

        controller.activate_row(jazz).await;
        assert_eq!(
            controller.model.lock().await.current_route().await,
            Some(Route::Folder("jazz".to_string()))
        );

        controller.go_up().await;
        assert_eq!(
            controller.model.lock().await.current_route().await,
            Some(Route::Folder("root".to_string()))
        );
    }

    #[tokio::test]
    async fn test_go_up_at_root_only_notifies() {
        let controller = controller();
        controller.load_music_folders().await;
        controller.go_up().await;
        let model = controller.model.lock().await;
        assert!(model.has_notification().await);
        assert_eq!(model.current_route().await, Some(Route::Folder("root".to_string())));
    }

    #[tokio::test]
    async fn test_back_restores_previous_view() {
        let controller = controller();
        controller.navigate("/library/folder/root").await;
        controller.navigate("/starred").await;
        assert_eq!(surface(&controller).await, Some(Surface::StarredTracks));

        controller.navigate_back().await;
        assert_eq!(surface(&controller).await, Some(Surface::Folder));
    }

    #[tokio::test]
    async fn test_unknown_path_is_reported() {
        let controller = controller();
        controller.navigate("/settings").await;
        let model = controller.model.lock().await;
        assert!(model.has_notification().await);
        assert_eq!(model.current_route().await, None);
    }

    #[tokio::test]
    async fn test_starred_tab_switch_and_album_double_click() {
        let controller = controller();
        controller.open_route(Route::Starred).await;
        controller.switch_starred_tab().await;
        assert_eq!(surface(&controller).await, Some(Surface::StarredAlbums));

        let album = controller.model.lock().await.row_at(0).await.unwrap();
        controller.activate_row(album).await;
        assert_eq!(surface(&controller).await, Some(Surface::Album));
    }

    #[tokio::test]
    async fn test_refetch_keeps_favorites_tab() {
        let controller = controller();
        let library = controller.model.lock().await.get_library_client().await.unwrap();
        let view = ContentView::Starred {
            starred: Default::default(),
            tab: StarredTab::Albums,
        };
        let fresh = AppController::refetch_view(&library, &view).await.unwrap();
        assert_eq!(fresh.surface(), Some(Surface::StarredAlbums));
        assert_eq!(fresh.source().len(), 1);
    }
}
