//! Selection actions: favorite, unfavorite, add to playlist

use crate::model::{CacheName, Entry, InFlightHandle, Notification, Route};
use super::batch::{BatchOutcome, MutationKind, OptimisticSink};
use super::invalidate::QueryCache;
use super::AppController;

impl OptimisticSink for AppController {
    async fn apply_starred(&self, entry: &Entry, starred: bool) {
        let model = self.model.lock().await;
        model.set_starred(entry, starred).await;
    }
}

impl QueryCache for AppController {
    async fn refetch_active(&self, cache: CacheName) -> anyhow::Result<bool> {
        let model = self.model.lock().await;
        let Some(library) = model.get_library_client().await else {
            return Ok(false);
        };

        // The sidebar consumes the playlist query whatever view is mounted
        let mut refetched = false;
        if cache == CacheName::Playlist {
            let playlists = library.get_playlists().await?;
            model.set_playlists(playlists).await;
            refetched = true;
        }

        if !model.is_mounted(cache).await {
            return Ok(refetched);
        }
        let view = model.current_view().await;
        drop(model);

        let fresh = Self::refetch_view(&library, &view).await?;
        let model = self.model.lock().await;
        Ok(model.refresh_view(cache, fresh).await || refetched)
    }
}

impl AppController {
    pub async fn favorite_selection(&self, ordered: bool) {
        let kind = if ordered {
            MutationKind::FavoriteOrdered
        } else {
            MutationKind::Favorite
        };
        self.start_batch(kind, None).await;
    }

    pub async fn unfavorite_selection(&self) {
        self.start_batch(MutationKind::Unfavorite, None).await;
    }

    pub async fn open_playlist_picker(&self) {
        let model = self.model.lock().await;
        if model.selection_len().await == 0 {
            model.notify(Notification::info("Select songs to add first")).await;
            return;
        }
        model.show_playlist_picker().await;
    }

    /// Submit the picker; a no-op while the chosen playlist is still processing.
    ///
    /// The playlist is claimed here, before the batch is spawned, so a second
    /// submit finds it busy right away.
    pub async fn submit_playlist_picker(&self) {
        let model = self.model.lock().await;
        let Some(playlist) = model.picked_playlist().await else {
            return;
        };
        let kind = MutationKind::AddToPlaylist {
            playlist_id: playlist.id.clone(),
        };
        let Ok(reservation) = self.executor.reserve(&kind) else {
            tracing::debug!(playlist_id = %playlist.id, "Picker submit ignored, playlist busy");
            return;
        };
        model.hide_playlist_picker().await;
        drop(model);

        self.start_batch(kind, reservation).await;
    }

    /// Snapshot what the batch needs and run it in the background
    async fn start_batch(&self, kind: MutationKind, reservation: Option<InFlightHandle>) {
        let model = self.model.lock().await;
        let snapshot = model.selection_snapshot().await;
        let playlist_name = match &kind {
            MutationKind::AddToPlaylist { playlist_id } => model.playlist_name(playlist_id).await,
            _ => None,
        };
        drop(model);

        if snapshot.is_empty() && !matches!(kind, MutationKind::AddToPlaylist { .. }) {
            return;
        }

        let controller = self.clone();
        tokio::spawn(async move {
            controller
                .run_batch(kind, snapshot, reservation, playlist_name)
                .await;
        });
    }

    pub(crate) async fn run_batch(
        &self,
        kind: MutationKind,
        snapshot: Vec<Entry>,
        reservation: Option<InFlightHandle>,
        playlist_name: Option<String>,
    ) {
        let result = self
            .executor
            .execute(kind, snapshot, reservation, self, self)
            .await;

        let notification = match result {
            Ok(BatchOutcome::Populated { playlist_id, count }) => {
                let name = playlist_name.unwrap_or_else(|| playlist_id.clone());
                Notification::success(
                    format!("Added {} song(s) to playlist \"{}\"", count, name),
                    Some(Route::Playlist(playlist_id)),
                )
            }
            Ok(BatchOutcome::Starred { count }) => {
                Notification::success(format!("Added {} item(s) to favorites", count), None)
            }
            Ok(BatchOutcome::Unstarred { count }) => {
                Notification::info(format!("Removed {} item(s) from favorites", count))
            }
            Err(e) => Notification::error(Self::format_mutation_error(&e)),
        };

        let model = self.model.lock().await;
        model.notify(notification).await;
    }
}
