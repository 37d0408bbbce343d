//! Play queue seeding from a listing row

use crate::model::{Entry, PlayQueueRequest};
use super::AppController;

impl AppController {
    /// Queue the songs of the full listing, starting at `row`.
    ///
    /// The search filter does not narrow the queue.
    pub(crate) async fn play_from_row(&self, row: &Entry) {
        let model = self.model.lock().await;
        let listing = model.full_listing().await;

        match PlayQueueRequest::from_row(&listing, row) {
            Some(request) => {
                tracing::info!(
                    song_id = %request.current_song_id,
                    index = request.current_index,
                    queued = request.entries.len(),
                    "Play queue set from row"
                );
                model.set_play_queue(request).await;
            }
            None => {
                tracing::warn!(id = %row.id, "Row not in the mounted listing");
            }
        }
    }
}
