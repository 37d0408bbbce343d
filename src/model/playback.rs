//! Play queue state seeded from a listing

use super::types::{Entry, EntryKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerStatus {
    #[default]
    Stopped,
    Playing,
}

/// What a double click on a song hands to the play queue
#[derive(Clone, Debug, PartialEq)]
pub struct PlayQueueRequest {
    pub entries: Vec<Entry>,
    pub current_index: usize,
    pub current_song_id: String,
    pub unique_song_id: String,
}

impl PlayQueueRequest {
    /// Queue every song of `listing`, starting at `row`.
    ///
    /// Directories and albums are left out; the start position is looked up by
    /// `unique_id` so a filtered row still lands on the right song.
    pub fn from_row(listing: &[Entry], row: &Entry) -> Option<Self> {
        let entries: Vec<Entry> = listing
            .iter()
            .filter(|e| e.kind == EntryKind::Song)
            .cloned()
            .collect();
        let current_index = entries.iter().position(|e| e.unique_id == row.unique_id)?;
        Some(Self {
            entries,
            current_index,
            current_song_id: row.id.clone(),
            unique_song_id: row.unique_id.clone(),
        })
    }
}

/// The play queue as seen by the rest of the UI
#[derive(Clone, Debug, Default)]
pub struct PlayQueue {
    pub entries: Vec<Entry>,
    pub current_index: usize,
    pub current_song_id: String,
    pub unique_song_id: String,
    pub status: PlayerStatus,
}

impl PlayQueue {
    /// Replace the queue with `request` and start playing
    pub fn set_by_row_click(&mut self, request: PlayQueueRequest) {
        self.entries = request.entries;
        self.current_index = request.current_index;
        self.current_song_id = request.current_song_id;
        self.unique_song_id = request.unique_song_id;
        self.status = PlayerStatus::Playing;
    }

    pub fn current(&self) -> Option<&Entry> {
        self.entries.get(self.current_index)
    }

    pub fn set_starred(&mut self, id: &str, starred: bool) {
        for entry in self.entries.iter_mut().filter(|e| e.id == id) {
            entry.starred = starred;
        }
    }
}
