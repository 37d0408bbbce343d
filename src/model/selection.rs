//! Multi-select state: chosen rows, the range anchor and the range endpoint

use super::types::Entry;

/// Single writer of the selection.
///
/// Membership is keyed by `(id, unique_id)`; ranges are computed from
/// `row_index`, never from insertion order.
#[derive(Clone, Debug, Default)]
pub struct SelectionStore {
    selected: Vec<Entry>,
    anchor: Option<Entry>,
    range_end: Option<Entry>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_selected(&mut self, entry: &Entry) {
        if let Some(pos) = self.position(entry) {
            self.selected.remove(pos);
        } else {
            self.selected.push(entry.clone());
            self.anchor = Some(entry.clone());
        }
    }

    pub fn set_range_selected(&mut self, entry: &Entry) {
        self.range_end = Some(entry.clone());
    }

    /// Toggle every entry of `full_list` between the anchor and the range
    /// endpoint, inclusive.
    ///
    /// `full_list` must be the sequence the rows were indexed against (the
    /// filtered one while a search filter is active).
    pub fn toggle_range_selected(&mut self, full_list: &[Entry]) {
        let Some(end) = self.range_end.clone() else {
            return;
        };
        let anchor = match &self.anchor {
            Some(anchor) => anchor.clone(),
            None => {
                self.anchor = Some(end.clone());
                end.clone()
            }
        };

        let low = anchor.row_index.min(end.row_index);
        let high = anchor.row_index.max(end.row_index);

        for entry in full_list
            .iter()
            .filter(|e| (low..=high).contains(&e.row_index))
        {
            if let Some(pos) = self.position(entry) {
                self.selected.remove(pos);
            } else {
                self.selected.push(entry.clone());
            }
        }
    }

    pub fn clear_selected(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.range_end = None;
    }

    pub fn is_selected(&self, entry: &Entry) -> bool {
        self.position(entry).is_some()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&Entry> {
        self.anchor.as_ref()
    }

    /// Point-in-time copy handed to a batch
    pub fn snapshot(&self) -> Vec<Entry> {
        self.selected.clone()
    }

    /// Replace every held copy of `updated` (same id) with the new snapshot
    pub fn republish(&mut self, updated: &Entry) {
        for held in self
            .selected
            .iter_mut()
            .chain(self.anchor.iter_mut())
            .chain(self.range_end.iter_mut())
            .filter(|e| e.id == updated.id)
        {
            let (row_index, unique_id) = (held.row_index, held.unique_id.clone());
            *held = Entry {
                row_index,
                unique_id,
                ..updated.clone()
            };
        }
    }

    fn position(&self, entry: &Entry) -> Option<usize> {
        self.selected.iter().position(|e| e.same_row(entry))
    }
}
