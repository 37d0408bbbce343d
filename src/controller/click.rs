//! Single/double click disambiguation for list surfaces.
//!
//! A pointer-down starts a pending click on its surface. If another
//! pointer-down lands on the same surface before the window closes, the
//! pending click is cancelled and a double click is reported instead;
//! otherwise `poll` commits it as a single click once its deadline passes.
//! Time is passed in, so the state machine never reads the clock itself.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::model::{Entry, Modifiers, SelectionStore, Surface};

/// A click whose single-click action is still waiting on the window
#[derive(Clone, Debug)]
struct PendingClick {
    entry: Entry,
    modifiers: Modifiers,
    deadline: Instant,
}

/// A committed single click, ready to be applied to the selection
#[derive(Clone, Debug, PartialEq)]
pub struct SingleClick {
    pub surface: Surface,
    pub entry: Entry,
    pub modifiers: Modifiers,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickEvent {
    Single(SingleClick),
    /// The second pointer-down of a pair; carries the row it landed on
    Double { surface: Surface, entry: Entry },
}

pub struct ClickDisambiguator {
    window: Duration,
    pending: HashMap<Surface, PendingClick>,
}

impl ClickDisambiguator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// Feed a pointer-down on `entry`.
    ///
    /// Returns the events it settles: a double click, or a late single click
    /// for an expired pending click that `poll` had not collected yet.
    pub fn pointer_down(
        &mut self,
        surface: Surface,
        entry: Entry,
        modifiers: Modifiers,
        now: Instant,
    ) -> Vec<ClickEvent> {
        let mut events = Vec::new();

        if let Some(previous) = self.cancel(surface) {
            if now < previous.deadline {
                tracing::debug!(?surface, id = %entry.id, "Double click");
                events.push(ClickEvent::Double { surface, entry });
                return events;
            }
            events.push(ClickEvent::Single(SingleClick {
                surface,
                entry: previous.entry,
                modifiers: previous.modifiers,
            }));
        }

        self.start(surface, entry, modifiers, now);
        events
    }

    /// Commit every pending click whose window has closed by `now`
    pub fn poll(&mut self, now: Instant) -> Vec<ClickEvent> {
        let expired: Vec<Surface> = self
            .pending
            .iter()
            .filter(|(_, click)| now >= click.deadline)
            .map(|(surface, _)| *surface)
            .collect();

        expired
            .into_iter()
            .filter_map(|surface| {
                self.cancel(surface).map(|click| {
                    ClickEvent::Single(SingleClick {
                        surface,
                        entry: click.entry,
                        modifiers: click.modifiers,
                    })
                })
            })
            .collect()
    }

    /// Earliest moment `poll` has something to commit
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|click| click.deadline).min()
    }

    fn start(&mut self, surface: Surface, entry: Entry, modifiers: Modifiers, now: Instant) {
        let deadline = now + self.window;
        self.pending.insert(
            surface,
            PendingClick {
                entry,
                modifiers,
                deadline,
            },
        );
    }

    fn cancel(&mut self, surface: Surface) -> Option<PendingClick> {
        self.pending.remove(&surface)
    }
}

/// Apply a committed single click to the selection.
///
/// Ctrl/Cmd toggles the row; Shift extends a range from the anchor over
/// `listing`; a plain click leaves the selection alone.
pub fn apply_single_click(selection: &mut SelectionStore, click: &SingleClick, listing: &[Entry]) {
    if click.modifiers.toggle {
        selection.toggle_selected(&click.entry);
    } else if click.modifiers.shift {
        selection.set_range_selected(&click.entry);
        selection.toggle_range_selected(listing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryKind;

    const WINDOW: Duration = Duration::from_millis(100);

    fn rows() -> Vec<Entry> {
        (0..5)
            .map(|i| Entry {
                row_index: i,
                ..Entry::new(format!("s{}", i), EntryKind::Song, format!("Song {}", i))
            })
            .collect()
    }

    #[test]
    fn test_second_pointer_down_within_window_is_double() {
        let rows = rows();
        let mut clicks = ClickDisambiguator::new(WINDOW);
        let t0 = Instant::now();

        let first = clicks.pointer_down(Surface::Folder, rows[1].clone(), Modifiers::CTRL, t0);
        assert!(first.is_empty());

        let second = clicks.pointer_down(
            Surface::Folder,
            rows[1].clone(),
            Modifiers::CTRL,
            t0 + Duration::from_millis(60),
        );
        assert_eq!(
            second,
            vec![ClickEvent::Double {
                surface: Surface::Folder,
                entry: rows[1].clone()
            }]
        );

        // the cancelled single click never fires
        assert!(clicks.poll(t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(clicks.next_deadline(), None);
    }

    #[test]
    fn test_lone_pointer_down_fires_one_single_click() {
        let rows = rows();
        let mut clicks = ClickDisambiguator::new(WINDOW);
        let t0 = Instant::now();
        clicks.pointer_down(Surface::Album, rows[2].clone(), Modifiers::default(), t0);

        assert!(clicks.poll(t0 + Duration::from_millis(99)).is_empty());
        assert_eq!(clicks.next_deadline(), Some(t0 + WINDOW));

        let fired = clicks.poll(t0 + WINDOW);
        assert_eq!(fired.len(), 1);
        assert!(matches!(&fired[0], ClickEvent::Single(click) if click.entry.id == "s2"));

        assert!(clicks.poll(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_late_pointer_down_commits_expired_click_first() {
        let rows = rows();
        let mut clicks = ClickDisambiguator::new(WINDOW);
        let t0 = Instant::now();
        clicks.pointer_down(Surface::Folder, rows[0].clone(), Modifiers::CTRL, t0);

        let events = clicks.pointer_down(
            Surface::Folder,
            rows[3].clone(),
            Modifiers::default(),
            t0 + Duration::from_millis(150),
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ClickEvent::Single(click) if click.entry.id == "s0"));
        assert_eq!(
            clicks.next_deadline(),
            Some(t0 + Duration::from_millis(150) + WINDOW)
        );
    }

    #[test]
    fn test_surfaces_do_not_pair_up() {
        let rows = rows();
        let mut clicks = ClickDisambiguator::new(WINDOW);
        let t0 = Instant::now();
        clicks.pointer_down(Surface::Folder, rows[0].clone(), Modifiers::default(), t0);
        let events = clicks.pointer_down(
            Surface::Playlist,
            rows[1].clone(),
            Modifiers::default(),
            t0 + Duration::from_millis(10),
        );
        assert!(events.is_empty());
        assert_eq!(clicks.poll(t0 + Duration::from_millis(200)).len(), 2);
    }

    #[test]
    fn test_apply_single_click_modifiers() {
        let rows = rows();
        let mut selection = SelectionStore::new();

        let ctrl = SingleClick {
            surface: Surface::Folder,
            entry: rows[1].clone(),
            modifiers: Modifiers::CTRL,
        };
        apply_single_click(&mut selection, &ctrl, &rows);
        assert!(selection.is_selected(&rows[1]));

        let shift = SingleClick {
            entry: rows[3].clone(),
            modifiers: Modifiers::SHIFT,
            ..ctrl.clone()
        };
        apply_single_click(&mut selection, &shift, &rows);
        // anchor 1 was already selected and is toggled back out with the range
        let ids: Vec<String> = selection.snapshot().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["s2", "s3"]);

        let plain = SingleClick {
            entry: rows[4].clone(),
            modifiers: Modifiers::default(),
            ..ctrl
        };
        apply_single_click(&mut selection, &plain, &rows);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_ctrl_wins_over_shift() {
        let rows = rows();
        let mut selection = SelectionStore::new();
        let both = SingleClick {
            surface: Surface::Folder,
            entry: rows[2].clone(),
            modifiers: Modifiers {
                toggle: true,
                shift: true,
            },
        };
        apply_single_click(&mut selection, &both, &rows);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.anchor().map(|e| e.id.as_str()), Some("s2"));
    }
}
