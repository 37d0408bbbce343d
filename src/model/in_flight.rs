//! Per-target guard against duplicate concurrent mutations

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{MutationError, MutationResult};

/// The set of target ids (playlist ids) with a mutation in progress.
///
/// Cloning shares the same set. Check-then-insert happens under one lock, so
/// `begin` is atomic even when batches run on separate tasks.
#[derive(Clone, Debug, Default)]
pub struct InFlightGuard {
    processing: Arc<Mutex<ProcessingSet>>,
}

#[derive(Debug, Default)]
struct ProcessingSet {
    /// Target id to the generation of the handle that holds it
    targets: HashMap<String, u64>,
    next_generation: u64,
}

/// Releases its target when dropped, whichever way the guarded operation ends
#[derive(Debug)]
#[must_use = "the target is released as soon as the handle is dropped"]
pub struct InFlightHandle {
    guard: InFlightGuard,
    target_id: String,
    generation: u64,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, target_id: &str) -> MutationResult<InFlightHandle> {
        let mut set = self.lock();
        if set.targets.contains_key(target_id) {
            return Err(MutationError::AlreadyInFlight(target_id.to_string()));
        }
        set.next_generation += 1;
        let generation = set.next_generation;
        set.targets.insert(target_id.to_string(), generation);
        drop(set);

        tracing::debug!(target_id, "Mutation target marked in flight");
        Ok(InFlightHandle {
            guard: self.clone(),
            target_id: target_id.to_string(),
            generation,
        })
    }

    /// Safe to call for an idle target
    pub fn end(&self, target_id: &str) {
        if self.lock().targets.remove(target_id).is_some() {
            tracing::debug!(target_id, "Mutation target released");
        }
    }

    pub fn is_in_flight(&self, target_id: &str) -> bool {
        self.lock().targets.contains_key(target_id)
    }

    pub fn snapshot(&self) -> HashSet<String> {
        self.lock().targets.keys().cloned().collect()
    }

    fn held_by(&self, target_id: &str, generation: u64) -> bool {
        self.lock().targets.get(target_id) == Some(&generation)
    }

    fn lock(&self) -> MutexGuard<'_, ProcessingSet> {
        // A panic while holding the lock cannot leave the set half-updated
        self.processing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for InFlightHandle {
    /// A handle outliving an explicit `end` must not free a later acquisition
    fn drop(&mut self) {
        if self.guard.held_by(&self.target_id, self.generation) {
            self.guard.end(&self.target_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_conflicts_until_end() {
        let guard = InFlightGuard::new();
        let handle = guard.begin("p1").unwrap();

        match guard.begin("p1") {
            Err(MutationError::AlreadyInFlight(id)) => assert_eq!(id, "p1"),
            other => panic!("Expected AlreadyInFlight, got {:?}", other),
        }

        guard.end("p1");
        assert!(!guard.is_in_flight("p1"));
        let _again = guard.begin("p1").unwrap();

        // the stale handle must not free the new acquisition
        drop(handle);
        assert!(guard.is_in_flight("p1"));
    }

    #[test]
    fn test_handle_drop_releases() {
        let guard = InFlightGuard::new();
        {
            let _handle = guard.begin("p1").unwrap();
            assert!(guard.is_in_flight("p1"));
        }
        assert!(!guard.is_in_flight("p1"));
        assert!(guard.begin("p1").is_ok());
    }

    #[test]
    fn test_disjoint_targets_overlap() {
        let guard = InFlightGuard::new();
        let _a = guard.begin("p1").unwrap();
        let _b = guard.begin("p2").unwrap();
        assert_eq!(guard.snapshot().len(), 2);
    }

    #[test]
    fn test_end_on_idle_target_is_noop() {
        let guard = InFlightGuard::new();
        guard.end("missing");
        assert!(guard.snapshot().is_empty());
    }
}
