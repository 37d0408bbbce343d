//! Batch mutations over a selection snapshot.
//!
//! Entries run through one ordered stage: a single remote call in flight at a
//! time, in ascending `row_index`. Favorite kinds issue one `star`/`unstar`
//! per entry and apply the optimistic update after each success; adding to a
//! playlist issues a single `populate_playlist` call under the in-flight
//! guard. The affected caches are invalidated once the stage has finished,
//! whether it completed or aborted.

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{MutationError, MutationResult};
use crate::model::{Entry, InFlightGuard, InFlightHandle, RemoteMutationClient};
use super::invalidate::{CacheInvalidator, QueryCache};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Favorite,
    /// Favorite with a pause between calls so the service records distinct
    /// timestamps in row order
    FavoriteOrdered,
    Unfavorite,
    AddToPlaylist { playlist_id: String },
}

/// Pause applied after each successful call of the ordered stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingPolicy {
    Immediate,
    Fixed(Duration),
}

impl PacingPolicy {
    async fn pause(self) {
        if let PacingPolicy::Fixed(delay) = self {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Receives the local `starred` flip for an entry once its call succeeded
pub trait OptimisticSink: Send + Sync {
    fn apply_starred(&self, entry: &Entry, starred: bool) -> impl Future<Output = ()> + Send;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    Starred { count: usize },
    Unstarred { count: usize },
    Populated { playlist_id: String, count: usize },
}

#[derive(Clone)]
pub struct BatchMutationExecutor<C> {
    client: C,
    guard: InFlightGuard,
    ordered_delay: Duration,
}

impl<C: RemoteMutationClient> BatchMutationExecutor<C> {
    pub fn new(client: C, guard: InFlightGuard, ordered_delay: Duration) -> Self {
        Self {
            client,
            guard,
            ordered_delay,
        }
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Claim the target of `kind` in the in-flight guard.
    ///
    /// Synchronous, so a caller can hold the target before its first await.
    /// Kinds without a target reserve nothing.
    pub fn reserve(&self, kind: &MutationKind) -> MutationResult<Option<InFlightHandle>> {
        match kind {
            MutationKind::AddToPlaylist { playlist_id } if !playlist_id.is_empty() => {
                self.guard.begin(playlist_id).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Run `kind` over `snapshot`, then invalidate the caches it touched.
    ///
    /// `reservation` is the handle `reserve` returned for the same kind; it is
    /// released when the batch ends. A transport error aborts the calls not
    /// yet made and is returned after invalidation. Precondition and guard
    /// failures return before any call.
    pub async fn execute<S, Q>(
        &self,
        kind: MutationKind,
        snapshot: Vec<Entry>,
        reservation: Option<InFlightHandle>,
        sink: &S,
        cache: &Q,
    ) -> MutationResult<BatchOutcome>
    where
        S: OptimisticSink,
        Q: QueryCache,
    {
        let mut entries = snapshot;
        entries.sort_by_key(|e| e.row_index);

        tracing::info!(?kind, count = entries.len(), "Running batch mutation");

        let result = match &kind {
            MutationKind::Favorite => self
                .star_stage(entries, true, PacingPolicy::Immediate, sink)
                .await
                .map(|count| BatchOutcome::Starred { count }),
            MutationKind::FavoriteOrdered => self
                .star_stage(entries, true, PacingPolicy::Fixed(self.ordered_delay), sink)
                .await
                .map(|count| BatchOutcome::Starred { count }),
            MutationKind::Unfavorite => {
                entries.retain(|e| e.starred);
                self.star_stage(entries, false, PacingPolicy::Immediate, sink)
                    .await
                    .map(|count| BatchOutcome::Unstarred { count })
            }
            MutationKind::AddToPlaylist { playlist_id } => {
                if playlist_id.is_empty() {
                    return Err(MutationError::PreconditionUnmet("No playlist chosen"));
                }
                if entries.is_empty() {
                    return Err(MutationError::PreconditionUnmet("Nothing selected"));
                }
                let handle = match reservation {
                    Some(handle) => handle,
                    None => self.guard.begin(playlist_id)?,
                };
                let result = self.populate(playlist_id, &entries).await;
                drop(handle);
                result
            }
        };

        if let Err(e) = &result {
            tracing::warn!(?kind, error = %e, "Batch mutation failed");
        }

        CacheInvalidator::invalidate(&kind, cache).await;
        result
    }

    /// `star` (or `unstar`) each entry in order, pausing per `pacing` between
    /// calls. Stops at the first failure; later entries are never attempted.
    async fn star_stage<S: OptimisticSink>(
        &self,
        entries: Vec<Entry>,
        starred: bool,
        pacing: PacingPolicy,
        sink: &S,
    ) -> MutationResult<usize> {
        let total = entries.len();
        let client = &self.client;

        let stage = stream::iter(entries.into_iter().enumerate()).then(move |(position, entry)| async move {
            let call = if starred {
                client.star(&entry.id, entry.kind).await
            } else {
                client.unstar(&entry.id, entry.kind).await
            };
            call.map_err(|source| MutationError::RemoteCallFailure {
                id: entry.id.clone(),
                source,
            })?;

            sink.apply_starred(&entry, starred).await;

            if position + 1 < total {
                pacing.pause().await;
            }
            Ok::<(), MutationError>(())
        });
        let mut stage = std::pin::pin!(stage);

        let mut done = 0;
        while let Some(step) = stage.next().await {
            step?;
            done += 1;
        }
        Ok(done)
    }

    async fn populate(&self, playlist_id: &str, entries: &[Entry]) -> MutationResult<BatchOutcome> {
        let result = self
            .client
            .populate_playlist(playlist_id, entries)
            .await
            .map_err(|source| MutationError::RemoteCallFailure {
                id: playlist_id.to_string(),
                source,
            })?;

        if let Some(message) = result.rejection() {
            return Err(MutationError::MutationRejected {
                playlist_id: playlist_id.to_string(),
                message: message.to_string(),
            });
        }

        Ok(BatchOutcome::Populated {
            playlist_id: playlist_id.to_string(),
            count: entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    use crate::error::RemoteError;
    use crate::model::{CacheName, EntryKind, PopulateResult};

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Star(String),
        Unstar(String),
        Populate(String, Vec<String>),
    }

    /// Remote client fake recording each call with the (paused) clock time
    #[derive(Clone, Default)]
    struct RecordingClient {
        calls: Arc<Mutex<Vec<(Call, Instant)>>>,
        fail_on: Option<String>,
        populate_answer: Option<PopulateResult>,
        guard_watch: Option<(InFlightGuard, Arc<Mutex<bool>>)>,
    }

    impl RecordingClient {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push((call, Instant::now()));
        }

        fn check(&self, id: &str) -> Result<(), RemoteError> {
            if self.fail_on.as_deref() == Some(id) {
                return Err(RemoteError::Unavailable("connection reset".to_string()));
            }
            Ok(())
        }
    }

    impl RemoteMutationClient for RecordingClient {
        async fn star(&self, id: &str, _kind: EntryKind) -> Result<(), RemoteError> {
            self.record(Call::Star(id.to_string()));
            self.check(id)
        }

        async fn unstar(&self, id: &str, _kind: EntryKind) -> Result<(), RemoteError> {
            self.record(Call::Unstar(id.to_string()));
            self.check(id)
        }

        async fn populate_playlist(
            &self,
            playlist_id: &str,
            entries: &[Entry],
        ) -> Result<PopulateResult, RemoteError> {
            if let Some((guard, seen)) = &self.guard_watch {
                *seen.lock().unwrap() = guard.is_in_flight(playlist_id);
            }
            self.record(Call::Populate(
                playlist_id.to_string(),
                entries.iter().map(|e| e.id.clone()).collect(),
            ));
            self.check(playlist_id)?;
            Ok(self.populate_answer.clone().unwrap_or_else(PopulateResult::ok))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        applied: Mutex<Vec<(String, bool)>>,
    }

    impl OptimisticSink for RecordingSink {
        async fn apply_starred(&self, entry: &Entry, starred: bool) {
            self.applied.lock().unwrap().push((entry.id.clone(), starred));
        }
    }

    #[derive(Default)]
    struct RecordingCache {
        refetched: Mutex<Vec<CacheName>>,
    }

    impl QueryCache for RecordingCache {
        async fn refetch_active(&self, cache: CacheName) -> anyhow::Result<bool> {
            self.refetched.lock().unwrap().push(cache);
            Ok(true)
        }
    }

    fn entry(id: &str, row_index: usize, starred: bool) -> Entry {
        Entry {
            row_index,
            starred,
            ..Entry::new(id, EntryKind::Song, id.to_uppercase())
        }
    }

    fn executor(client: &RecordingClient) -> BatchMutationExecutor<RecordingClient> {
        BatchMutationExecutor::new(client.clone(), InFlightGuard::new(), Duration::from_millis(350))
    }

    impl BatchMutationExecutor<RecordingClient> {
        /// Reserve and execute in one go
        async fn run(
            &self,
            kind: MutationKind,
            snapshot: Vec<Entry>,
            sink: &RecordingSink,
            cache: &RecordingCache,
        ) -> MutationResult<BatchOutcome> {
            let reservation = self.reserve(&kind)?;
            self.execute(kind, snapshot, reservation, sink, cache).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ordered_favorite_paces_calls_in_row_order() {
        let client = RecordingClient::default();
        let sink = RecordingSink::default();
        let cache = RecordingCache::default();
        let snapshot = vec![entry("c", 2, false), entry("a", 0, false), entry("b", 1, false)];

        let outcome = executor(&client)
            .run(MutationKind::FavoriteOrdered, snapshot, &sink, &cache)
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome::Starred { count: 3 });
        assert_eq!(
            client.calls(),
            vec![
                Call::Star("a".to_string()),
                Call::Star("b".to_string()),
                Call::Star("c".to_string())
            ]
        );
        let times = client.call_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(350));
        }
        assert_eq!(
            *sink.applied.lock().unwrap(),
            vec![
                ("a".to_string(), true),
                ("b".to_string(), true),
                ("c".to_string(), true)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_favorite_does_not_pause() {
        let client = RecordingClient::default();
        let start = Instant::now();
        executor(&client)
            .run(
                MutationKind::Favorite,
                vec![entry("a", 0, false), entry("b", 1, false)],
                &RecordingSink::default(),
                &RecordingCache::default(),
            )
            .await
            .unwrap();
        assert!(client.call_times().iter().all(|t| *t == start));
    }

    #[tokio::test]
    async fn test_unfavorite_skips_unstarred() {
        let client = RecordingClient::default();
        let sink = RecordingSink::default();
        let snapshot = vec![entry("a", 0, true), entry("b", 1, false), entry("c", 2, true)];

        let outcome = executor(&client)
            .run(MutationKind::Unfavorite, snapshot, &sink, &RecordingCache::default())
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome::Unstarred { count: 2 });
        assert_eq!(
            client.calls(),
            vec![Call::Unstar("a".to_string()), Call::Unstar("c".to_string())]
        );
        assert_eq!(
            *sink.applied.lock().unwrap(),
            vec![("a".to_string(), false), ("c".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_rest_and_still_invalidates() {
        let client = RecordingClient {
            fail_on: Some("b".to_string()),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let cache = RecordingCache::default();
        let snapshot = vec![entry("a", 0, false), entry("b", 1, false), entry("c", 2, false)];

        let err = executor(&client)
            .run(MutationKind::Favorite, snapshot, &sink, &cache)
            .await
            .unwrap_err();

        match err {
            MutationError::RemoteCallFailure { id, .. } => assert_eq!(id, "b"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            client.calls(),
            vec![Call::Star("a".to_string()), Call::Star("b".to_string())]
        );
        assert_eq!(*sink.applied.lock().unwrap(), vec![("a".to_string(), true)]);
        assert_eq!(cache.refetched.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_add_to_playlist_sends_one_ordered_call() {
        let client = RecordingClient::default();
        let cache = RecordingCache::default();
        let snapshot = vec![entry("a", 2, false), entry("b", 0, false), entry("c", 1, false)];

        let outcome = executor(&client)
            .run(
                MutationKind::AddToPlaylist {
                    playlist_id: "p1".to_string(),
                },
                snapshot,
                &RecordingSink::default(),
                &cache,
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BatchOutcome::Populated {
                playlist_id: "p1".to_string(),
                count: 3
            }
        );
        assert_eq!(
            client.calls(),
            vec![Call::Populate(
                "p1".to_string(),
                vec!["b".to_string(), "c".to_string(), "a".to_string()]
            )]
        );
        assert_eq!(*cache.refetched.lock().unwrap(), vec![CacheName::Playlist]);
    }

    #[tokio::test]
    async fn test_rejected_populate_surfaces_message_and_releases_guard() {
        let guard = InFlightGuard::new();
        let seen_in_flight = Arc::new(Mutex::new(false));
        let client = RecordingClient {
            populate_answer: Some(PopulateResult::failed("X")),
            guard_watch: Some((guard.clone(), seen_in_flight.clone())),
            ..Default::default()
        };
        let executor = BatchMutationExecutor::new(client, guard.clone(), Duration::ZERO);

        let err = executor
            .run(
                MutationKind::AddToPlaylist {
                    playlist_id: "p1".to_string(),
                },
                vec![entry("a", 0, false)],
                &RecordingSink::default(),
                &RecordingCache::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "X");
        assert!(matches!(err, MutationError::MutationRejected { ref playlist_id, .. } if playlist_id == "p1"));
        assert!(*seen_in_flight.lock().unwrap());
        assert!(!guard.is_in_flight("p1"));
    }

    #[tokio::test]
    async fn test_add_to_busy_playlist_is_refused() {
        let client = RecordingClient::default();
        let executor = executor(&client);
        let _held = executor.guard().begin("p1").unwrap();

        let err = executor
            .run(
                MutationKind::AddToPlaylist {
                    playlist_id: "p1".to_string(),
                },
                vec![entry("a", 0, false)],
                &RecordingSink::default(),
                &RecordingCache::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::AlreadyInFlight(_)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reservation_holds_playlist_until_batch_ends() {
        let client = RecordingClient::default();
        let executor = executor(&client);
        let kind = MutationKind::AddToPlaylist {
            playlist_id: "p1".to_string(),
        };

        let reservation = executor.reserve(&kind).unwrap();
        assert!(reservation.is_some());
        assert!(executor.guard().is_in_flight("p1"));
        assert!(matches!(
            executor.reserve(&kind),
            Err(MutationError::AlreadyInFlight(_))
        ));

        executor
            .execute(
                kind,
                vec![entry("a", 0, false)],
                reservation,
                &RecordingSink::default(),
                &RecordingCache::default(),
            )
            .await
            .unwrap();

        assert_eq!(client.calls().len(), 1);
        assert!(!executor.guard().is_in_flight("p1"));
    }

    #[test]
    fn test_favorites_reserve_nothing() {
        let executor = executor(&RecordingClient::default());
        assert!(executor.reserve(&MutationKind::Favorite).unwrap().is_none());
        assert!(executor.guard().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_add_without_selection_is_precondition_error() {
        let client = RecordingClient::default();
        let err = executor(&client)
            .run(
                MutationKind::AddToPlaylist {
                    playlist_id: "p1".to_string(),
                },
                vec![],
                &RecordingSink::default(),
                &RecordingCache::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::PreconditionUnmet(_)));
    }
}
