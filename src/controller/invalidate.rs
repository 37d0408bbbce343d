//! Cache invalidation after a batch mutation

use std::future::Future;

use crate::model::CacheName;
use super::batch::MutationKind;

/// Named queries that can be re-run for their mounted consumers
pub trait QueryCache: Send + Sync {
    /// Re-fetch `cache` if a mounted view uses it; `Ok(false)` when none does
    fn refetch_active(&self, cache: CacheName) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

const FAVORITE_CACHES: &[CacheName] = &[
    CacheName::Starred,
    CacheName::Album,
    CacheName::AlbumList,
    CacheName::Playlist,
];

const PLAYLIST_CACHES: &[CacheName] = &[CacheName::Playlist];

/// Caches whose data a mutation of `kind` may have made stale
pub fn affected_caches(kind: &MutationKind) -> &'static [CacheName] {
    match kind {
        MutationKind::Favorite | MutationKind::FavoriteOrdered | MutationKind::Unfavorite => {
            FAVORITE_CACHES
        }
        MutationKind::AddToPlaylist { .. } => PLAYLIST_CACHES,
    }
}

pub struct CacheInvalidator;

impl CacheInvalidator {
    /// Re-fetch every active cache affected by `kind`, one after another.
    ///
    /// A failing re-fetch is logged and the rest still run. Returns how many
    /// caches were actually re-fetched.
    pub async fn invalidate<Q: QueryCache>(kind: &MutationKind, cache: &Q) -> usize {
        let mut refetched = 0;
        for &name in affected_caches(kind) {
            match cache.refetch_active(name).await {
                Ok(true) => {
                    tracing::debug!(cache = %name, "Cache re-fetched");
                    refetched += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(cache = %name, error = %e, "Cache re-fetch failed");
                }
            }
        }
        refetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every request; `mounted` caches succeed, `broken` ones fail
    struct RecordingCache {
        mounted: Vec<CacheName>,
        broken: Vec<CacheName>,
        requests: Mutex<Vec<CacheName>>,
    }

    impl QueryCache for RecordingCache {
        async fn refetch_active(&self, cache: CacheName) -> anyhow::Result<bool> {
            self.requests.lock().unwrap().push(cache);
            if self.broken.contains(&cache) {
                anyhow::bail!("{} query failed", cache);
            }
            Ok(self.mounted.contains(&cache))
        }
    }

    #[test]
    fn test_table() {
        assert_eq!(affected_caches(&MutationKind::FavoriteOrdered).len(), 4);
        assert_eq!(
            affected_caches(&MutationKind::AddToPlaylist {
                playlist_id: "p1".to_string()
            }),
            &[CacheName::Playlist]
        );
    }

    #[tokio::test]
    async fn test_only_mounted_caches_count() {
        let cache = RecordingCache {
            mounted: vec![CacheName::Starred],
            broken: vec![],
            requests: Mutex::new(vec![]),
        };
        let refetched = CacheInvalidator::invalidate(&MutationKind::Unfavorite, &cache).await;
        assert_eq!(refetched, 1);
        assert_eq!(cache.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_caches() {
        let cache = RecordingCache {
            mounted: vec![CacheName::Album, CacheName::Playlist],
            broken: vec![CacheName::Starred],
            requests: Mutex::new(vec![]),
        };
        let refetched = CacheInvalidator::invalidate(&MutationKind::Favorite, &cache).await;
        assert_eq!(refetched, 2);
        assert_eq!(
            *cache.requests.lock().unwrap(),
            vec![
                CacheName::Starred,
                CacheName::Album,
                CacheName::AlbumList,
                CacheName::Playlist
            ]
        );
    }
}
