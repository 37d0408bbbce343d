//! Named view caches and the registry of which ones are currently mounted

use std::collections::HashSet;
use std::fmt;

/// A named query whose consumers can be asked to re-fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheName {
    Starred,
    Album,
    AlbumList,
    Playlist,
    Folder,
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheName::Starred => "starred",
            CacheName::Album => "album",
            CacheName::AlbumList => "albumList",
            CacheName::Playlist => "playlist",
            CacheName::Folder => "folder",
        };
        f.write_str(name)
    }
}

/// Caches with a mounted consumer; only these are worth re-fetching
#[derive(Clone, Debug, Default)]
pub struct MountedViews {
    mounted: HashSet<CacheName>,
}

impl MountedViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, cache: CacheName) {
        self.mounted.insert(cache);
    }

    pub fn unmount(&mut self, cache: CacheName) {
        self.mounted.remove(&cache);
    }

    /// Unmount `previous` (if any) and mount `next` (if any)
    pub fn swap(&mut self, previous: Option<CacheName>, next: Option<CacheName>) {
        if let Some(previous) = previous {
            self.unmount(previous);
        }
        if let Some(next) = next {
            self.mount(next);
        }
    }

    pub fn is_mounted(&self, cache: CacheName) -> bool {
        self.mounted.contains(&cache)
    }
}
