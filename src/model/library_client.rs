//! Library service client: read API for the views and the mutation API the
//! batch executor drives.
//!
//! `LibraryClient` keeps the service's library in memory, loaded from a JSON
//! document. Favorites carry the time they were made and are listed in that
//! order, which is what makes ordered favoriting observable. A client loaded
//! from a file writes every successful mutation back to it.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::error::RemoteError;
use super::content::{AlbumDetail, Directory, PlaylistDetail, StarredLists};
use super::types::{Entry, EntryKind, PlaylistItem};

/// Mutations the batch executor issues against the library service
pub trait RemoteMutationClient: Send + Sync {
    fn star(&self, id: &str, kind: EntryKind) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn unstar(&self, id: &str, kind: EntryKind) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Append `entries` to the playlist in the given order
    fn populate_playlist(
        &self,
        playlist_id: &str,
        entries: &[Entry],
    ) -> impl Future<Output = Result<PopulateResult, RemoteError>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateStatus {
    Ok,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMessage {
    pub message: String,
}

/// Typed answer of `populate_playlist`; a `failed` status is not a transport error
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateResult {
    pub status: PopulateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceMessage>,
}

impl PopulateResult {
    pub fn ok() -> Self {
        Self {
            status: PopulateStatus::Ok,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: PopulateStatus::Failed,
            error: Some(ServiceMessage {
                message: message.into(),
            }),
        }
    }

    /// The failure message, if the service rejected the request
    pub fn rejection(&self) -> Option<&str> {
        match self.status {
            PopulateStatus::Ok => None,
            PopulateStatus::Failed => Some(
                self.error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("Playlist update failed"),
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub artist: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_id: Option<String>,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub duration_secs: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub song_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StarRecord {
    pub id: String,
    pub kind: EntryKind,
    pub at: DateTime<Utc>,
}

/// The library document the service is loaded from
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryData {
    pub folders: Vec<FolderRecord>,
    pub albums: Vec<AlbumRecord>,
    pub songs: Vec<SongRecord>,
    pub playlists: Vec<PlaylistRecord>,
    pub starred: Vec<StarRecord>,
}

impl LibraryData {
    fn is_starred(&self, id: &str) -> bool {
        self.starred.iter().any(|s| s.id == id)
    }

    fn contains(&self, id: &str, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Song => self.songs.iter().any(|s| s.id == id),
            EntryKind::Album => self.albums.iter().any(|a| a.id == id),
            EntryKind::Directory => self.folders.iter().any(|f| f.id == id),
        }
    }

    fn song_entry(&self, song: &SongRecord) -> Entry {
        let album = song
            .album_id
            .as_deref()
            .and_then(|id| self.albums.iter().find(|a| a.id == id))
            .map(|a| a.name.clone())
            .unwrap_or_default();
        Entry {
            artist: song.artist.clone(),
            album,
            duration_secs: song.duration_secs,
            starred: self.is_starred(&song.id),
            ..Entry::new(song.id.clone(), EntryKind::Song, song.title.clone())
        }
    }

    fn album_entry(&self, album: &AlbumRecord) -> Entry {
        Entry {
            artist: album.artist.clone(),
            album: album.name.clone(),
            starred: self.is_starred(&album.id),
            ..Entry::new(album.id.clone(), EntryKind::Album, album.name.clone())
        }
    }

    fn folder_entry(&self, folder: &FolderRecord) -> Entry {
        Entry {
            starred: self.is_starred(&folder.id),
            ..Entry::new(folder.id.clone(), EntryKind::Directory, folder.name.clone())
        }
    }
}

/// Library service client with a shared in-memory library
#[derive(Clone)]
pub struct LibraryClient {
    data: Arc<RwLock<LibraryData>>,
    store: Option<PathBuf>,
}

impl LibraryClient {
    pub fn new(data: LibraryData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            store: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading library file {}", path.display()))?;
        let data: LibraryData = serde_json::from_str(&content)
            .with_context(|| format!("parsing library file {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            folders = data.folders.len(),
            albums = data.albums.len(),
            songs = data.songs.len(),
            playlists = data.playlists.len(),
            "Library loaded"
        );
        Ok(Self {
            store: Some(path.to_path_buf()),
            ..Self::new(data)
        })
    }

    /// Make `next` the library once it is saved; on a failed save the
    /// current library stays untouched
    async fn commit(
        &self,
        current: &mut RwLockWriteGuard<'_, LibraryData>,
        next: LibraryData,
    ) -> Result<(), RemoteError> {
        self.persist(&next).await?;
        **current = next;
        Ok(())
    }

    /// Write the library back to its file, if it came from one
    async fn persist(&self, data: &LibraryData) -> Result<(), RemoteError> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        tokio::fs::write(path, content).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to save library");
            RemoteError::Unavailable(format!("{}: {}", path.display(), e))
        })
    }

    /// Root folders, offered in the folder picker
    pub async fn music_folders(&self) -> Result<Vec<Entry>> {
        let data = self.data.read().await;
        Ok(data
            .folders
            .iter()
            .filter(|f| f.parent.is_none())
            .map(|f| data.folder_entry(f))
            .collect())
    }

    pub async fn get_directory(&self, id: &str) -> Result<Directory> {
        crate::log_api_request!("get_directory", id);
        let data = self.data.read().await;
        let folder = data
            .folders
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| RemoteError::NotFound {
                kind: EntryKind::Directory,
                id: id.to_string(),
            })?;

        let subfolders = data
            .folders
            .iter()
            .filter(|f| f.parent.as_deref() == Some(id))
            .map(|f| data.folder_entry(f));
        let songs = data
            .songs
            .iter()
            .filter(|s| s.folder_id.as_deref() == Some(id))
            .map(|s| data.song_entry(s));

        Ok(Directory {
            id: folder.id.clone(),
            name: folder.name.clone(),
            parent: folder.parent.clone(),
            children: subfolders.chain(songs).collect(),
        })
    }

    pub async fn get_starred(&self) -> Result<StarredLists> {
        crate::log_api_request!("get_starred", kind = "all");
        let data = self.data.read().await;
        let mut records: Vec<&StarRecord> = data.starred.iter().collect();
        records.sort_by_key(|s| s.at);

        let mut lists = StarredLists::default();
        for record in records {
            match record.kind {
                EntryKind::Song => {
                    if let Some(song) = data.songs.iter().find(|s| s.id == record.id) {
                        lists.songs.push(data.song_entry(song));
                    }
                }
                EntryKind::Album => {
                    if let Some(album) = data.albums.iter().find(|a| a.id == record.id) {
                        lists.albums.push(data.album_entry(album));
                    }
                }
                EntryKind::Directory => {}
            }
        }
        Ok(lists)
    }

    pub async fn get_album_list(&self) -> Result<Vec<Entry>> {
        let data = self.data.read().await;
        Ok(data.albums.iter().map(|a| data.album_entry(a)).collect())
    }

    pub async fn get_album(&self, id: &str) -> Result<AlbumDetail> {
        crate::log_api_request!("get_album", id);
        let data = self.data.read().await;
        let album = data
            .albums
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| RemoteError::NotFound {
                kind: EntryKind::Album,
                id: id.to_string(),
            })?;

        Ok(AlbumDetail {
            id: album.id.clone(),
            name: album.name.clone(),
            artist: album.artist.clone(),
            songs: data
                .songs
                .iter()
                .filter(|s| s.album_id.as_deref() == Some(id))
                .map(|s| data.song_entry(s))
                .collect(),
        })
    }

    pub async fn get_playlists(&self) -> Result<Vec<PlaylistItem>> {
        let data = self.data.read().await;
        let mut playlists: Vec<PlaylistItem> = data
            .playlists
            .iter()
            .map(|p| PlaylistItem {
                id: p.id.clone(),
                name: p.name.clone(),
                song_count: p.song_ids.len(),
            })
            .collect();
        playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(playlists)
    }

    pub async fn get_playlist(&self, id: &str) -> Result<PlaylistDetail> {
        crate::log_api_request!("get_playlist", id);
        let data = self.data.read().await;
        let playlist = data
            .playlists
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow::anyhow!("Playlist not found: {}", id))?;

        Ok(PlaylistDetail {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            songs: playlist
                .song_ids
                .iter()
                .filter_map(|song_id| data.songs.iter().find(|s| &s.id == song_id))
                .map(|s| data.song_entry(s))
                .collect(),
        })
    }
}

impl RemoteMutationClient for LibraryClient {
    async fn star(&self, id: &str, kind: EntryKind) -> Result<(), RemoteError> {
        crate::log_api_request!("star", id, %kind);
        let result = async {
            let mut data = self.data.write().await;
            if !data.contains(id, kind) {
                return Err(RemoteError::NotFound {
                    kind,
                    id: id.to_string(),
                });
            }
            if data.is_starred(id) {
                return Ok(());
            }
            let mut next = data.clone();
            next.starred.push(StarRecord {
                id: id.to_string(),
                kind,
                at: Utc::now(),
            });
            self.commit(&mut data, next).await
        }
        .await;
        crate::log_api_result!("star", result);
        result
    }

    async fn unstar(&self, id: &str, kind: EntryKind) -> Result<(), RemoteError> {
        crate::log_api_request!("unstar", id, %kind);
        let result = async {
            let mut data = self.data.write().await;
            if !data.contains(id, kind) {
                return Err(RemoteError::NotFound {
                    kind,
                    id: id.to_string(),
                });
            }
            let mut next = data.clone();
            next.starred.retain(|s| s.id != id);
            self.commit(&mut data, next).await
        }
        .await;
        crate::log_api_result!("unstar", result);
        result
    }

    async fn populate_playlist(
        &self,
        playlist_id: &str,
        entries: &[Entry],
    ) -> Result<PopulateResult, RemoteError> {
        crate::log_api_request!("populate_playlist", playlist_id, count = entries.len());
        let mut data = self.data.write().await;

        if entries.iter().any(|e| e.kind != EntryKind::Song) {
            return Ok(PopulateResult::failed("Only songs can be added to a playlist"));
        }
        let mut next = data.clone();
        let Some(playlist) = next.playlists.iter_mut().find(|p| p.id == playlist_id) else {
            return Ok(PopulateResult::failed(format!("Playlist not found: {}", playlist_id)));
        };
        playlist.song_ids.extend(entries.iter().map(|e| e.id.clone()));
        self.commit(&mut data, next).await?;

        tracing::info!(playlist_id, added = entries.len(), "Playlist populated");
        Ok(PopulateResult::ok())
    }
}
