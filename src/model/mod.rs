//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (entries, routes, notifications, UI state)
//! - `selection`: Multi-select state (members, anchor, range endpoint)
//! - `in_flight`: Per-target guard against duplicate mutations
//! - `content`: The mounted listing and its search filter
//! - `playback`: Play queue seeded from a listing
//! - `cache`: Named view caches and which are mounted
//! - `library_client`: Library service client (reads and mutations)
//! - `app_model`: Main application model with state management methods

mod types;
mod selection;
mod in_flight;
mod content;
mod playback;
mod cache;
mod library_client;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    Entry, EntryKind, Modifiers, Notification, NotificationLevel, Route, Surface, UiState,
};

pub use selection::SelectionStore;

pub use in_flight::{InFlightGuard, InFlightHandle};

pub use content::{ContentState, ContentView};

pub use playback::{PlayQueue, PlayQueueRequest, PlayerStatus};

pub use cache::CacheName;

pub use library_client::{LibraryClient, RemoteMutationClient};

#[cfg(test)]
pub use content::{Directory, StarredLists};
#[cfg(test)]
pub use library_client::{LibraryData, PopulateResult};
#[cfg(test)]
pub use types::{PlaylistItem, StarredTab};

pub use app_model::AppModel;
