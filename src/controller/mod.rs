//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and runs batch mutations.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key and mouse event handling
//! - `click`: Single/double click disambiguation
//! - `batch`: Batch mutation executor (favorites, add to playlist)
//! - `invalidate`: Cache invalidation after a batch
//! - `mutations`: Selection actions wired to the executor
//! - `playback`: Play queue seeding
//! - `navigation`: Folder/album/playlist navigation

mod input;
mod click;
mod batch;
mod invalidate;
mod mutations;
mod playback;
mod navigation;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::{MutationError, RemoteError};
use crate::model::{AppModel, InFlightGuard, LibraryClient};
use batch::BatchMutationExecutor;
use click::ClickDisambiguator;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    executor: BatchMutationExecutor<LibraryClient>,
    clicks: Arc<Mutex<ClickDisambiguator>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, library: LibraryClient, config: &AppConfig) -> Self {
        Self {
            model,
            executor: BatchMutationExecutor::new(
                library,
                InFlightGuard::new(),
                config.ordered_favorite_delay(),
            ),
            clicks: Arc::new(Mutex::new(ClickDisambiguator::new(config.double_click_window()))),
        }
    }

    /// Playlists with an add in progress
    pub fn in_flight(&self) -> &InFlightGuard {
        self.executor.guard()
    }

    /// When the event loop must wake up next for a pending click
    pub async fn next_deadline(&self) -> Option<Instant> {
        self.clicks.lock().await.next_deadline()
    }

    /// Periodic housekeeping: commit expired clicks, expire notifications
    pub async fn tick(&self, now: Instant) {
        let fired = self.clicks.lock().await.poll(now);
        self.dispatch_clicks(fired).await;

        let model = self.model.lock().await;
        model.auto_clear_old_notifications().await;
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        if let Some(mutation) = error.downcast_ref::<MutationError>() {
            return Self::format_mutation_error(mutation);
        }
        if let Some(remote) = error.downcast_ref::<RemoteError>() {
            return Self::format_remote_error(remote);
        }
        format!("Error: {}", error)
    }

    pub(crate) fn format_mutation_error(error: &MutationError) -> String {
        match error {
            MutationError::RemoteCallFailure { source, .. } => Self::format_remote_error(source),
            MutationError::MutationRejected { message, .. } => message.clone(),
            MutationError::AlreadyInFlight(_) => {
                "Still adding to that playlist. Please wait a moment.".to_string()
            }
            MutationError::PreconditionUnmet(reason) => reason.to_string(),
        }
    }

    fn format_remote_error(error: &RemoteError) -> String {
        match error {
            RemoteError::NotFound { kind, .. } => {
                format!("That {} no longer exists on the server.", kind)
            }
            RemoteError::Unavailable(_) => {
                "Library service unavailable. Please try again.".to_string()
            }
        }
    }
}
