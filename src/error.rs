//! Error types for library service calls and batch mutations

use thiserror::Error;

use crate::model::EntryKind;

/// Errors raised by the library service itself (transport level)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service does not know the requested item
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntryKind, id: String },

    /// The service could not be reached or refused to answer
    #[error("Library service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that end a batch mutation
#[derive(Error, Debug)]
pub enum MutationError {
    /// A per-entry call failed; entries after it were never attempted
    #[error("Remote call failed for {id}: {source}")]
    RemoteCallFailure {
        id: String,
        #[source]
        source: RemoteError,
    },

    /// The service answered with a typed failure payload
    #[error("{message}")]
    MutationRejected { playlist_id: String, message: String },

    /// The target already has a mutation running
    #[error("A mutation for {0} is already in progress")]
    AlreadyInFlight(String),

    /// The triggering control should have been disabled
    #[error("{0}")]
    PreconditionUnmet(&'static str),
}

pub type MutationResult<T> = Result<T, MutationError>;
