//! Error types for the sync engine.

use thiserror::Error;

/// Errors that can occur during a sync pass.
///
/// `Source`, `RemoteQuery` and `Calendar` abort the pass. `MalformedComponent`
/// and `RemoteMutation` are absorbed where they happen and only show up in
/// warnings and report counts.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read calendar source: {0}")]
    Source(String),

    #[error("Skipped event #{index}: {reason}")]
    MalformedComponent { index: usize, reason: String },

    #[error("Could not fetch events from calendar '{calendar}': {message}")]
    RemoteQuery { calendar: String, message: String },

    #[error("Remote mutation failed: {0}")]
    RemoteMutation(String),

    #[error("Remote calendar error: {0}")]
    Remote(String),

    #[error("Could not resolve calendar '{name}': {message}")]
    Calendar { name: String, message: String },
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
