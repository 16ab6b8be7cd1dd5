/// Error types for the comment state layer
///
/// Validation and index errors are contract violations returned before any
/// mutation. Persistence and asset-release errors are reported after the
/// in-memory change has already been applied.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::media::PhotoRef;

/// Errors raised by a key-value store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors raised while releasing a photo asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is outside the media directory", .0.display())]
    OutsideMediaDir(PathBuf),

    #[error("asset cannot be released: {0}")]
    NotReleasable(String),
}

/// Errors returned by [`CommentManager`](super::manager::CommentManager)
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("invalid comment: {0}")]
    Validation(String),

    #[error("index {index} is out of range for {len} comment(s)")]
    Index { index: usize, len: usize },

    #[error("no edit in progress")]
    NoEditInProgress,

    #[error("stored comments under '{key}' are corrupt: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store error is shared so a later flush can report the same failure
    #[error("failed to persist comments under '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: Arc<StoreError>,
    },

    #[error("failed to release photo {photo}: {source}")]
    AssetRelease {
        photo: PhotoRef,
        #[source]
        source: AssetError,
    },

    #[error("background writer has shut down")]
    WriterClosed,
}
