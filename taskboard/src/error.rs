//! Errors reported by the task and auth stores.

use taskboard_model::task::TaskId;
use taskboard_model::validate::ValidationError;

use crate::storage::StorageError;

/// Why a store operation was rejected or only partly completed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input failed the schema; carries the offending field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No directory record matches the email and password.
    #[error("Invalid email or password")]
    Authentication,

    /// The record being created already exists.
    #[error("{0}")]
    Conflict(String),

    /// The target of an update is not on the board.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The in-memory change was applied but could not be saved.
    ///
    /// Non-fatal: the store keeps the new state and the previously persisted
    /// document stays on disk until the next successful write.
    #[error("could not save {key}: {source}")]
    Persistence {
        /// Storage key whose write failed.
        key: &'static str,
        /// Underlying storage failure.
        source: StorageError,
    },
}

impl StoreError {
    /// Whether the operation's state change still took effect.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
