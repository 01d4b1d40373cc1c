//! Reading and writing the user directory and the session record.

use taskboard_model::record::{self, SESSION_KEY, USERS_KEY};
use taskboard_model::user::{Session, User};

use crate::error::StoreError;
use crate::storage::Storage;

/// Reads the user directory. Missing, unreadable, or malformed data reads
/// as an empty directory.
pub fn load_users(storage: &dyn Storage) -> Vec<User> {
    match storage.read(USERS_KEY) {
        Ok(Some(bytes)) => record::decode_users(&bytes).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to parse users");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            tracing::error!(error = %err, "failed to read users");
            Vec::new()
        }
    }
}

/// Replaces the user directory.
///
/// # Errors
///
/// [`StoreError::Persistence`] if encoding or the write fails.
pub fn save_users(storage: &dyn Storage, users: &[User]) -> Result<(), StoreError> {
    let bytes = record::encode_users(users).map_err(|e| persistence(USERS_KEY, e.into()))?;
    storage
        .write(USERS_KEY, &bytes)
        .map_err(|e| persistence(USERS_KEY, e))
}

/// Reads the persisted session, if there is a well-formed one.
pub fn load_session(storage: &dyn Storage) -> Option<Session> {
    let bytes = match storage.read(SESSION_KEY) {
        Ok(bytes) => bytes?,
        Err(err) => {
            tracing::error!(error = %err, "failed to read auth state");
            return None;
        }
    };
    record::decode_session(&bytes)
        .inspect_err(|err| tracing::warn!(error = %err, "failed to restore auth state"))
        .ok()
}

/// Replaces the persisted session.
///
/// # Errors
///
/// [`StoreError::Persistence`] if encoding or the write fails.
pub fn save_session(storage: &dyn Storage, session: &Session) -> Result<(), StoreError> {
    let bytes =
        record::encode_session(session).map_err(|e| persistence(SESSION_KEY, e.into()))?;
    storage
        .write(SESSION_KEY, &bytes)
        .map_err(|e| persistence(SESSION_KEY, e))
}

/// Deletes the persisted session.
///
/// # Errors
///
/// [`StoreError::Persistence`] if the removal fails.
pub fn clear_session(storage: &dyn Storage) -> Result<(), StoreError> {
    storage
        .remove(SESSION_KEY)
        .map_err(|e| persistence(SESSION_KEY, e))
}

fn persistence(key: &'static str, source: crate::storage::StorageError) -> StoreError {
    StoreError::Persistence { key, source }
}
