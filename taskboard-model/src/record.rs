//! Storage records: the keys each store owns and the JSON encoding of the
//! whole documents written under them.
//!
//! Every record is replaced as a whole on write; there are no partial
//! updates.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::task::Task;
use crate::user::{Session, User};

/// Key holding the sanitized session of the signed-in user.
pub const SESSION_KEY: &str = "auth_user";

/// Key holding the full user directory, credentials included.
pub const USERS_KEY: &str = "app_users";

/// Key holding the global task sequence.
pub const TASKS_KEY: &str = "tasks";

/// Error type for record encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Serialization failed.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    /// The stored bytes are not a valid document for this key.
    #[error("malformed {key} record: {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
}

fn encode<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Result<Vec<u8>, RecordError> {
    serde_json::to_vec(value).map_err(|source| RecordError::Encode { key, source })
}

fn decode<T: DeserializeOwned>(key: &'static str, bytes: &[u8]) -> Result<T, RecordError> {
    serde_json::from_slice(bytes).map_err(|source| RecordError::Decode { key, source })
}

/// Encodes the global task sequence.
///
/// # Errors
///
/// Returns [`RecordError::Encode`] if serialization fails.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>, RecordError> {
    encode(TASKS_KEY, tasks)
}

/// Decodes the global task sequence.
///
/// # Errors
///
/// Returns [`RecordError::Decode`] if the bytes are not a task list.
pub fn decode_tasks(bytes: &[u8]) -> Result<Vec<Task>, RecordError> {
    decode(TASKS_KEY, bytes)
}

/// Encodes the user directory.
///
/// # Errors
///
/// Returns [`RecordError::Encode`] if serialization fails.
pub fn encode_users(users: &[User]) -> Result<Vec<u8>, RecordError> {
    encode(USERS_KEY, users)
}

/// Decodes the user directory.
///
/// # Errors
///
/// Returns [`RecordError::Decode`] if the bytes are not a user list.
pub fn decode_users(bytes: &[u8]) -> Result<Vec<User>, RecordError> {
    decode(USERS_KEY, bytes)
}

/// Encodes a session.
///
/// # Errors
///
/// Returns [`RecordError::Encode`] if serialization fails.
pub fn encode_session(session: &Session) -> Result<Vec<u8>, RecordError> {
    encode(SESSION_KEY, session)
}

/// Decodes a session.
///
/// # Errors
///
/// Returns [`RecordError::Decode`] if the bytes are not a session object.
pub fn decode_session(bytes: &[u8]) -> Result<Session, RecordError> {
    decode(SESSION_KEY, bytes)
}
