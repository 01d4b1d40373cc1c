//! User directory records and the session derived from them.
//!
//! Passwords are kept in clear text in the directory record. This is a
//! local simulation of a backend, not a credential store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier assigned at signup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generates a fresh `user_<uuid>` identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("user_{}", Uuid::now_v7().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user, including the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Normalized (trimmed, lower-cased) and unique in the directory.
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

impl User {
    /// Creates a directory record for a new account.
    ///
    /// `email` must already be normalized. The display name defaults to
    /// the local part of the address.
    #[must_use]
    pub fn new(email: String, password: String) -> Self {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: UserId::generate(),
            email,
            name,
            password,
        }
    }

    /// Exact comparison of normalized email and password.
    #[must_use]
    pub fn has_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// The credential-free view of this user.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// The signed-in user as exposed to the view layer.
///
/// Has no credential field, so it cannot carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: String,
}
