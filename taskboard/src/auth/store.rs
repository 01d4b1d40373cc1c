//! The auth store: current session plus login, signup and logout against
//! the local user directory.

use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_model::user::{Session, User};
use taskboard_model::validate;

use super::directory;
use crate::config::{Latency, simulate_latency};
use crate::error::StoreError;
use crate::observe::{Activity, ActivityGuard, Listeners, SubscriptionId};
use crate::storage::Storage;

/// Message for an email that is already registered.
const EMAIL_TAKEN: &str = "User with this email already exists";

/// Snapshot of the auth store handed to the view layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// The signed-in user, if any.
    pub session: Option<Session>,
    /// True while any operation is in flight.
    pub is_loading: bool,
    /// True once [`AuthStore::restore_session`] has run.
    pub is_initialized: bool,
    /// Message of the last failed operation.
    pub error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    initialized: bool,
    error: Option<String>,
}

/// Owns the current session. The user directory is read from storage on
/// demand and never cached.
pub struct AuthStore {
    storage: Arc<dyn Storage>,
    latency: Latency,
    inner: Mutex<Inner>,
    activity: Activity,
    listeners: Listeners<AuthState>,
}

impl AuthStore {
    /// Creates a signed-out store. Call [`restore_session`](Self::restore_session)
    /// once at startup.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, latency: Latency) -> Self {
        Self {
            storage,
            latency,
            inner: Mutex::new(Inner::default()),
            activity: Activity::default(),
            listeners: Listeners::default(),
        }
    }

    /// Adopts the persisted session if there is a well-formed one.
    ///
    /// Never fails: anything unreadable means "signed out".
    pub fn restore_session(&self) -> Option<Session> {
        let session = directory::load_session(self.storage.as_ref());
        {
            let mut inner = self.inner.lock();
            inner.session.clone_from(&session);
            inner.initialized = true;
        }
        match &session {
            Some(s) => tracing::info!(user_id = %s.id, "session restored"),
            None => tracing::debug!("no session to restore"),
        }
        self.notify();
        session
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        let inner = self.inner.lock();
        AuthState {
            session: inner.session.clone(),
            is_loading: self.activity.is_busy(),
            is_initialized: inner.initialized,
            error: inner.error.clone(),
        }
    }

    /// Registers a listener called with the new snapshot after every change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&AuthState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub(crate) fn clear_listeners(&self) {
        self.listeners.clear();
    }

    /// Signs in with an email and password from the directory.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a malformed email or empty password,
    /// [`StoreError::Authentication`] if no user matches, or
    /// [`StoreError::Persistence`] if signed in but the session was not saved.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let _busy = self.begin();
        let email = validate::email(email)
            .and_then(|email| validate::login_password(password).map(|()| email))
            .map_err(|e| self.reject(e.into()))?;
        simulate_latency(self.latency.login).await;

        let users = directory::load_users(self.storage.as_ref());
        let Some(user) = users.iter().find(|u| u.has_credentials(&email, password)) else {
            tracing::info!(email = %email, "login rejected");
            return Err(self.reject(StoreError::Authentication));
        };
        tracing::info!(user_id = %user.id, "logged in");
        self.start_session(user.session())
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a malformed email or weak password,
    /// [`StoreError::Conflict`] if the email is already registered, or
    /// [`StoreError::Persistence`] if the directory or session was not saved.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let _busy = self.begin();
        let email = validate::email(email)
            .and_then(|email| validate::password_strength(password).map(|()| email))
            .map_err(|e| self.reject(e.into()))?;
        self.register(email, password).await
    }

    /// Like [`signup`](Self::signup), with a confirmation field that must
    /// repeat the password. Email and password are checked first.
    ///
    /// # Errors
    ///
    /// As [`signup`](Self::signup), plus [`StoreError::Validation`] on
    /// `confirmPassword` if the confirmation does not match.
    pub async fn signup_confirmed(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Session, StoreError> {
        let _busy = self.begin();
        let email = validate::email(email)
            .and_then(|email| validate::password_strength(password).map(|()| email))
            .and_then(|email| validate::password_confirmation(password, confirm).map(|()| email))
            .map_err(|e| self.reject(e.into()))?;
        self.register(email, password).await
    }

    /// Appends a user with an already validated `email` and signs it in.
    async fn register(&self, email: String, password: &str) -> Result<Session, StoreError> {
        simulate_latency(self.latency.signup).await;

        let user = {
            // Held across read-check-append-write so two signups for the same
            // email cannot both pass the existence check.
            let guard = self.inner.lock();
            let mut users = directory::load_users(self.storage.as_ref());
            if users.iter().any(|u| u.email == email) {
                drop(guard);
                return Err(self.reject(StoreError::Conflict(EMAIL_TAKEN.to_string())));
            }
            let user = User::new(email, password.to_string());
            users.push(user.clone());
            if let Err(err) = directory::save_users(self.storage.as_ref(), &users) {
                drop(guard);
                tracing::warn!(error = %err, "user directory not persisted");
                return Err(self.reject(err));
            }
            drop(guard);
            user
        };
        tracing::info!(user_id = %user.id, "account created");
        self.start_session(user.session())
    }

    /// Signs out. Always succeeds; a failure to remove the stored session is
    /// only logged.
    pub async fn logout(&self) {
        let _busy = self.begin();
        simulate_latency(self.latency.logout).await;

        let previous = {
            let mut inner = self.inner.lock();
            inner.error = None;
            let previous = inner.session.take();
            if let Err(err) = directory::clear_session(self.storage.as_ref()) {
                tracing::warn!(error = %err, "stored session not removed");
            }
            previous
        };
        if let Some(session) = previous {
            tracing::info!(user_id = %session.id, "logged out");
        }
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn notify(&self) {
        let state = self.state();
        self.listeners.notify(&state);
    }

    fn begin(&self) -> ActivityGuard<'_, impl Fn() + '_> {
        let guard = self.activity.begin(|| self.notify());
        self.inner.lock().error = None;
        guard
    }

    fn reject(&self, err: StoreError) -> StoreError {
        tracing::debug!(error = %err, "auth operation rejected");
        self.inner.lock().error = Some(err.to_string());
        err
    }

    /// Makes `session` current in memory, then persists it.
    fn start_session(&self, session: Session) -> Result<Session, StoreError> {
        let saved = {
            let mut inner = self.inner.lock();
            inner.session = Some(session.clone());
            directory::save_session(self.storage.as_ref(), &session)
        };
        self.notify();
        match saved {
            Ok(()) => Ok(session),
            Err(err) => {
                tracing::warn!(error = %err, "session not persisted");
                Err(self.reject(err))
            }
        }
    }
}
