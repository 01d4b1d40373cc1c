//! The application context: one task store and one auth store sharing a
//! storage backend.

use std::sync::Arc;

use crate::auth::AuthStore;
use crate::config::Latency;
use crate::storage::Storage;
use crate::tasks::TaskStore;

/// Both stores, constructed once at startup and shared by handle.
///
/// Cloning a `Board` is cheap and yields handles to the same stores.
#[derive(Clone)]
pub struct Board {
    pub tasks: Arc<TaskStore>,
    pub auth: Arc<AuthStore>,
}

impl Board {
    /// Restores the session and rehydrates the task sequence from `storage`.
    #[must_use]
    pub fn init(storage: Arc<dyn Storage>, latency: Latency) -> Self {
        let auth = AuthStore::new(Arc::clone(&storage), latency);
        let session = auth.restore_session();
        let tasks = TaskStore::load(storage, latency);
        tracing::info!(
            signed_in = session.is_some(),
            tasks = tasks.state().tasks.len(),
            "board ready"
        );
        Self {
            tasks: Arc::new(tasks),
            auth: Arc::new(auth),
        }
    }

    /// Detaches every listener from both stores.
    pub fn shutdown(self) {
        self.tasks.clear_listeners();
        self.auth.clear_listeners();
        tracing::info!("board shut down");
    }
}
