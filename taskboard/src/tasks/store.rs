//! The task store: owner of the global task sequence.
//!
//! Every mutating operation validates its input, waits out the simulated
//! latency, and only then takes the state lock and applies its change to the
//! sequence as it is *at that moment*. The lock is never held across an
//! await, so operations that overlap in time cannot overwrite each other.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use taskboard_model::record::{self, TASKS_KEY};
use taskboard_model::task::{BatchTaskUpdate, Task, TaskDraft, TaskId, TaskPatch, TaskStatus};

use super::ordering;
use crate::config::{Latency, simulate_latency};
use crate::error::StoreError;
use crate::observe::{Activity, ActivityGuard, Listeners, SubscriptionId};
use crate::storage::Storage;

/// Snapshot of the task store handed to the view layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    /// The global sequence.
    pub tasks: Vec<Task>,
    /// True while any operation is in flight.
    pub is_loading: bool,
    /// Message of the last failed operation, cleared when one starts.
    pub error: Option<String>,
}

impl TaskState {
    /// One column of the board, in global order.
    #[must_use]
    pub fn by_status(&self, status: TaskStatus) -> Vec<Task> {
        ordering::column(&self.tasks, status)
    }
}

struct Inner {
    tasks: Vec<Task>,
    error: Option<String>,
}

/// Whether a transition touched the sequence (and so must be persisted).
enum Step<R> {
    Changed(R),
    Unchanged(R),
}

/// Owns the ordered collection of tasks.
pub struct TaskStore {
    storage: Arc<dyn Storage>,
    latency: Latency,
    inner: Mutex<Inner>,
    activity: Activity,
    listeners: Listeners<TaskState>,
}

impl TaskStore {
    /// Rehydrates the board from storage.
    ///
    /// A missing record is an empty board. An unreadable or malformed record
    /// is logged and also treated as an empty board. Duplicate ids are
    /// repaired and the repaired sequence is written back immediately.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, latency: Latency) -> Self {
        let tasks = rehydrate(storage.as_ref());
        tracing::info!(count = tasks.len(), "task board loaded");
        Self {
            storage,
            latency,
            inner: Mutex::new(Inner { tasks, error: None }),
            activity: Activity::default(),
            listeners: Listeners::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> TaskState {
        let inner = self.inner.lock();
        self.snapshot(&inner)
    }

    /// Registers a listener called with the new snapshot after every change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&TaskState) + Send + Sync + 'static,
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

    /// Looks up a single task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner.lock().tasks.iter().find(|t| &t.id == id).cloned()
    }

    /// Tasks in `status`, in global order.
    #[must_use]
    pub fn get_by_status(&self, status: TaskStatus) -> Vec<Task> {
        ordering::column(&self.inner.lock().tasks, status)
    }

    /// Tasks whose title or description contains `query`, ignoring case.
    ///
    /// An empty query returns every task.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Task> {
        ordering::search(&self.inner.lock().tasks, query)
    }

    /// Validates `draft` and appends a new task to the end of the sequence.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if the draft fails the schema, or
    /// [`StoreError::Persistence`] if the task was added but not saved.
    pub async fn add(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        let _busy = self.begin();
        draft.validate().map_err(|e| self.reject(e.into()))?;
        simulate_latency(self.latency.add).await;

        let task = Task::from_draft(draft, TaskId::new(), Utc::now());
        tracing::debug!(task_id = %task.id, status = %task.status, "adding task");
        self.commit(|tasks| {
            tasks.push(task.clone());
            Ok(Step::Changed(task))
        })
    }

    /// Merges the supplied fields of `patch` into a task, in place.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if a supplied field is invalid,
    /// [`StoreError::NotFound`] if no task has `id` once the update runs, or
    /// [`StoreError::Persistence`] if the change was applied but not saved.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let _busy = self.begin();
        patch.validate().map_err(|e| self.reject(e.into()))?;
        simulate_latency(self.latency.update).await;

        self.commit(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            task.apply_patch(patch, Utc::now());
            tracing::debug!(task_id = %id, "updated task");
            Ok(Step::Changed(task.clone()))
        })
    }

    /// Removes a task. Deleting an id that is not on the board is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the sequence could not be saved.
    pub async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        let _busy = self.begin();
        simulate_latency(self.latency.delete).await;

        self.commit(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| &t.id != id);
            tracing::debug!(task_id = %id, removed = before - tasks.len(), "deleted task");
            Ok(Step::Changed(()))
        })
    }

    /// Removes every task whose id is in `ids`, persisting once.
    ///
    /// Returns how many tasks were removed; unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the sequence could not be saved.
    pub async fn delete_many(&self, ids: &[TaskId]) -> Result<usize, StoreError> {
        let _busy = self.begin();
        simulate_latency(self.latency.delete_many).await;

        let doomed: HashSet<&TaskId> = ids.iter().collect();
        self.commit(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| !doomed.contains(&t.id));
            let removed = before - tasks.len();
            tracing::debug!(requested = ids.len(), removed, "deleted tasks");
            Ok(Step::Changed(removed))
        })
    }

    /// Applies a status and/or priority to every selected task.
    ///
    /// Returns how many tasks matched.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if no task ids are given (nothing changes),
    /// or [`StoreError::Persistence`] if the change was applied but not saved.
    pub async fn update_many(&self, update: BatchTaskUpdate) -> Result<usize, StoreError> {
        let _busy = self.begin();
        update.validate().map_err(|e| self.reject(e.into()))?;
        simulate_latency(self.latency.update_many).await;

        let selected: HashSet<&TaskId> = update.task_ids.iter().collect();
        self.commit(|tasks| {
            let now = Utc::now();
            let mut matched = 0;
            for task in tasks.iter_mut().filter(|t| selected.contains(&t.id)) {
                if let Some(status) = update.status {
                    task.status = status;
                }
                if let Some(priority) = update.priority {
                    task.priority = priority;
                }
                task.touch(now);
                matched += 1;
            }
            tracing::debug!(matched, "batch updated tasks");
            Ok(Step::Changed(matched))
        })
    }

    /// Moves a task into column `to_status` at column-relative
    /// `target_index`, as the result of a drag.
    ///
    /// Returns `false` without touching anything if the task is gone.
    /// `from_status` is where the drag started; the task's actual status at
    /// the time of the move wins if they disagree.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the move was applied but not saved.
    pub async fn reorder(
        &self,
        task_id: &TaskId,
        from_status: TaskStatus,
        to_status: TaskStatus,
        target_index: usize,
    ) -> Result<bool, StoreError> {
        let _busy = self.begin();
        simulate_latency(self.latency.reorder).await;

        self.commit(|tasks| {
            if let Some(current) = tasks.iter().find(|t| &t.id == task_id) {
                if current.status != from_status {
                    tracing::debug!(
                        task_id = %task_id,
                        expected = %from_status,
                        actual = %current.status,
                        "drag origin differs from task status"
                    );
                }
            }
            match ordering::reorder(tasks, task_id, to_status, target_index, Utc::now()) {
                Some(at) => {
                    tracing::debug!(
                        task_id = %task_id,
                        to = %to_status,
                        target_index,
                        global_index = at,
                        "moved task"
                    );
                    Ok(Step::Changed(true))
                }
                None => Ok(Step::Unchanged(false)),
            }
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn snapshot(&self, inner: &Inner) -> TaskState {
        TaskState {
            tasks: inner.tasks.clone(),
            is_loading: self.activity.is_busy(),
            error: inner.error.clone(),
        }
    }

    fn notify(&self) {
        let state = self.state();
        self.listeners.notify(&state);
    }

    /// Marks an operation as in flight and clears the last error.
    fn begin(&self) -> ActivityGuard<'_, impl Fn() + '_> {
        let guard = self.activity.begin(|| self.notify());
        self.inner.lock().error = None;
        guard
    }

    /// Records `err` as the last error and hands it back.
    fn reject(&self, err: StoreError) -> StoreError {
        tracing::debug!(error = %err, "task operation rejected");
        self.inner.lock().error = Some(err.to_string());
        err
    }

    /// Applies `apply` to the current sequence under the lock, persists the
    /// result if it changed, then notifies listeners.
    ///
    /// A failed write keeps the in-memory change and is reported as
    /// [`StoreError::Persistence`].
    fn commit<R>(
        &self,
        apply: impl FnOnce(&mut Vec<Task>) -> Result<Step<R>, StoreError>,
    ) -> Result<R, StoreError> {
        let (result, state) = {
            let mut inner = self.inner.lock();
            match apply(&mut inner.tasks) {
                Err(err) => {
                    drop(inner);
                    return Err(self.reject(err));
                }
                Ok(Step::Unchanged(value)) => return Ok(value),
                Ok(Step::Changed(value)) => {
                    let result = match persist(self.storage.as_ref(), &inner.tasks) {
                        Ok(()) => Ok(value),
                        Err(err) => {
                            tracing::warn!(
                                key = TASKS_KEY,
                                error = %err,
                                "task change applied but not persisted"
                            );
                            inner.error = Some(err.to_string());
                            Err(err)
                        }
                    };
                    (result, self.snapshot(&inner))
                }
            }
        };
        self.listeners.notify(&state);
        result
    }
}

fn persist(storage: &dyn Storage, tasks: &[Task]) -> Result<(), StoreError> {
    let bytes = record::encode_tasks(tasks).map_err(|e| StoreError::Persistence {
        key: TASKS_KEY,
        source: e.into(),
    })?;
    storage
        .write(TASKS_KEY, &bytes)
        .map_err(|source| StoreError::Persistence {
            key: TASKS_KEY,
            source,
        })
}

fn rehydrate(storage: &dyn Storage) -> Vec<Task> {
    let bytes = match storage.read(TASKS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::error!(error = %err, "failed to read stored tasks");
            return Vec::new();
        }
    };
    let mut tasks = match record::decode_tasks(&bytes) {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::error!(error = %err, "failed to restore tasks");
            return Vec::new();
        }
    };

    let repaired = ordering::repair_duplicate_ids(&mut tasks);
    if repaired > 0 {
        tracing::warn!(repaired, "stored tasks had duplicate ids");
        if let Err(err) = persist(storage, &tasks) {
            tracing::warn!(error = %err, "could not save repaired task ids");
        }
    }
    tasks
}
