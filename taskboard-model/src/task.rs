//! Task types for the board.
//!
//! A [`Task`] lives in exactly one column, selected by its [`TaskStatus`].
//! Column order is not stored on the task itself; it falls out of the
//! task's position in the store's single global sequence.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::{self, ValidationError};

/// Opaque task identifier.
///
/// Fresh ids are UUID v7 text, but any string read back from storage is
/// accepted so that hand-edited or legacy records still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All statuses in board order (left to right).
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Column heading shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::new("status", "Invalid task status")),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::new("priority", "Invalid priority level")),
        }
    }
}

/// A task on the board, exactly as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique across the whole board, immutable.
    pub id: TaskId,
    /// Non-empty, at most 255 characters.
    pub title: String,
    /// At most 2000 characters.
    #[serde(default)]
    pub description: String,
    /// Column the task sits in.
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Display order matters; equality of tag sets does not depend on it.
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 date-time, checked for format only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Field-wise equality, except `tags`, which compare as a multiset.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.status == other.status
            && self.priority == other.priority
            && self.due_date == other.due_date
            && self.assigned_to == other.assigned_to
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && same_tags(&self.tags, &other.tags)
    }
}

impl Eq for Task {}

fn same_tags(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&String> = a.iter().collect();
    let mut b: Vec<&String> = b.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

impl Task {
    /// Builds a new task from an already validated draft.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, id: TaskId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            tags: draft.tags,
            due_date: draft.due_date,
            assigned_to: draft.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a mutation at `now`.
    ///
    /// Clamped so `updated_at` never falls behind `created_at` when the
    /// wall clock steps backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Merges the supplied fields of `patch` over this task and touches it.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        self.touch(now);
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `lowered_query` must already be lower-cased.
    #[must_use]
    pub fn matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query)
            || self.description.to_lowercase().contains(lowered_query)
    }
}

/// User-entered fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with the required fields; everything else defaulted.
    #[must_use]
    pub fn new(title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::default(),
            tags: Vec::new(),
            due_date: None,
            assigned_to: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    #[must_use]
    pub fn with_assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = Some(assignee.into());
        self
    }

    /// Checks the draft against the task schema.
    ///
    /// # Errors
    ///
    /// Returns the first failing field as a [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::task_title(&self.title)?;
        validate::task_description(&self.description)?;
        if let Some(due) = &self.due_date {
            validate::due_date(due)?;
        }
        Ok(())
    }
}

/// A partial update to a task. `None` leaves a field as it is.
///
/// The optional task fields take `Some(None)` to clear them; in JSON that is
/// an explicit `null`, while an absent key leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<Option<String>>,
}

/// Maps a key that is present (even as `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// Checks only the fields that were supplied.
    ///
    /// # Errors
    ///
    /// Returns the first failing field as a [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate::task_title(title)?;
        }
        if let Some(description) = &self.description {
            validate::task_description(description)?;
        }
        if let Some(Some(due)) = &self.due_date {
            validate::due_date(due)?;
        }
        Ok(())
    }
}

/// Status and/or priority applied to a selection of tasks at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTaskUpdate {
    pub task_ids: Vec<TaskId>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl BatchTaskUpdate {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on `taskIds` when no task is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_ids.is_empty() {
            return Err(ValidationError::new(
                "taskIds",
                "At least one task must be selected",
            ));
        }
        Ok(())
    }
}
