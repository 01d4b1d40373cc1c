//! Shared data model for Taskboard: tasks, users, sessions, the validation
//! rules applied to user input, and the JSON records written to storage.

pub mod record;
pub mod task;
pub mod user;
pub mod validate;
