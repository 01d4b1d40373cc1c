//! The task board.
//!
//! Tasks live in a single global sequence; each column is that sequence
//! filtered by status. [`TaskStore`] owns the sequence and persists it after
//! every change, and [`ordering`] holds the pure sequence operations it is
//! built on.

pub mod ordering;
pub mod store;

pub use store::{TaskState, TaskStore};
