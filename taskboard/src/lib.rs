//! `taskboard`: a local-first task board.
//!
//! A [`TaskStore`](tasks::TaskStore) keeps every task in one global sequence
//! and an [`AuthStore`](auth::AuthStore) keeps the current session, both
//! persisted through a [`Storage`](storage::Storage) backend. [`Board`]
//! bundles the two for an application.

pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod observe;
pub mod storage;
pub mod tasks;

pub use board::Board;
pub use error::StoreError;
