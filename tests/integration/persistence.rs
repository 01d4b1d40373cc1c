//! Integration tests for storing and restoring the board.
//!
//! Covers file-backed round trips, duplicate-id repair on load, malformed
//! records, and writes that fail after the in-memory change was applied.
//!
//! Verification command: `cargo test --test persistence`

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use taskboard::Board;
use taskboard::config::Latency;
use taskboard::storage::{FileStorage, MemoryStorage, Storage};
use taskboard::tasks::TaskStore;
use taskboard_model::record::{self, TASKS_KEY};
use taskboard_model::task::{Task, TaskDraft, TaskId, TaskStatus};

fn stored_tasks(storage: &dyn Storage) -> Vec<Task> {
    let bytes = storage.read(TASKS_KEY).unwrap().expect("tasks record");
    record::decode_tasks(&bytes).unwrap()
}

#[tokio::test]
async fn file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let first = TaskStore::load(Arc::new(FileStorage::new(dir.path())), Latency::none());
    let a = first
        .add(TaskDraft::new("A", TaskStatus::Todo).with_tags(["x"]))
        .await
        .unwrap();
    let b = first
        .add(TaskDraft::new("B", TaskStatus::Todo))
        .await
        .unwrap();
    first
        .reorder(&b.id, TaskStatus::Todo, TaskStatus::Todo, 0)
        .await
        .unwrap();
    let expected = first.state().tasks;

    assert!(dir.path().join("tasks.json").exists());

    let second = TaskStore::load(Arc::new(FileStorage::new(dir.path())), Latency::none());
    assert_eq!(second.state().tasks, expected);
    assert_eq!(second.get(&a.id).unwrap().tags, ["x"]);
}

#[tokio::test]
async fn board_restores_session_and_tasks() {
    let dir = tempfile::tempdir().unwrap();
    {
        let board = Board::init(Arc::new(FileStorage::new(dir.path())), Latency::none());
        board.auth.signup("a@x.com", "Sup3r$ecret").await.unwrap();
        board
            .tasks
            .add(TaskDraft::new("Persisted", TaskStatus::Done))
            .await
            .unwrap();
        board.shutdown();
    }

    let board = Board::init(Arc::new(FileStorage::new(dir.path())), Latency::none());
    assert!(board.auth.state().is_authenticated());
    assert_eq!(board.tasks.get_by_status(TaskStatus::Done).len(), 1);
}

#[test]
fn duplicate_ids_are_repaired_and_saved() {
    let now = Utc::now();
    let id = TaskId::from("dup");
    let tasks = vec![
        Task::from_draft(TaskDraft::new("first", TaskStatus::Todo), id.clone(), now),
        Task::from_draft(TaskDraft::new("second", TaskStatus::Todo), id.clone(), now),
        Task::from_draft(TaskDraft::new("third", TaskStatus::Done), id.clone(), now),
    ];
    let storage = Arc::new(
        MemoryStorage::new().with_record(TASKS_KEY, record::encode_tasks(&tasks).unwrap()),
    );

    let store = TaskStore::load(storage.clone(), Latency::none());
    let loaded = store.state().tasks;

    let ids: HashSet<&str> = loaded.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(loaded[0].id, id);
    for task in &loaded[1..] {
        let suffix = task.id.as_str().strip_prefix("dup_").expect("suffixed id");
        assert_eq!(suffix.len(), 9);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    assert_eq!(stored_tasks(storage.as_ref()), loaded);
}

#[tokio::test]
async fn malformed_record_starts_empty_and_is_replaced() {
    let storage = Arc::new(MemoryStorage::new().with_record(TASKS_KEY, "{not json"));
    let store = TaskStore::load(storage.clone(), Latency::none());
    assert!(store.state().tasks.is_empty());

    store
        .add(TaskDraft::new("Fresh", TaskStatus::Todo))
        .await
        .unwrap();
    assert_eq!(stored_tasks(storage.as_ref()).len(), 1);
}

#[tokio::test]
async fn failed_write_keeps_change_in_memory() {
    let storage = Arc::new(MemoryStorage::new());
    let store = TaskStore::load(storage.clone(), Latency::none());
    store
        .add(TaskDraft::new("Saved", TaskStatus::Todo))
        .await
        .unwrap();

    storage.set_failing(true);
    let err = store
        .add(TaskDraft::new("Unsaved", TaskStatus::Todo))
        .await
        .unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(store.state().tasks.len(), 2);
    assert!(store.state().error.is_some());
    assert_eq!(stored_tasks(storage.as_ref()).len(), 1);

    storage.set_failing(false);
    store
        .add(TaskDraft::new("Later", TaskStatus::Todo))
        .await
        .unwrap();
    assert_eq!(stored_tasks(storage.as_ref()).len(), 3);
    assert!(store.state().error.is_none());
}

#[tokio::test]
async fn deleting_unknown_id_still_writes() {
    let storage = Arc::new(MemoryStorage::new());
    let store = TaskStore::load(storage.clone(), Latency::none());
    store.delete(&TaskId::from("ghost")).await.unwrap();
    assert!(stored_tasks(storage.as_ref()).is_empty());
}
