//! Integration tests for the global task sequence.
//!
//! Drives `TaskStore` through adds, drags between columns, searches, and
//! batch operations, checking column order after each step.
//!
//! Verification command: `cargo test --test task_ordering`

use std::sync::Arc;

use taskboard::config::Latency;
use taskboard::storage::MemoryStorage;
use taskboard::tasks::TaskStore;
use taskboard_model::task::{BatchTaskUpdate, Priority, Task, TaskDraft, TaskId, TaskStatus};

// =============================================================================
// Test helpers
// =============================================================================

fn new_store() -> TaskStore {
    TaskStore::load(Arc::new(MemoryStorage::new()), Latency::none())
}

async fn add(store: &TaskStore, title: &str, status: TaskStatus) -> TaskId {
    store
        .add(TaskDraft::new(title, status))
        .await
        .expect("add should succeed")
        .id
}

fn titles(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

fn column(store: &TaskStore, status: TaskStatus) -> Vec<String> {
    titles(&store.get_by_status(status))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn columns_follow_insertion_order() {
    let store = new_store();
    add(&store, "A", TaskStatus::Todo).await;
    add(&store, "X", TaskStatus::Done).await;
    add(&store, "B", TaskStatus::Todo).await;

    assert_eq!(column(&store, TaskStatus::Todo), ["A", "B"]);
    assert_eq!(column(&store, TaskStatus::Done), ["X"]);
    assert!(column(&store, TaskStatus::InProgress).is_empty());
    assert_eq!(titles(&store.state().tasks), ["A", "X", "B"]);
}

#[tokio::test]
async fn drag_within_column_moves_to_front() {
    let store = new_store();
    add(&store, "A", TaskStatus::Todo).await;
    add(&store, "B", TaskStatus::Todo).await;
    let c = add(&store, "C", TaskStatus::Todo).await;

    let moved = store
        .reorder(&c, TaskStatus::Todo, TaskStatus::Todo, 0)
        .await
        .unwrap();
    assert!(moved);
    assert_eq!(column(&store, TaskStatus::Todo), ["C", "A", "B"]);
}

#[tokio::test]
async fn drag_past_end_lands_after_last_member() {
    let store = new_store();
    let a = add(&store, "A", TaskStatus::Todo).await;
    add(&store, "D", TaskStatus::Done).await;
    add(&store, "B", TaskStatus::Todo).await;

    store
        .reorder(&a, TaskStatus::Todo, TaskStatus::Done, 99)
        .await
        .unwrap();

    assert_eq!(column(&store, TaskStatus::Done), ["D", "A"]);
    assert_eq!(column(&store, TaskStatus::Todo), ["B"]);
    let moved = store.get(&a).unwrap();
    assert_eq!(moved.status, TaskStatus::Done);
    assert!(moved.updated_at >= moved.created_at);
}

#[tokio::test]
async fn drag_into_empty_column() {
    let store = new_store();
    let a = add(&store, "A", TaskStatus::Todo).await;
    add(&store, "B", TaskStatus::Todo).await;

    store
        .reorder(&a, TaskStatus::Todo, TaskStatus::InProgress, 3)
        .await
        .unwrap();

    assert_eq!(column(&store, TaskStatus::InProgress), ["A"]);
    assert_eq!(titles(&store.state().tasks), ["B", "A"]);
}

#[tokio::test]
async fn drag_between_columns_at_position() {
    let store = new_store();
    let a = add(&store, "A", TaskStatus::Todo).await;
    add(&store, "P", TaskStatus::InProgress).await;
    add(&store, "Q", TaskStatus::InProgress).await;

    store
        .reorder(&a, TaskStatus::Todo, TaskStatus::InProgress, 1)
        .await
        .unwrap();

    assert_eq!(column(&store, TaskStatus::InProgress), ["P", "A", "Q"]);
}

#[tokio::test]
async fn drag_of_missing_task_changes_nothing() {
    let store = new_store();
    add(&store, "A", TaskStatus::Todo).await;
    let before = store.state().tasks;

    let moved = store
        .reorder(&TaskId::from("ghost"), TaskStatus::Todo, TaskStatus::Done, 0)
        .await
        .unwrap();

    assert!(!moved);
    assert_eq!(store.state().tasks, before);
}

#[tokio::test]
async fn search_matches_title_or_description_case_insensitively() {
    let store = new_store();
    store
        .add(TaskDraft::new("Write docs", TaskStatus::Todo).with_description("API reference"))
        .await
        .unwrap();
    add(&store, "Fix bug", TaskStatus::Done).await;

    assert_eq!(titles(&store.search("DOCS")), ["Write docs"]);
    assert_eq!(titles(&store.search("api")), ["Write docs"]);
    assert!(store.search("nothing").is_empty());
    assert_eq!(store.search("").len(), 2);
}

#[tokio::test]
async fn batch_update_and_delete_many() {
    let store = new_store();
    let a = add(&store, "A", TaskStatus::Todo).await;
    let b = add(&store, "B", TaskStatus::Todo).await;
    let c = add(&store, "C", TaskStatus::Todo).await;

    let matched = store
        .update_many(BatchTaskUpdate {
            task_ids: vec![a.clone(), c.clone(), TaskId::from("ghost")],
            status: Some(TaskStatus::Done),
            priority: Some(Priority::High),
        })
        .await
        .unwrap();
    assert_eq!(matched, 2);
    assert_eq!(column(&store, TaskStatus::Done), ["A", "C"]);
    assert_eq!(store.get(&b).unwrap().priority, Priority::Medium);

    let removed = store.delete_many(&[a, b]).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(titles(&store.state().tasks), ["C"]);
}

#[tokio::test]
async fn update_keeps_position() {
    let store = new_store();
    add(&store, "A", TaskStatus::Todo).await;
    let b = add(&store, "B", TaskStatus::Todo).await;
    add(&store, "C", TaskStatus::Todo).await;

    let patch = taskboard_model::task::TaskPatch {
        title: Some("B2".to_string()),
        ..Default::default()
    };
    store.update(&b, patch).await.unwrap();
    assert_eq!(column(&store, TaskStatus::Todo), ["A", "B2", "C"]);
}
