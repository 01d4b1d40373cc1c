//! Pure operations on the global task sequence.
//!
//! The board keeps every task in one ordered `Vec`. A column is that
//! sequence filtered by status, so moving a task between columns is a
//! remove from the sequence followed by one insert at a computed index.
//! Nothing else in the sequence moves.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use taskboard_model::task::{Task, TaskId, TaskStatus};

/// Length of the random suffix appended to a duplicated id.
const REPAIR_SUFFIX_LEN: usize = 9;

/// Tasks in `status`, in global order.
#[must_use]
pub fn column(tasks: &[Task], status: TaskStatus) -> Vec<Task> {
    tasks.iter().filter(|t| t.status == status).cloned().collect()
}

/// Tasks whose title or description contains `query`, ignoring case, in
/// global order. An empty query matches everything.
#[must_use]
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    let lowered = query.to_lowercase();
    tasks.iter().filter(|t| t.matches(&lowered)).cloned().collect()
}

/// Global index at which a task entering column `status` at
/// `target_index` must be inserted.
///
/// - empty column: end of the sequence
/// - `target_index` past the column: right after the column's last task
/// - otherwise: right before the task currently at `target_index`
#[must_use]
pub fn insertion_index(tasks: &[Task], status: TaskStatus, target_index: usize) -> usize {
    let column = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == status)
        .map(|(i, _)| i);

    let mut last = None;
    for (position, global) in column.enumerate() {
        if position == target_index {
            return global;
        }
        last = Some(global);
    }
    last.map_or(tasks.len(), |global| global + 1)
}

/// Moves `task_id` into column `to` at column-relative `target_index`.
///
/// Returns the task's new global index, or `None` (sequence untouched) when
/// the task is not on the board.
pub fn reorder(
    tasks: &mut Vec<Task>,
    task_id: &TaskId,
    to: TaskStatus,
    target_index: usize,
    now: DateTime<Utc>,
) -> Option<usize> {
    let from = tasks.iter().position(|t| &t.id == task_id)?;
    let mut task = tasks.remove(from);
    task.status = to;
    task.touch(now);

    let at = insertion_index(tasks, to, target_index);
    tasks.insert(at, task);
    Some(at)
}

/// Gives every task after the first with a given id a fresh id of the form
/// `<old>_<suffix>`. Returns how many tasks were renamed.
pub fn repair_duplicate_ids(tasks: &mut [Task]) -> usize {
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(tasks.len());
    let mut repaired = 0;
    let mut rng = rand::rng();

    for task in tasks.iter_mut() {
        if seen.insert(task.id.clone()) {
            continue;
        }
        let fresh = loop {
            let suffix: String = (&mut rng)
                .sample_iter(Alphanumeric)
                .take(REPAIR_SUFFIX_LEN)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            let candidate = TaskId::from_string(format!("{}_{suffix}", task.id));
            if !seen.contains(&candidate) {
                break candidate;
            }
        };
        tracing::warn!(old = %task.id, new = %fresh, "repaired duplicate task id");
        seen.insert(fresh.clone());
        task.id = fresh;
        repaired += 1;
    }
    repaired
}
