//! Subcommands of the `taskboard` binary and their dispatch onto a [`Board`].

use taskboard_model::task::{
    BatchTaskUpdate, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStatus,
};

use crate::board::Board;
use crate::error::StoreError;

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A task command was run without a session.
    #[error("not signed in (run `taskboard login` first)")]
    NotSignedIn,

    #[error("task not found: {0}")]
    UnknownTask(TaskId),
}

/// What to do.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account and sign in.
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        /// Must repeat the password when given.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign in to an existing account.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Add a task to the end of a column.
    Add {
        title: String,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// RFC 3339 timestamp.
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Change fields of one task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Replaces all tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, conflicts_with = "assignee")]
        unassign: bool,
    },
    /// Delete one task.
    Rm { id: String },
    /// Delete several tasks at once.
    RmMany {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Set status and/or priority on several tasks.
    Batch {
        ids: Vec<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Show the board, or a single column.
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Find tasks by title or description.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Move a task into a column at a position within that column.
    Move {
        id: String,
        to: TaskStatus,
        index: usize,
    },
}

impl Command {
    const fn needs_session(&self) -> bool {
        !matches!(
            self,
            Self::Signup { .. } | Self::Login { .. } | Self::Logout | Self::Whoami
        )
    }
}

/// Runs one command against `board` and returns what to print.
///
/// # Errors
///
/// [`CliError::NotSignedIn`] for task commands without a session, otherwise
/// whatever the store operation reports.
pub async fn run(board: &Board, command: Command) -> Result<String, CliError> {
    if command.needs_session() && !board.auth.state().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    match command {
        Command::Signup {
            email,
            password,
            confirm,
        } => {
            let session = match confirm {
                Some(confirm) => {
                    board
                        .auth
                        .signup_confirmed(&email, &password, &confirm)
                        .await?
                }
                None => board.auth.signup(&email, &password).await?,
            };
            Ok(format!("signed up as {} <{}>", session.name, session.email))
        }
        Command::Login { email, password } => {
            let session = board.auth.login(&email, &password).await?;
            Ok(format!("signed in as {} <{}>", session.name, session.email))
        }
        Command::Logout => {
            board.auth.logout().await;
            Ok("signed out".to_string())
        }
        Command::Whoami => Ok(board.auth.state().session.map_or_else(
            || "not signed in".to_string(),
            |s| format!("{} <{}>", s.name, s.email),
        )),
        Command::Add {
            title,
            status,
            description,
            priority,
            tags,
            due,
            assignee,
        } => {
            let mut draft = TaskDraft::new(title, status)
                .with_description(description)
                .with_priority(priority)
                .with_tags(tags);
            draft.due_date = due;
            draft.assigned_to = assignee;
            let task = board.tasks.add(draft).await?;
            Ok(format!("added {}", task.id))
        }
        Command::Edit {
            id,
            title,
            description,
            status,
            priority,
            tags,
            clear_tags,
            due,
            clear_due,
            assignee,
            unassign,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else {
                (!tags.is_empty()).then_some(tags)
            };
            let patch = TaskPatch {
                title,
                description,
                status,
                priority,
                tags,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                assigned_to: if unassign {
                    Some(None)
                } else {
                    assignee.map(Some)
                },
            };
            let task = board.tasks.update(&TaskId::from_string(id), patch).await?;
            Ok(format_task(&task))
        }
        Command::Rm { id } => {
            board.tasks.delete(&TaskId::from_string(id.clone())).await?;
            Ok(format!("deleted {id}"))
        }
        Command::RmMany { ids } => {
            let ids: Vec<TaskId> = ids.into_iter().map(TaskId::from_string).collect();
            let removed = board.tasks.delete_many(&ids).await?;
            Ok(format!("deleted {removed} task(s)"))
        }
        Command::Batch {
            ids,
            status,
            priority,
        } => {
            let update = BatchTaskUpdate {
                task_ids: ids.into_iter().map(TaskId::from_string).collect(),
                status,
                priority,
            };
            let matched = board.tasks.update_many(update).await?;
            Ok(format!("updated {matched} task(s)"))
        }
        Command::List { status } => {
            let statuses = status.map_or(TaskStatus::ALL.to_vec(), |s| vec![s]);
            let mut lines = Vec::new();
            for status in statuses {
                let column = board.tasks.get_by_status(status);
                lines.push(format!("{} ({})", status.label(), column.len()));
                lines.extend(column.iter().map(|task| format!("  {}", format_task(task))));
            }
            Ok(lines.join("\n"))
        }
        Command::Search { query } => Ok(board
            .tasks
            .search(&query)
            .iter()
            .map(format_task)
            .collect::<Vec<_>>()
            .join("\n")),
        Command::Move { id, to, index } => {
            let id = TaskId::from_string(id);
            let from = board
                .tasks
                .get(&id)
                .map(|t| t.status)
                .ok_or_else(|| CliError::UnknownTask(id.clone()))?;
            if board.tasks.reorder(&id, from, to, index).await? {
                Ok(format!("moved {id} to {to}"))
            } else {
                Err(CliError::UnknownTask(id))
            }
        }
    }
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "{} [{}] [{}] {}",
        task.id, task.status, task.priority, task.title
    );
    if !task.tags.is_empty() {
        line.push_str(" #");
        line.push_str(&task.tags.join(" #"));
    }
    if let Some(assignee) = &task.assigned_to {
        line.push_str(" @");
        line.push_str(assignee);
    }
    line
}
