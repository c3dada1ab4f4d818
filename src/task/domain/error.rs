//! Error types for task domain validation and lifecycle transitions.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Lifecycle action attempted on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Marking a pending task as done.
    Complete,
    /// Moving a completed task into the bin.
    Archive,
    /// Taking a task out of the bin.
    Restore,
    /// Removing a binned task for good.
    Delete,
}

impl TaskAction {
    /// Returns the action name used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Archive => "archive",
            Self::Restore => "restore",
            Self::Delete => "delete",
        }
    }
}

/// Errors returned while constructing or transitioning domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The owner identifier is empty, too long, or contains whitespace.
    #[error("invalid owner identifier '{0}'")]
    InvalidOwner(String),

    /// The task text is empty after trimming.
    #[error("task text must not be empty")]
    EmptyTaskText,

    /// The task text exceeds the configured character limit.
    #[error("task text is {length} characters, limit is {limit}")]
    TaskTextTooLong {
        /// Length of the trimmed text in characters.
        length: usize,
        /// Maximum accepted length in characters.
        limit: usize,
    },

    /// A reorder request names the same task more than once.
    #[error("task {0} appears more than once in the requested order")]
    DuplicateTaskInOrder(TaskId),

    /// A reorder request names a task the caller does not own.
    #[error("task {0} in the requested order does not belong to this account")]
    UnknownTaskInOrder(TaskId),

    /// The lifecycle action is not valid from the task's current status.
    #[error("cannot {} task {task_id} while it is {}", action.as_str(), from.as_str())]
    InvalidTransition {
        /// Task the action targeted.
        task_id: TaskId,
        /// Status the task was in.
        from: TaskStatus,
        /// Rejected action.
        action: TaskAction,
    },
}
