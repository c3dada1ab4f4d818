//! Task aggregate root and lifecycle status.

use super::{OwnerId, TaskAction, TaskDomainError, TaskId, TaskText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task, derived from its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet completed; eligible to be the current task.
    Pending,
    /// Completed and still visible in the completed view.
    Completed,
    /// Completed and moved into the bin.
    Archived,
}

impl TaskStatus {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Derives the status from the completion and archive timestamps.
    #[must_use]
    pub const fn from_timestamps(
        completed_at: Option<DateTime<Utc>>,
        archived_at: Option<DateTime<Utc>>,
    ) -> Self {
        match (completed_at, archived_at) {
            (_, Some(_)) => Self::Archived,
            (Some(_), None) => Self::Completed,
            (None, None) => Self::Pending,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner_id: OwnerId,
    text: TaskText,
    position: u32,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning account.
    pub owner_id: OwnerId,
    /// Persisted task text.
    pub text: TaskText,
    /// Last persisted position.
    pub position: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Archive timestamp, if in the bin.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task at the given position.
    #[must_use]
    pub fn new(
        owner_id: OwnerId,
        text: TaskText,
        position: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            owner_id,
            text,
            position,
            created_at,
            completed_at: None,
            archived_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            text: data.text,
            position: data.position,
            created_at: data.created_at,
            completed_at: data.completed_at,
            archived_at: data.archived_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning account.
    #[must_use]
    pub const fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Returns the task text.
    #[must_use]
    pub const fn text(&self) -> &TaskText {
        &self.text
    }

    /// Returns the position. Only meaningful while the task is pending.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the archive timestamp, if any.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        TaskStatus::from_timestamps(self.completed_at, self.archived_at)
    }

    /// Returns `true` while the task has not been completed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status(), TaskStatus::Pending)
    }

    /// Returns `true` when the task sits in the bin.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self.status(), TaskStatus::Archived)
    }

    /// Marks a pending task as completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// pending.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> Result<(), TaskDomainError> {
        self.require(TaskStatus::Pending, TaskAction::Complete)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Moves a completed task into the bin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// completed and not yet archived.
    pub fn mark_archived(&mut self, at: DateTime<Utc>) -> Result<(), TaskDomainError> {
        self.require(TaskStatus::Completed, TaskAction::Archive)?;
        self.archived_at = Some(at);
        Ok(())
    }

    /// Takes an archived task out of the bin and makes it pending again at
    /// `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// archived.
    pub fn restore(&mut self, position: u32) -> Result<(), TaskDomainError> {
        self.require(TaskStatus::Archived, TaskAction::Restore)?;
        self.completed_at = None;
        self.archived_at = None;
        self.position = position;
        Ok(())
    }

    /// Checks that the task may be permanently deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// archived.
    pub fn ensure_deletable(&self) -> Result<(), TaskDomainError> {
        self.require(TaskStatus::Archived, TaskAction::Delete)
    }

    /// Moves the task to a new position in the pending order.
    pub const fn reposition(&mut self, position: u32) {
        self.position = position;
    }

    fn require(&self, expected: TaskStatus, action: TaskAction) -> Result<(), TaskDomainError> {
        let from = self.status();
        if from == expected {
            return Ok(());
        }
        Err(TaskDomainError::InvalidTransition {
            task_id: self.id,
            from,
            action,
        })
    }
}
