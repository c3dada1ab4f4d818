//! Service layer for the one-task-at-a-time list.
//!
//! The current task is never stored: it is recomputed as the head of the
//! pending order on every call, so completing it advances the list and
//! skipping it is a rotation of the persisted order.

use crate::task::{
    domain::{
        CompletionDay, OwnerId, ReorderRequest, Task, TaskDomainError, TaskId, TaskText,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for task list operations.
#[derive(Debug, Error)]
pub enum TaskListError {
    /// Input was malformed: blank text, bad owner, or an invalid order.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The task does not exist, belongs to another account, or is not in the
    /// status the operation requires.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The store failed; nothing was committed.
    #[error(transparent)]
    Store(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskListError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskRepositoryError::UnknownTaskInOrder(id) => {
                Self::Validation(TaskDomainError::UnknownTaskInOrder(id))
            }
            other => Self::Store(other),
        }
    }
}

/// Result type for task list service operations.
pub type TaskListResult<T> = Result<T, TaskListError>;

/// Snapshot of what the client shows on its main screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListOverview {
    /// Head of the pending order, if any.
    pub current: Option<Task>,
    /// Number of pending tasks, including the current one.
    pub pending_count: usize,
    /// Number of unarchived tasks completed on the current UTC day.
    pub completed_today: usize,
}

/// Task list orchestration service.
pub struct TaskListService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    max_text_chars: usize,
}

impl<R, C> Clone for TaskListService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            max_text_chars: self.max_text_chars,
        }
    }
}

impl<R, C> TaskListService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task list service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            max_text_chars: TaskText::MAX_CHARS,
        }
    }

    /// Sets the character limit applied to new task text.
    #[must_use]
    pub const fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    /// Returns the owner's pending tasks, head first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when the lookup fails.
    pub async fn list_pending(&self, owner: &OwnerId) -> TaskListResult<Vec<Task>> {
        let pending = self.repository.list_pending(owner).await?;
        debug!(owner_id = %owner, count = pending.len(), "listed pending tasks");
        Ok(pending)
    }

    /// Returns the task the owner should work on now.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when the lookup fails.
    pub async fn current_task(&self, owner: &OwnerId) -> TaskListResult<Option<Task>> {
        Ok(self.list_pending(owner).await?.into_iter().next())
    }

    /// Appends a task to the tail of the pending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Validation`] when the text is blank or too
    /// long, or [`TaskListError::Store`] when persistence fails.
    pub async fn create(&self, owner: &OwnerId, text: &str) -> TaskListResult<Task> {
        let task_text = TaskText::with_limit(text, self.max_text_chars).inspect_err(|err| {
            warn!(owner_id = %owner, error = %err, "rejected task text");
        })?;
        let task = self
            .repository
            .create(owner, &task_text, self.clock.utc())
            .await?;
        info!(owner_id = %owner, task_id = %task.id(), position = task.position(), "created task");
        Ok(task)
    }

    /// Marks a pending task as completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::NotFound`] when the owner has no pending task
    /// with this identifier.
    pub async fn complete(&self, owner: &OwnerId, id: TaskId) -> TaskListResult<Task> {
        let task = self
            .repository
            .complete(owner, id, self.clock.utc())
            .await
            .inspect_err(|err| warn!(owner_id = %owner, task_id = %id, error = %err, "complete failed"))?;
        info!(owner_id = %owner, task_id = %id, "completed task");
        Ok(task)
    }

    /// Completes the current task, if there is one.
    ///
    /// Returns the completed task, or `Ok(None)` when nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::NotFound`] when the head changed concurrently
    /// and is no longer pending, or [`TaskListError::Store`] on failure.
    pub async fn complete_current(&self, owner: &OwnerId) -> TaskListResult<Option<Task>> {
        let Some(current) = self.current_task(owner).await? else {
            return Ok(None);
        };
        self.complete(owner, current.id()).await.map(Some)
    }

    /// Moves the current task to the end of the pending order.
    ///
    /// Returns the new pending order. With fewer than two pending tasks the
    /// order is returned unchanged and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when persistence fails.
    pub async fn skip(&self, owner: &OwnerId) -> TaskListResult<Vec<Task>> {
        let order = self.repository.rotate_pending(owner).await?;
        if order.len() < 2 {
            debug!(owner_id = %owner, "nothing to skip past");
        } else {
            info!(owner_id = %owner, "skipped current task");
        }
        Ok(order)
    }

    /// Rewrites the pending order.
    ///
    /// Listed pending tasks come first in the given order; pending tasks the
    /// list leaves out follow in their existing order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Validation`] when an identifier is repeated or
    /// does not belong to the owner; nothing is changed in that case.
    pub async fn reorder(&self, owner: &OwnerId, ids: Vec<TaskId>) -> TaskListResult<()> {
        let request = ReorderRequest::new(ids)?;
        self.repository
            .reorder(owner, &request)
            .await
            .inspect_err(|err| warn!(owner_id = %owner, error = %err, "reorder rejected"))?;
        info!(owner_id = %owner, count = request.ids().len(), "reordered tasks");
        Ok(())
    }

    /// Returns every completed task that is not in the bin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when the lookup fails.
    pub async fn list_completed(&self, owner: &OwnerId) -> TaskListResult<Vec<Task>> {
        Ok(self.repository.list_completed(owner).await?)
    }

    /// Returns the unarchived tasks completed on the current UTC day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when the lookup fails.
    pub async fn completed_today(&self, owner: &OwnerId) -> TaskListResult<Vec<Task>> {
        let today = CompletionDay::containing(self.clock.utc());
        let completed = self.list_completed(owner).await?;
        Ok(completed
            .into_iter()
            .filter(|task| today.includes(task))
            .collect())
    }

    /// Returns the tasks in the bin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when the lookup fails.
    pub async fn list_archived(&self, owner: &OwnerId) -> TaskListResult<Vec<Task>> {
        Ok(self.repository.list_archived(owner).await?)
    }

    /// Moves every completed task into the bin and returns how many moved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when persistence fails.
    pub async fn archive_completed(&self, owner: &OwnerId) -> TaskListResult<u64> {
        let archived = self
            .repository
            .archive_completed(owner, self.clock.utc())
            .await?;
        info!(owner_id = %owner, archived, "archived completed tasks");
        Ok(archived)
    }

    /// Takes a task out of the bin and appends it to the pending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::NotFound`] when the owner has no archived task
    /// with this identifier.
    pub async fn restore(&self, owner: &OwnerId, id: TaskId) -> TaskListResult<Task> {
        let task = self
            .repository
            .restore(owner, id)
            .await
            .inspect_err(|err| warn!(owner_id = %owner, task_id = %id, error = %err, "restore failed"))?;
        info!(owner_id = %owner, task_id = %id, position = task.position(), "restored task");
        Ok(task)
    }

    /// Permanently deletes a task from the bin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::NotFound`] when the owner has no archived task
    /// with this identifier.
    pub async fn permanent_delete(&self, owner: &OwnerId, id: TaskId) -> TaskListResult<()> {
        self.repository
            .permanent_delete(owner, id)
            .await
            .inspect_err(|err| warn!(owner_id = %owner, task_id = %id, error = %err, "delete failed"))?;
        info!(owner_id = %owner, task_id = %id, "deleted task");
        Ok(())
    }

    /// Permanently deletes everything in the bin and returns how many tasks
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when persistence fails.
    pub async fn empty_bin(&self, owner: &OwnerId) -> TaskListResult<u64> {
        let deleted = self.repository.empty_bin(owner).await?;
        info!(owner_id = %owner, deleted, "emptied bin");
        Ok(deleted)
    }

    /// Returns the current task together with the pending and completed-today
    /// counts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskListError::Store`] when a lookup fails.
    pub async fn overview(&self, owner: &OwnerId) -> TaskListResult<TaskListOverview> {
        let pending = self.list_pending(owner).await?;
        let completed_today = self.completed_today(owner).await?.len();
        let pending_count = pending.len();
        Ok(TaskListOverview {
            current: pending.into_iter().next(),
            pending_count,
            completed_today,
        })
    }
}
