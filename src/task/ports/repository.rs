//! Repository port for owner-scoped task storage and lifecycle transitions.

use crate::task::domain::{OwnerId, ReorderRequest, Task, TaskId, TaskText};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task storage contract.
///
/// Every method is scoped to `owner`: rows belonging to other accounts are
/// never read or written, and are reported as [`TaskRepositoryError::NotFound`]
/// exactly like rows that do not exist. Each mutating call is applied
/// atomically; readers never observe a partially applied call.
///
/// Implementations keep the positions of an owner's pending tasks contiguous
/// (`0..N-1`).
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns the owner's pending tasks in ascending position order.
    async fn list_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's completed, unarchived tasks in ascending
    /// completion order.
    async fn list_completed(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's archived tasks in ascending archive order.
    async fn list_archived(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Finds one of the owner's tasks by identifier, in any status.
    async fn find(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Appends a new pending task to the tail of the owner's pending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when storage fails.
    async fn create(
        &self,
        owner: &OwnerId,
        text: &TaskText,
        created_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Marks a pending task as completed and closes the gap it leaves in the
    /// pending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the owner has no pending
    /// task with this identifier.
    async fn complete(
        &self,
        owner: &OwnerId,
        id: TaskId,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Rewrites the owner's pending positions following
    /// [`plan_pending_order`](crate::task::domain::plan_pending_order).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::UnknownTaskInOrder`] when any requested
    /// identifier is not one of the owner's tasks; nothing is changed in that
    /// case.
    async fn reorder(&self, owner: &OwnerId, request: &ReorderRequest) -> TaskRepositoryResult<()>;

    /// Moves the head of the owner's pending order to its tail and returns
    /// the resulting order.
    ///
    /// Reading the order and rewriting it happen as one atomic step, so
    /// concurrent rotations for the same owner each take effect. With fewer
    /// than two pending tasks nothing is written.
    async fn rotate_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Moves every completed, unarchived task of the owner into the bin and
    /// returns how many tasks moved.
    async fn archive_completed(
        &self,
        owner: &OwnerId,
        archived_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64>;

    /// Returns an archived task to the tail of the pending order with both
    /// lifecycle timestamps cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the owner has no
    /// archived task with this identifier.
    async fn restore(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Task>;

    /// Permanently removes an archived task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the owner has no
    /// archived task with this identifier.
    async fn permanent_delete(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<()>;

    /// Permanently removes every archived task of the owner and returns how
    /// many were removed.
    async fn empty_bin(&self, owner: &OwnerId) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// No task with this identifier and the required status belongs to the
    /// caller.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A reorder request referenced a task the caller does not own.
    #[error("task {0} in the requested order does not belong to this account")]
    UnknownTaskInOrder(TaskId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
