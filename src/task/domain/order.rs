//! Ordering rules for an owner's pending tasks.
//!
//! The current task is always the head of the pending order. Positions are
//! kept contiguous (`0..N-1`) by every operation that changes the pending
//! set, so the order never depends on sparse or duplicated position values.

use super::{TaskDomainError, TaskId};
use std::collections::HashSet;

/// Requested order of task identifiers for a reorder operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReorderRequest {
    ids: Vec<TaskId>,
}

impl ReorderRequest {
    /// Creates a request from identifiers in the desired order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DuplicateTaskInOrder`] when an identifier
    /// appears more than once.
    pub fn new(ids: impl IntoIterator<Item = TaskId>) -> Result<Self, TaskDomainError> {
        let ids: Vec<TaskId> = ids.into_iter().collect();
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(TaskDomainError::DuplicateTaskInOrder(*duplicate));
        }
        Ok(Self { ids })
    }

    /// Returns the requested identifiers in order.
    #[must_use]
    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    /// Returns `true` when no identifiers were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Computes the pending order produced by applying `request` to `current`.
///
/// Requested identifiers that are currently pending come first, in the
/// requested order. Pending identifiers the request leaves out follow in
/// their existing relative order. Requested identifiers that are not in
/// `current` are ignored here; ownership is checked by the store before
/// planning. The index of each identifier in the result is its new position.
#[must_use]
pub fn plan_pending_order(current: &[TaskId], request: &ReorderRequest) -> Vec<TaskId> {
    let pending: HashSet<TaskId> = current.iter().copied().collect();
    let requested: HashSet<TaskId> = request.ids().iter().copied().collect();

    let mut planned: Vec<TaskId> = request
        .ids()
        .iter()
        .copied()
        .filter(|id| pending.contains(id))
        .collect();
    planned.extend(current.iter().copied().filter(|id| !requested.contains(id)));
    planned
}

/// Moves the head of `order` to its tail.
///
/// Orders with fewer than two entries are returned unchanged.
#[must_use]
pub fn rotate_to_tail(mut order: Vec<TaskId>) -> Vec<TaskId> {
    if order.len() > 1 {
        order.rotate_left(1);
    }
    order
}

/// Converts an index in the pending order into a stored position.
///
/// Saturates at `u32::MAX`; a single owner never holds that many tasks.
#[must_use]
pub fn position_at(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
