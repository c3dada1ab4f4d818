//! Domain model for the one-task-at-a-time list.
//!
//! A task moves from pending to completed, from completed into the bin, and
//! from the bin either back to pending or out of existence. Status is derived
//! only from the completion and archive timestamps; infrastructure concerns
//! stay outside this module.

mod day;
mod error;
mod ids;
mod order;
mod task;
mod text;

pub use day::CompletionDay;
pub use error::{TaskAction, TaskDomainError};
pub use ids::{OwnerId, TaskId};
pub use order::{ReorderRequest, plan_pending_order, position_at, rotate_to_tail};
pub use task::{PersistedTaskData, Task, TaskStatus};
pub use text::TaskText;
