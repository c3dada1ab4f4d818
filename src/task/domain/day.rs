//! Calendar-day filtering for the completed view.
//!
//! Day boundaries are UTC. Whether a task counts as completed today is
//! recomputed on every read and never stored.

use super::Task;
use chrono::{DateTime, NaiveDate, Utc};

/// A UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionDay(NaiveDate);

impl CompletionDay {
    /// Returns the UTC day containing `instant`.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    /// Returns `true` when `task` was completed on this day.
    #[must_use]
    pub fn includes(self, task: &Task) -> bool {
        task.completed_at()
            .is_some_and(|completed_at| completed_at.date_naive() == self.0)
    }
}
