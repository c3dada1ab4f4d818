//! Validated task text.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-authored task text, trimmed and non-empty.
///
/// Text is immutable once a task exists; there is no edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskText(String);

impl TaskText {
    /// Default character limit applied by [`TaskText::new`].
    pub const MAX_CHARS: usize = 500;

    /// Creates task text using the default [`Self::MAX_CHARS`] limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskText`] when the value is blank or
    /// [`TaskDomainError::TaskTextTooLong`] when it exceeds the limit.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        Self::with_limit(value, Self::MAX_CHARS)
    }

    /// Creates task text with a caller-supplied character limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskText`] when the value is blank or
    /// [`TaskDomainError::TaskTextTooLong`] when it exceeds `limit`.
    pub fn with_limit(value: impl AsRef<str>, limit: usize) -> Result<Self, TaskDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskText);
        }

        let length = trimmed.chars().count();
        if length > limit {
            return Err(TaskDomainError::TaskTextTooLong { length, limit });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskText {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskText> for String {
    fn from(value: TaskText) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
