//! Application services for the task list.

mod task_list;

pub use task_list::{TaskListError, TaskListOverview, TaskListResult, TaskListService};
