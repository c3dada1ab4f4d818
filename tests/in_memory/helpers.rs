//! Shared helpers for in-memory task list integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use onetask::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OwnerId, Task},
    services::TaskListService,
};
use rstest::fixture;

/// Service type used by the in-memory suites.
pub type TestService = TaskListService<InMemoryTaskRepository, DefaultClock>;

/// Provides a service over a fresh in-memory repository.
#[fixture]
pub fn service() -> TestService {
    TaskListService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Builds a validated owner identifier.
///
/// # Panics
///
/// Panics if `name` is not a valid owner identifier.
pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).expect("valid owner")
}

/// Creates one task per entry of `items`, in order.
///
/// # Errors
///
/// Returns an error if any creation fails.
pub async fn create_all(
    service: &TestService,
    owner: &OwnerId,
    items: &[&str],
) -> Result<Vec<Task>, eyre::Report> {
    let mut created = Vec::with_capacity(items.len());
    for item in items {
        created.push(service.create(owner, item).await?);
    }
    Ok(created)
}

/// Returns the text of each task.
pub fn texts(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| task.text().as_str().to_owned())
        .collect()
}

/// Checks that positions run `0..N-1` in list order.
///
/// # Errors
///
/// Returns an error naming the first out-of-place position.
pub fn ensure_contiguous(tasks: &[Task]) -> Result<(), eyre::Report> {
    for (index, task) in tasks.iter().enumerate() {
        let expected = u32::try_from(index)?;
        eyre::ensure!(
            task.position() == expected,
            "task {} at index {index} has position {}",
            task.id(),
            task.position()
        );
    }
    Ok(())
}
