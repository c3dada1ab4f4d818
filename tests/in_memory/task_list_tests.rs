//! End-to-end lifecycle scenarios for the task list service.

use super::helpers::{TestService, create_all, ensure_contiguous, owner, service, texts};
use onetask::task::{domain::TaskStatus, services::TaskListError};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_skip_complete_archive_restore_walkthrough(
    service: TestService,
) -> Result<(), eyre::Report> {
    let u = owner("U");

    let created = create_all(&service, &u, &["A", "B", "C"]).await?;
    let pending = service.list_pending(&u).await?;
    eyre::ensure!(texts(&pending) == ["A", "B", "C"]);
    ensure_contiguous(&pending)?;

    let skipped = service.skip(&u).await?;
    eyre::ensure!(texts(&skipped) == ["B", "C", "A"]);
    ensure_contiguous(&skipped)?;

    let b = created
        .get(1)
        .ok_or_else(|| eyre::eyre!("task B missing"))?
        .id();
    service.complete(&u, b).await?;
    eyre::ensure!(texts(&service.list_pending(&u).await?) == ["C", "A"]);
    eyre::ensure!(texts(&service.list_completed(&u).await?) == ["B"]);

    eyre::ensure!(service.archive_completed(&u).await? == 1);
    eyre::ensure!(service.list_completed(&u).await?.is_empty());
    eyre::ensure!(texts(&service.list_archived(&u).await?) == ["B"]);

    let restored = service.restore(&u, b).await?;
    eyre::ensure!(restored.status() == TaskStatus::Pending);
    eyre::ensure!(restored.completed_at().is_none() && restored.archived_at().is_none());
    let pending_after = service.list_pending(&u).await?;
    eyre::ensure!(texts(&pending_after) == ["C", "A", "B"]);
    ensure_contiguous(&pending_after)?;

    let a = created
        .first()
        .ok_or_else(|| eyre::eyre!("task A missing"))?
        .id();
    let delete_pending = service.permanent_delete(&u, a).await;
    eyre::ensure!(matches!(delete_pending, Err(TaskListError::NotFound(id)) if id == a));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restore_requires_archived_task(service: TestService) -> Result<(), eyre::Report> {
    let u = owner("U");
    let created = create_all(&service, &u, &["A"]).await?;
    let a = created
        .first()
        .ok_or_else(|| eyre::eyre!("task A missing"))?
        .id();

    let from_pending = service.restore(&u, a).await;
    service.complete(&u, a).await?;
    let from_completed = service.restore(&u, a).await;

    eyre::ensure!(matches!(from_pending, Err(TaskListError::NotFound(_))));
    eyre::ensure!(matches!(from_completed, Err(TaskListError::NotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_tasks_always_carry_completion(service: TestService) -> Result<(), eyre::Report> {
    let u = owner("U");
    let created = create_all(&service, &u, &["A", "B", "C", "D"]).await?;
    for task in created.iter().step_by(2) {
        service.complete(&u, task.id()).await?;
    }
    service.archive_completed(&u).await?;

    let bin = service.list_archived(&u).await?;
    eyre::ensure!(bin.len() == 2);
    eyre::ensure!(bin.iter().all(|task| task.completed_at().is_some()));
    eyre::ensure!(texts(&service.list_pending(&u).await?) == ["B", "D"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_reorder_keeps_positions_unique(service: TestService) -> Result<(), eyre::Report> {
    let u = owner("U");
    let created = create_all(&service, &u, &["A", "B", "C", "D"]).await?;
    let d = created
        .get(3)
        .ok_or_else(|| eyre::eyre!("task D missing"))?
        .id();

    service.reorder(&u, vec![d]).await?;

    let pending = service.list_pending(&u).await?;
    eyre::ensure!(texts(&pending) == ["D", "A", "B", "C"]);
    ensure_contiguous(&pending)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_bin_is_idempotent(service: TestService) -> Result<(), eyre::Report> {
    let u = owner("U");
    let created = create_all(&service, &u, &["A"]).await?;
    let a = created
        .first()
        .ok_or_else(|| eyre::eyre!("task A missing"))?
        .id();
    service.complete(&u, a).await?;
    service.archive_completed(&u).await?;

    eyre::ensure!(service.empty_bin(&u).await? == 1);
    eyre::ensure!(service.empty_bin(&u).await? == 0);
    eyre::ensure!(service.list_archived(&u).await?.is_empty());
    Ok(())
}
