//! `PostgreSQL` integration tests for the task list lifecycle.

use super::helpers::{context, create_all, owner, positions, test_runtime, texts};
use onetask::task::{
    domain::{TaskId, TaskStatus},
    services::TaskListError,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn postgres_skip_complete_and_restore(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "skip_complete")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        let created = create_all(service, u, &["A", "B", "C"]).await?;
        eyre::ensure!(positions(&created) == [0, 1, 2]);

        let skipped = service.skip(u).await?;
        eyre::ensure!(texts(&skipped) == ["B", "C", "A"]);
        eyre::ensure!(positions(&skipped) == [0, 1, 2]);

        let b = created
            .get(1)
            .ok_or_else(|| eyre::eyre!("task B missing"))?
            .id();
        service.complete(u, b).await?;
        let pending = service.list_pending(u).await?;
        eyre::ensure!(texts(&pending) == ["C", "A"]);
        eyre::ensure!(positions(&pending) == [0, 1]);
        eyre::ensure!(texts(&service.list_completed(u).await?) == ["B"]);

        eyre::ensure!(service.archive_completed(u).await? == 1);
        eyre::ensure!(service.archive_completed(u).await? == 0);
        let restored = service.restore(u, b).await?;
        eyre::ensure!(restored.status() == TaskStatus::Pending);
        eyre::ensure!(restored.completed_at().is_none() && restored.archived_at().is_none());
        let after = service.list_pending(u).await?;
        eyre::ensure!(texts(&after) == ["C", "A", "B"]);
        eyre::ensure!(positions(&after) == [0, 1, 2]);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn postgres_bin_operations_only_touch_archived_tasks(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "bin_ops")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        let created = create_all(service, u, &["A", "B"]).await?;
        let a = created
            .first()
            .ok_or_else(|| eyre::eyre!("task A missing"))?
            .id();

        let early_delete = service.permanent_delete(u, a).await;
        eyre::ensure!(matches!(early_delete, Err(TaskListError::NotFound(_))));

        service.complete(u, a).await?;
        service.archive_completed(u).await?;
        service.permanent_delete(u, a).await?;
        eyre::ensure!(service.list_archived(u).await?.is_empty());
        eyre::ensure!(service.empty_bin(u).await? == 0);
        eyre::ensure!(texts(&service.list_pending(u).await?) == ["B"]);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn postgres_reorder_with_unknown_identifier_rolls_back(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "reorder_rollback")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        let created = create_all(service, u, &["A", "B", "C"]).await?;
        let mut ids: Vec<_> = created.iter().rev().map(|task| task.id()).collect();
        ids.push(TaskId::new());

        let result = service.reorder(u, ids).await;
        eyre::ensure!(matches!(result, Err(TaskListError::Validation(_))));
        let pending = service.list_pending(u).await?;
        eyre::ensure!(texts(&pending) == ["A", "B", "C"]);
        eyre::ensure!(positions(&pending) == [0, 1, 2]);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn postgres_partial_reorder_keeps_positions_contiguous(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "partial_reorder")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        let created = create_all(service, u, &["A", "B", "C", "D"]).await?;
        let d = created
            .get(3)
            .ok_or_else(|| eyre::eyre!("task D missing"))?
            .id();

        service.reorder(u, vec![d]).await?;
        let pending = service.list_pending(u).await?;
        eyre::ensure!(texts(&pending) == ["D", "A", "B", "C"]);
        eyre::ensure!(positions(&pending) == [0, 1, 2, 3]);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn postgres_foreign_identifiers_are_not_found(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "isolation")?;
    let (service, alice) = (&ctx.service, &ctx.owner);
    let bob = owner("bob");
    test_runtime()?.block_on(async {
        let created = create_all(service, alice, &["A1"]).await?;
        let a1 = created
            .first()
            .ok_or_else(|| eyre::eyre!("task A1 missing"))?
            .id();

        let complete = service.complete(&bob, a1).await;
        eyre::ensure!(matches!(complete, Err(TaskListError::NotFound(id)) if id == a1));
        eyre::ensure!(service.list_pending(&bob).await?.is_empty());

        service.complete(alice, a1).await?;
        service.archive_completed(alice).await?;
        eyre::ensure!(service.empty_bin(&bob).await? == 0);
        let restore = service.restore(&bob, a1).await;
        eyre::ensure!(matches!(restore, Err(TaskListError::NotFound(_))));
        eyre::ensure!(texts(&service.list_archived(alice).await?) == ["A1"]);
        Ok::<(), eyre::Report>(())
    })
}
