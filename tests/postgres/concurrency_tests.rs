//! `PostgreSQL` tests for per-owner serialization of concurrent mutations.

use super::helpers::{context, create_all, positions, test_runtime, texts};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn postgres_concurrent_skips_each_rotate_the_order(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "concurrent_skips")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        create_all(service, u, &["A", "B", "C", "D", "E"]).await?;

        let (first, second) = tokio::join!(service.skip(u), service.skip(u));
        first?;
        second?;

        let pending = service.list_pending(u).await?;
        eyre::ensure!(
            texts(&pending) == ["C", "D", "E", "A", "B"],
            "got {:?}",
            texts(&pending)
        );
        eyre::ensure!(positions(&pending) == [0, 1, 2, 3, 4]);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn postgres_concurrent_creates_and_completions_keep_positions_contiguous(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let ctx = context(shared_test_cluster, "concurrent_mixed")?;
    let (service, u) = (&ctx.service, &ctx.owner);
    test_runtime()?.block_on(async {
        let created = create_all(service, u, &["A", "B", "C", "D"]).await?;
        let (a, c) = match created.as_slice() {
            [a, _, c, _] => (a.id(), c.id()),
            _ => eyre::bail!("expected four tasks"),
        };

        let (done_a, done_c, new_e, new_f, skipped) = tokio::join!(
            service.complete(u, a),
            service.complete(u, c),
            service.create(u, "E"),
            service.create(u, "F"),
            service.skip(u),
        );
        done_a?;
        done_c?;
        new_e?;
        new_f?;
        skipped?;

        let pending = service.list_pending(u).await?;
        eyre::ensure!(pending.len() == 4);
        eyre::ensure!(positions(&pending) == [0, 1, 2, 3]);
        Ok::<(), eyre::Report>(())
    })
}
