//! In-memory integration tests for tombstone filtering and reconciliation.

use super::helpers::{SyncHarness, item_id};
use canopy::work_item::{
    adapters::memory::IssueOperation,
    domain::{IssueNumber, IssueStatus, NotificationLevel, RepositoryFullName},
    ports::TrackerError,
};
use eyre::ensure;

#[tokio::test(flavor = "multi_thread")]
async fn failed_background_delete_keeps_issue_hidden() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.seed(2, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;
    harness.tracker.fail_next(
        IssueOperation::Delete,
        TrackerError::Transient(String::from("gateway timeout")),
    )?;

    let deleted = harness.service.submit_delete(item_id(2)?).into_result()?;
    ensure!(deleted.into_background().join().await);

    let record = harness
        .tracker
        .issue(IssueNumber::new(2)?)
        .ok_or_else(|| eyre::eyre!("issue #2 missing"))?;
    ensure!(record.status == IssueStatus::Open, "delete should have failed");
    let reloaded = harness.load().await?;
    ensure!(reloaded.find(item_id(2)?).is_none());
    ensure!(reloaded.len() == 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reconcile_adopts_issues_deleted_elsewhere() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.seed(2, IssueStatus::Closed, &["task", "deleted"], None)?;

    let first = harness.service.reconcile().await;
    let report = first.result().map_err(Clone::clone)?;
    ensure!(report.added == vec![IssueNumber::new(2)?]);
    ensure!(report.dropped.is_empty());
    ensure!(first.has_notification(NotificationLevel::Info));

    let second = harness.service.reconcile().await.into_result()?;
    ensure!(second.is_noop(), "second pass should change nothing");

    let repository = RepositoryFullName::new(super::helpers::REPOSITORY)?;
    ensure!(
        harness
            .service
            .tombstones()
            .is_marked(&repository, IssueNumber::new(2)?)
    );
    let reloaded = harness.load().await?;
    ensure!(reloaded.len() == 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn completed_delete_is_confirmed_by_reconciliation() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;

    let deleted = harness.service.submit_delete(item_id(1)?).into_result()?;
    ensure!(deleted.into_background().join().await);

    let repository = RepositoryFullName::new(super::helpers::REPOSITORY)?;
    ensure!(
        harness
            .service
            .tombstones()
            .is_marked(&repository, IssueNumber::new(1)?),
        "labelled issue should keep its marker"
    );
    let report = harness.service.reconcile().await.into_result()?;
    ensure!(report.is_noop());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_issue_stays_hidden_while_listing_lags() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.seed(2, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;
    harness.tracker.freeze_listing()?;

    let deleted = harness.service.submit_delete(item_id(2)?).into_result()?;
    ensure!(deleted.into_background().join().await);

    let refreshed = harness.service.refresh().await.into_result()?;
    ensure!(refreshed.find(item_id(2)?).is_none(), "#2 reappeared");
    ensure!(refreshed.len() == 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reconcile_while_listing_lags_keeps_pending_marker() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.seed(2, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;
    harness.tracker.freeze_listing()?;
    let deleted = harness.service.submit_delete(item_id(2)?).into_result()?;
    ensure!(deleted.into_background().join().await);

    let report = harness.service.reconcile().await.into_result()?;

    ensure!(report.pending == vec![IssueNumber::new(2)?]);
    ensure!(report.dropped.is_empty());
    let repository = RepositoryFullName::new(super::helpers::REPOSITORY)?;
    ensure!(
        harness
            .service
            .tombstones()
            .is_marked(&repository, IssueNumber::new(2)?)
    );
    let reloaded = harness.load().await?;
    ensure!(reloaded.find(item_id(2)?).is_none());
    Ok(())
}
