//! In-memory integration tests for end-to-end work-item flows.

use super::helpers::{REPOSITORY, SyncHarness, item_id};
use canopy::work_item::{
    adapters::memory::ExternalCall,
    domain::{IssueNumber, IssueStatus, NotificationLevel, WorkItemState},
    services::CreateWorkItemRequest,
};
use eyre::ensure;

#[tokio::test(flavor = "multi_thread")]
async fn child_item_runs_from_creation_to_merge() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["epic"], None)?;
    harness.load().await?;
    let mut receiver = harness.service.subscribe();

    let created = harness
        .service
        .submit_create(CreateWorkItemRequest::new(REPOSITORY, "Add parser").under(item_id(1)?))
        .await
        .into_result()?;
    ensure!(created.id() == item_id(2)?, "unexpected id {}", created.id());
    ensure!(receiver.has_changed()?, "creation should publish a snapshot");
    receiver.mark_unchanged();

    let started = harness
        .service
        .submit_update(created.id(), WorkItemState::InProgress)
        .await;
    ensure!(started.is_success(), "{:?}", started.result().err());
    ensure!(harness.host.has_branch("item-2"));
    let snapshot = receiver.borrow_and_update().clone();
    let epic = snapshot
        .find(item_id(1)?)
        .ok_or_else(|| eyre::eyre!("epic missing"))?;
    ensure!(epic.state() == WorkItemState::InProgress);

    harness.host.push_commits("item-2", 3)?;
    let finished = harness
        .service
        .submit_update(created.id(), WorkItemState::Done)
        .await;
    ensure!(finished.is_success(), "{:?}", finished.result().err());
    ensure!(finished.has_notification(NotificationLevel::Success));
    ensure!(harness.host.merged_heads() == vec![String::from("item-2")]);
    ensure!(!harness.host.has_branch("item-2"));

    let reloaded = harness.load().await?;
    let epic = reloaded
        .find(item_id(1)?)
        .ok_or_else(|| eyre::eyre!("epic missing after reload"))?;
    ensure!(epic.state() == WorkItemState::Done);
    let child = reloaded
        .find(item_id(2)?)
        .ok_or_else(|| eyre::eyre!("child missing after reload"))?;
    ensure!(child.parent() == Some(item_id(1)?));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_root_removes_its_whole_subtree() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["epic"], None)?;
    harness.seed(2, IssueStatus::Open, &["task"], Some(1))?;
    harness.seed(3, IssueStatus::Closed, &["task"], Some(2))?;
    harness.seed(4, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;

    let deleted = harness.service.submit_delete(item_id(1)?).into_result()?;
    ensure!(deleted.removed() == [item_id(3)?, item_id(2)?, item_id(1)?]);
    ensure!(harness.service.snapshot().len() == 1);
    ensure!(deleted.into_background().join().await);

    let deletes: Vec<IssueNumber> = harness
        .journal
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ExternalCall::DeleteIssue { number } => Some(number),
            _ => None,
        })
        .collect();
    ensure!(deletes == vec![IssueNumber::new(3)?, IssueNumber::new(2)?, IssueNumber::new(1)?]);

    let reloaded = harness.load().await?;
    ensure!(reloaded.len() == 1);
    ensure!(reloaded.find(item_id(4)?).is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_start_leaves_tracker_and_tree_unchanged() -> Result<(), eyre::Report> {
    let harness = SyncHarness::new()?;
    harness.seed(1, IssueStatus::Open, &["task"], None)?;
    harness.load().await?;
    harness.host.remove_branch("main")?;

    let outcome = harness
        .service
        .submit_update(item_id(1)?, WorkItemState::InProgress)
        .await;

    ensure!(!outcome.is_success());
    ensure!(outcome.has_notification(NotificationLevel::Error));
    let record = harness
        .tracker
        .issue(IssueNumber::new(1)?)
        .ok_or_else(|| eyre::eyre!("issue #1 missing"))?;
    ensure!(record.labels == vec![String::from("task")]);
    let reloaded = harness.load().await?;
    let item = reloaded
        .find(item_id(1)?)
        .ok_or_else(|| eyre::eyre!("item #1 missing"))?;
    ensure!(item.state() == WorkItemState::Todo);
    Ok(())
}
