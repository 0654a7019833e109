//! Then steps for work-item synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use canopy::work_item::{
    adapters::memory::ExternalCall,
    domain::{IssueNumber, IssueStatus, WorkItemId, WorkItemState},
    services::SyncError,
};
use rstest_bdd_macros::then;

#[then("the update succeeds")]
fn update_succeeds(world: &SyncWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_update
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update outcome"))?;
    if let Err(err) = outcome.result() {
        return Err(eyre::eyre!("expected update to succeed, got {err}"));
    }
    Ok(())
}

#[then("the update fails with a not found error")]
fn update_fails_not_found(world: &SyncWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_update
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update outcome"))?;
    if !matches!(outcome.result(), Err(SyncError::NotFound(_))) {
        return Err(eyre::eyre!(
            "expected NotFound error, got {:?}",
            outcome.result()
        ));
    }
    Ok(())
}

#[then(r#"item #{item:u64} has state "{state}""#)]
fn item_has_state(world: &SyncWorld, item: u64, state: String) -> Result<(), eyre::Report> {
    let expected = WorkItemState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let snapshot = world.service.snapshot();
    let found = snapshot
        .find(WorkItemId::Issue(IssueNumber::new(item)?))
        .ok_or_else(|| eyre::eyre!("item #{item} missing from snapshot"))?;
    if found.state() != expected {
        return Err(eyre::eyre!(
            "expected state {}, found {}",
            expected.as_str(),
            found.state().as_str()
        ));
    }
    Ok(())
}

#[then(r#"branch "{name}" exists"#)]
fn branch_exists(world: &SyncWorld, name: String) -> Result<(), eyre::Report> {
    eyre::ensure!(world.host.has_branch(&name), "branch {name} is missing");
    Ok(())
}

#[then(r#"branch "{name}" has been merged"#)]
fn branch_merged(world: &SyncWorld, name: String) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.host.merged_heads().contains(&name),
        "branch {name} was not merged"
    );
    Ok(())
}

#[then(r#"branch "{name}" no longer exists"#)]
fn branch_gone(world: &SyncWorld, name: String) -> Result<(), eyre::Report> {
    eyre::ensure!(!world.host.has_branch(&name), "branch {name} still exists");
    Ok(())
}

#[then("issue #{issue:u64} is open without the in-progress label")]
fn issue_restored(world: &SyncWorld, issue: u64) -> Result<(), eyre::Report> {
    let record = world
        .tracker
        .issue(IssueNumber::new(issue)?)
        .ok_or_else(|| eyre::eyre!("issue #{issue} missing from tracker"))?;
    eyre::ensure!(record.status == IssueStatus::Open, "issue #{issue} is closed");
    eyre::ensure!(
        !record.has_label("in-progress"),
        "issue #{issue} kept the in-progress label"
    );
    Ok(())
}

#[then("the deletion succeeds locally")]
fn deletion_succeeds(world: &SyncWorld) -> Result<(), eyre::Report> {
    match world.last_delete.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected deletion to succeed, got {err}")),
        None => Err(eyre::eyre!("missing delete result")),
    }
}

#[then(r#"the tracker received deletes for issues "{numbers}""#)]
fn tracker_received_deletes(world: &SyncWorld, numbers: String) -> Result<(), eyre::Report> {
    let expected = numbers
        .split(',')
        .map(|raw| raw.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()?;
    let observed: Vec<u64> = world
        .journal
        .calls()
        .iter()
        .filter_map(|call| match call {
            ExternalCall::DeleteIssue { number } => Some(number.value()),
            _ => None,
        })
        .collect();
    eyre::ensure!(
        observed == expected,
        "expected deletes {expected:?}, observed {observed:?}"
    );
    Ok(())
}

#[then("refreshing the project shows {count:usize} items")]
fn refresh_shows(world: &SyncWorld, count: usize) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.service.refresh()).into_result()?;
    eyre::ensure!(
        snapshot.len() == count,
        "expected {count} items, found {}",
        snapshot.len()
    );
    Ok(())
}

#[then("the creation succeeds with issue #{issue:u64}")]
fn creation_succeeds(world: &SyncWorld, issue: u64) -> Result<(), eyre::Report> {
    let outcome = world
        .last_create
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create outcome"))?;
    let created = outcome
        .result()
        .map_err(|err| eyre::eyre!("expected creation to succeed, got {err}"))?;
    eyre::ensure!(
        created.id() == WorkItemId::Issue(IssueNumber::new(issue)?),
        "created item is {}",
        created.id()
    );
    Ok(())
}

#[then("issue #{child:u64} is linked under issue #{parent:u64}")]
fn issue_linked(world: &SyncWorld, child: u64, parent: u64) -> Result<(), eyre::Report> {
    let record = world
        .tracker
        .issue(IssueNumber::new(child)?)
        .ok_or_else(|| eyre::eyre!("issue #{child} missing from tracker"))?;
    eyre::ensure!(
        record.parent == Some(IssueNumber::new(parent)?),
        "issue #{child} has parent {:?}",
        record.parent
    );
    Ok(())
}
