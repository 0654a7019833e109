//! When steps for work-item synchronisation BDD scenarios.

use super::world::{REPOSITORY, SyncWorld, run_async};
use canopy::work_item::{
    domain::{IssueNumber, WorkItemId, WorkItemState},
    services::CreateWorkItemRequest,
};
use rstest_bdd_macros::when;

fn item_id(number: u64) -> Result<WorkItemId, eyre::Report> {
    Ok(WorkItemId::Issue(IssueNumber::new(number)?))
}

#[when(r#"leaf #{leaf:u64} is moved to "{state}""#)]
fn leaf_moved(world: &mut SyncWorld, leaf: u64, state: String) -> Result<(), eyre::Report> {
    let target = WorkItemState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid state in scenario: {err}"))?;
    let outcome = run_async(world.service.submit_update(item_id(leaf)?, target));
    world.last_update = Some(outcome);
    Ok(())
}

#[when("item #{item:u64} is deleted")]
fn item_deleted(world: &mut SyncWorld, item: u64) -> Result<(), eyre::Report> {
    let result = world.service.submit_delete(item_id(item)?).into_result();
    let removed = match result {
        Ok(deleted) => {
            let removed = deleted.removed().to_vec();
            if !run_async(deleted.into_background().join()) {
                return Err(eyre::eyre!("background deletion did not complete"));
            }
            Ok(removed)
        }
        Err(err) => Err(err),
    };
    world.last_delete = Some(removed);
    Ok(())
}

#[when(r#"a work item titled "{title}" is created under item #{parent:u64}"#)]
fn item_created(world: &mut SyncWorld, title: String, parent: u64) -> Result<(), eyre::Report> {
    let request = CreateWorkItemRequest::new(REPOSITORY, title).under(item_id(parent)?);
    let outcome = run_async(world.service.submit_create(request));
    world.last_create = Some(outcome);
    Ok(())
}
