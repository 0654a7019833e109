//! Given steps for work-item synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use canopy::work_item::domain::{IssueNumber, IssueRecord, IssueStatus, WorkItemId, WorkItemState};
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn open_record(
    number: u64,
    label: &str,
    parent: Option<u64>,
) -> Result<IssueRecord, eyre::Report> {
    Ok(IssueRecord {
        number: IssueNumber::new(number)?,
        title: format!("Issue {number}"),
        body: String::new(),
        status: IssueStatus::Open,
        labels: vec![label.to_owned()],
        parent: parent.map(IssueNumber::new).transpose()?,
    })
}

#[given("a tracker with epic #{epic:u64} containing leaves #{first:u64} and #{second:u64}")]
fn tracker_with_epic(
    world: &mut SyncWorld,
    epic: u64,
    first: u64,
    second: u64,
) -> Result<(), eyre::Report> {
    world.tracker.seed(open_record(epic, "epic", None)?)?;
    for leaf in [first, second] {
        world.tracker.seed(open_record(leaf, "task", Some(epic))?)?;
    }
    Ok(())
}

#[given("the project has been loaded from the tracker")]
fn project_loaded(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    run_async(world.service.refresh())
        .into_result()
        .wrap_err("load project snapshot from tracker")?;
    Ok(())
}

#[given("the integration branch is missing")]
fn integration_branch_missing(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    world.host.remove_branch("main")?;
    Ok(())
}

#[given("the tracker listing lags behind writes")]
fn tracker_listing_lags(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    world.tracker.freeze_listing()?;
    Ok(())
}

#[given("leaf #{leaf:u64} is in progress with {commits:u32} commits on its branch")]
fn leaf_in_progress_with_commits(
    world: &mut SyncWorld,
    leaf: u64,
    commits: u32,
) -> Result<(), eyre::Report> {
    let id = WorkItemId::Issue(IssueNumber::new(leaf)?);
    run_async(world.service.submit_update(id, WorkItemState::InProgress))
        .into_result()
        .wrap_err("start leaf in scenario setup")?;
    world.host.push_commits(&format!("item-{leaf}"), commits)?;
    Ok(())
}
