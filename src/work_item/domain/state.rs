//! Bottom-up derivation of work-item states.
//!
//! Leaves keep whatever state was last set on them. An internal item is
//! `InProgress` if any child is `InProgress`, `Done` if every child is
//! `Done`, and `Todo` otherwise. One `Done` child next to one `Todo` child
//! therefore yields `Todo`.

use super::{WorkItem, WorkItemState};
use std::sync::Arc;

/// Derives the state of an internal item from its children's states.
///
/// Returns `None` for an empty child list; leaves keep their own state.
#[must_use]
pub fn derive_state<I>(child_states: I) -> Option<WorkItemState>
where
    I: IntoIterator<Item = WorkItemState>,
{
    let mut seen_any = false;
    let mut all_done = true;
    for state in child_states {
        seen_any = true;
        match state {
            WorkItemState::InProgress => return Some(WorkItemState::InProgress),
            WorkItemState::Todo => all_done = false,
            WorkItemState::Done => {}
        }
    }

    if !seen_any {
        return None;
    }
    Some(if all_done {
        WorkItemState::Done
    } else {
        WorkItemState::Todo
    })
}

/// Recomputes every item's state in post-order, producing a fresh forest.
///
/// Subtrees whose derived states already match are shared with the input.
#[must_use]
pub fn recompute(roots: &[Arc<WorkItem>]) -> Vec<Arc<WorkItem>> {
    roots.iter().map(recompute_node).collect()
}

fn recompute_node(node: &Arc<WorkItem>) -> Arc<WorkItem> {
    if node.is_leaf() {
        return Arc::clone(node);
    }

    let children: Vec<Arc<WorkItem>> = node.children().iter().map(recompute_node).collect();
    let derived = derive_state(children.iter().map(|child| child.state()));
    let children_shared = children
        .iter()
        .zip(node.children())
        .all(|(recomputed, original)| Arc::ptr_eq(recomputed, original));
    if children_shared && derived.is_none_or(|state| state == node.state()) {
        return Arc::clone(node);
    }

    let rebuilt = node.as_ref().clone().with_children(children);
    Arc::new(match derived {
        Some(state) => rebuilt.with_derived_state(state),
        None => rebuilt,
    })
}
