//! Structural operations over a work-item forest.
//!
//! Every function here is pure. Edits rebuild each node on the path from a
//! root to the target with fresh child lists and share every other subtree
//! with the input by reference count. A missing target is reported as `None`
//! rather than as an error; the caller decides whether that matters.

use super::{WorkItem, WorkItemId};
use std::sync::Arc;

/// Finds the first item with `id` in depth-first pre-order.
#[must_use]
pub fn find(roots: &[Arc<WorkItem>], id: WorkItemId) -> Option<&Arc<WorkItem>> {
    roots.iter().find_map(|node| {
        if node.id() == id {
            Some(node)
        } else {
            find(node.children(), id)
        }
    })
}

/// Replaces the item with `id`, keeping the target's depth and parent.
///
/// Returns `None` when no item has the identifier.
#[must_use]
pub fn replace(
    roots: &[Arc<WorkItem>],
    id: WorkItemId,
    replacement: WorkItem,
) -> Option<Vec<Arc<WorkItem>>> {
    let path = path_to(roots, id)?;
    Some(rebuild(roots, &path, |target| {
        Some(Arc::new(
            replacement.placed_at(target.depth(), target.parent()),
        ))
    }))
}

/// Appends `child` under `parent`, or as a new root when `parent` is `None`.
///
/// Returns `None` when the named parent does not exist.
#[must_use]
pub fn insert_child(
    roots: &[Arc<WorkItem>],
    parent: Option<WorkItemId>,
    child: WorkItem,
) -> Option<Vec<Arc<WorkItem>>> {
    let Some(parent_id) = parent else {
        let mut rebuilt = roots.to_vec();
        rebuilt.push(Arc::new(child.placed_at(0, None)));
        return Some(rebuilt);
    };

    let path = path_to(roots, parent_id)?;
    Some(rebuild(roots, &path, |target| {
        let mut children = target.children().to_vec();
        children.push(Arc::new(
            child.placed_at(target.depth() + 1, Some(target.id())),
        ));
        Some(Arc::new(target.as_ref().clone().with_children(children)))
    }))
}

/// Removes the item with `id` together with its whole subtree.
///
/// Returns `None` when no item has the identifier.
#[must_use]
pub fn remove(roots: &[Arc<WorkItem>], id: WorkItemId) -> Option<Vec<Arc<WorkItem>>> {
    let path = path_to(roots, id)?;
    Some(rebuild(roots, &path, |_| None))
}

/// Counts every item beneath `item`, excluding the item itself.
#[must_use]
pub fn count_descendants(item: &WorkItem) -> usize {
    item.children()
        .iter()
        .map(|child| 1 + count_descendants(child))
        .sum()
}

/// Lists the identifiers of `item` and its descendants, children before
/// their parent.
#[must_use]
pub fn subtree_ids_post_order(item: &WorkItem) -> Vec<WorkItemId> {
    let mut ids = Vec::with_capacity(count_descendants(item) + 1);
    collect_post_order(item, &mut ids);
    ids
}

fn collect_post_order(item: &WorkItem, ids: &mut Vec<WorkItemId>) {
    for child in item.children() {
        collect_post_order(child, ids);
    }
    ids.push(item.id());
}

/// Child positions leading from the roots to the first match of `id`.
fn path_to(nodes: &[Arc<WorkItem>], id: WorkItemId) -> Option<Vec<usize>> {
    nodes.iter().enumerate().find_map(|(position, node)| {
        if node.id() == id {
            return Some(vec![position]);
        }
        path_to(node.children(), id).map(|mut rest| {
            rest.insert(0, position);
            rest
        })
    })
}

/// Rebuilds the nodes along `path`, applying `edit` to the final node.
///
/// `edit` returning `None` drops the node.
fn rebuild<F>(nodes: &[Arc<WorkItem>], path: &[usize], edit: F) -> Vec<Arc<WorkItem>>
where
    F: FnOnce(&Arc<WorkItem>) -> Option<Arc<WorkItem>>,
{
    let Some((&target, rest)) = path.split_first() else {
        return nodes.to_vec();
    };

    let mut edit = Some(edit);
    let mut rebuilt = Vec::with_capacity(nodes.len());
    for (position, node) in nodes.iter().enumerate() {
        if position != target {
            rebuilt.push(Arc::clone(node));
            continue;
        }
        let Some(apply) = edit.take() else {
            continue;
        };
        if rest.is_empty() {
            rebuilt.extend(apply(node));
        } else {
            let children = rebuild(node.children(), rest, apply);
            rebuilt.push(Arc::new(node.as_ref().clone().with_children(children)));
        }
    }
    rebuilt
}
