use chrono::{DateTime, Utc};
use log::debug;

use crate::model::node::Node;
use crate::ops::locate::{find_node_mut, find_path, siblings_at_mut};

// Every mutator here is best-effort: an unknown id leaves the forest untouched
// and the call reports `false` (or `None`). Callers are UI event handlers that
// can race with the node they refer to being removed.

/// Where a new task goes relative to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    Before,
    #[default]
    After,
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Create a task with trimmed `text`.
///
/// With no `relative_to`, the task is prepended to the root level. Otherwise
/// it becomes a sibling of `relative_to`, before or after it. Returns the new
/// id, or `None` if `relative_to` does not exist.
pub fn insert_task(
    forest: &mut Vec<Node>,
    text: &str,
    relative_to: Option<&str>,
    position: InsertPosition,
) -> Option<String> {
    let node = Node::new(text.trim());
    let id = node.id.clone();
    insert_node(forest, node, relative_to, position).then_some(id)
}

fn insert_node(
    forest: &mut Vec<Node>,
    node: Node,
    relative_to: Option<&str>,
    position: InsertPosition,
) -> bool {
    let Some(relative_id) = relative_to else {
        forest.insert(0, node);
        return true;
    };
    let Some(path) = find_path(forest, relative_id) else {
        noop("insert", relative_id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };
    let Some(siblings) = siblings_at_mut(forest, parent_path) else {
        return false;
    };
    let at = match position {
        InsertPosition::Before => index,
        InsertPosition::After => index + 1,
    };
    siblings.insert(at, node);
    true
}

/// Remove a task, promoting its children into the vacated slot in order.
pub fn delete_task(forest: &mut Vec<Node>, id: &str) -> bool {
    let Some(path) = find_path(forest, id) else {
        noop("delete", id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };
    let Some(siblings) = siblings_at_mut(forest, parent_path) else {
        return false;
    };
    let removed = siblings.remove(index);
    siblings.splice(index..index, removed.children);
    true
}

/// Replace the whole forest with a single empty task. Returns its id.
pub fn clear_all(forest: &mut Vec<Node>) -> String {
    forest.clear();
    let node = Node::new("");
    let id = node.id.clone();
    forest.push(node);
    id
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

pub fn toggle_completion(forest: &mut [Node], id: &str, now: DateTime<Utc>) -> bool {
    match find_node_mut(forest, id) {
        Some(node) => {
            node.toggle_completed(now);
            true
        }
        None => {
            noop("toggle_completion", id, "not_found");
            false
        }
    }
}

/// Overwrite text verbatim (trimming only happens at creation).
pub fn rename_task(forest: &mut [Node], id: &str, new_text: &str) -> bool {
    match find_node_mut(forest, id) {
        Some(node) => {
            node.text = new_text.to_string();
            true
        }
        None => {
            noop("rename", id, "not_found");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Structural moves
// ---------------------------------------------------------------------------

/// Move a task one step up in visual order.
///
/// Swaps with the previous sibling when there is one. A first child instead
/// leaves its parent: it becomes the last child of the parent's previous
/// sibling, or, if the parent is itself first, a sibling placed just before
/// the parent.
pub fn move_up(forest: &mut Vec<Node>, id: &str) -> bool {
    let Some(path) = find_path(forest, id) else {
        noop("move_up", id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };

    if index > 0 {
        let Some(siblings) = siblings_at_mut(forest, parent_path) else {
            return false;
        };
        siblings.swap(index - 1, index);
        return true;
    }

    let Some((&parent_index, grand_path)) = parent_path.split_last() else {
        noop("move_up", id, "first_at_root");
        return false;
    };
    let Some(grand_siblings) = siblings_at_mut(forest, grand_path) else {
        return false;
    };
    let Some(node) = take_child(grand_siblings, parent_index, index) else {
        return false;
    };
    if parent_index > 0 {
        grand_siblings[parent_index - 1].children.push(node);
    } else {
        grand_siblings.insert(parent_index, node);
    }
    true
}

/// Mirror of [`move_up`]: swap with the next sibling, else become the first
/// child of the parent's next sibling, else a sibling just after the parent.
pub fn move_down(forest: &mut Vec<Node>, id: &str) -> bool {
    let Some(path) = find_path(forest, id) else {
        noop("move_down", id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };

    let Some(siblings) = siblings_at_mut(forest, parent_path) else {
        return false;
    };
    if index + 1 < siblings.len() {
        siblings.swap(index, index + 1);
        return true;
    }

    let Some((&parent_index, grand_path)) = parent_path.split_last() else {
        noop("move_down", id, "last_at_root");
        return false;
    };
    let Some(grand_siblings) = siblings_at_mut(forest, grand_path) else {
        return false;
    };
    let Some(node) = take_child(grand_siblings, parent_index, index) else {
        return false;
    };
    if parent_index + 1 < grand_siblings.len() {
        grand_siblings[parent_index + 1].children.insert(0, node);
    } else {
        grand_siblings.insert(parent_index + 1, node);
    }
    true
}

/// Make a task the last child of its immediately preceding sibling.
pub fn nest(forest: &mut Vec<Node>, id: &str) -> bool {
    let Some(path) = find_path(forest, id) else {
        noop("nest", id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };
    if index == 0 {
        noop("nest", id, "no_previous_sibling");
        return false;
    }
    let Some(siblings) = siblings_at_mut(forest, parent_path) else {
        return false;
    };
    let node = siblings.remove(index);
    siblings[index - 1].children.push(node);
    true
}

/// Move a task out of its parent, placing it right after the parent.
pub fn unnest(forest: &mut Vec<Node>, id: &str) -> bool {
    let Some(path) = find_path(forest, id) else {
        noop("unnest", id, "not_found");
        return false;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };
    let Some((&parent_index, grand_path)) = parent_path.split_last() else {
        noop("unnest", id, "already_root");
        return false;
    };
    let Some(grand_siblings) = siblings_at_mut(forest, grand_path) else {
        return false;
    };
    let Some(node) = take_child(grand_siblings, parent_index, index) else {
        return false;
    };
    grand_siblings.insert(parent_index + 1, node);
    true
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Detach child `index` of `siblings[parent_index]`.
fn take_child(siblings: &mut [Node], parent_index: usize, index: usize) -> Option<Node> {
    let children = &mut siblings.get_mut(parent_index)?.children;
    (index < children.len()).then(|| children.remove(index))
}

fn noop(op: &str, id: &str, reason: &str) {
    debug!("event={op} module=tree_ops status=noop reason={reason} id={id}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
