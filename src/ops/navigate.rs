use crate::model::node::Node;
use crate::ops::flatten::flat_ids;

/// Id following `active` in visual order, wrapping to the top.
///
/// A missing or stale `active` behaves like "before the first row", so the
/// first task is selected. Returns `None` only for an empty forest.
pub fn next_id(forest: &[Node], active: Option<&str>) -> Option<String> {
    step(forest, active, Direction::Forward)
}

/// Id preceding `active` in visual order, wrapping to the bottom. A missing or
/// stale `active` selects the last task.
pub fn previous_id(forest: &[Node], active: Option<&str>) -> Option<String> {
    step(forest, active, Direction::Backward)
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn step(forest: &[Node], active: Option<&str>, direction: Direction) -> Option<String> {
    let ids = flat_ids(forest);
    let n = ids.len();
    if n == 0 {
        return None;
    }
    let current = active.and_then(|a| ids.iter().position(|&id| id == a));
    let target = match (direction, current) {
        (Direction::Forward, Some(i)) => (i + 1) % n,
        (Direction::Forward, None) => 0,
        (Direction::Backward, Some(i)) => (i + n - 1) % n,
        (Direction::Backward, None) => n - 1,
    };
    Some(ids[target].to_string())
}
