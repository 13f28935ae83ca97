use indexmap::IndexMap;

use crate::model::node::Node;
use crate::ops::locate::{Location, Preorder};

/// One row of the flattened view. Same shape as a locator result.
pub type FlatEntry<'a> = Location<'a>;

/// All nodes in visual (preorder) order with their structural context.
///
/// Recomputed on every call; callers must not hold on to the result across a
/// mutation.
pub fn flatten(forest: &[Node]) -> Vec<FlatEntry<'_>> {
    Preorder::new(forest).collect()
}

/// Flattened ids only, for callers that just need order.
pub fn flat_ids(forest: &[Node]) -> Vec<&str> {
    Preorder::new(forest).map(|loc| loc.node.id.as_str()).collect()
}

/// Depth of `id` in the flattened view, or 0 if absent.
pub fn indent_level(forest: &[Node], id: &str) -> usize {
    Preorder::new(forest)
        .find(|loc| loc.node.id == id)
        .map_or(0, |loc| loc.depth)
}

/// Map of every node id to its depth, in visual order.
pub fn indent_levels(forest: &[Node]) -> IndexMap<String, usize> {
    Preorder::new(forest)
        .map(|loc| (loc.node.id.clone(), loc.depth))
        .collect()
}

/// Total number of nodes at every depth.
pub fn node_count(forest: &[Node]) -> usize {
    forest.iter().map(Node::subtree_len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::with_id("1", "A")
                .child(Node::with_id("1-1", "B").child(Node::with_id("1-1-1", "C")))
                .child(Node::with_id("1-2", "D")),
            Node::with_id("2", "E"),
        ]
    }

    #[test]
    fn flatten_is_preorder_with_depths() {
        let forest = sample();
        let flat = flatten(&forest);
        let rows: Vec<(&str, usize)> = flat
            .iter()
            .map(|e| (e.node.id.as_str(), e.depth))
            .collect();
        assert_eq!(
            rows,
            vec![("1", 0), ("1-1", 1), ("1-1-1", 2), ("1-2", 1), ("2", 0)]
        );
    }

    #[test]
    fn flatten_carries_parent_and_siblings() {
        let forest = sample();
        let flat = flatten(&forest);
        assert!(flat[0].parent.is_none());
        assert_eq!(flat[0].siblings.len(), 2);
        assert_eq!(flat[3].parent_id(), Some("1"));
        assert_eq!(flat[3].siblings.len(), 2);
        assert_eq!(flat[3].index, 1);
    }

    #[test]
    fn children_follow_parent_contiguously() {
        let forest = sample();
        let flat = flatten(&forest);
        for (i, entry) in flat.iter().enumerate() {
            let span = entry.node.subtree_len();
            for child_entry in &flat[i + 1..i + span] {
                assert!(child_entry.depth > entry.depth);
            }
            if let Some(next) = flat.get(i + span) {
                assert!(next.depth <= entry.depth);
            }
        }
    }

    #[test]
    fn flatten_empty_forest() {
        assert!(flatten(&[]).is_empty());
        assert_eq!(node_count(&[]), 0);
    }

    #[test]
    fn indent_level_lookup() {
        let forest = sample();
        assert_eq!(indent_level(&forest, "1"), 0);
        assert_eq!(indent_level(&forest, "1-1-1"), 2);
        assert_eq!(indent_level(&forest, "missing"), 0);
    }

    #[test]
    fn indent_levels_in_visual_order() {
        let forest = sample();
        let levels = indent_levels(&forest);
        let keys: Vec<&str> = levels.keys().map(String::as_str).collect();
        assert_eq!(keys, flat_ids(&forest));
        assert_eq!(levels["1-1-1"], 2);
        assert_eq!(node_count(&forest), 5);
    }

    #[test]
    fn deep_chain_flattens() {
        let mut leaf = Node::with_id("d99", "deepest");
        for i in (0..99).rev() {
            leaf = Node::with_id(format!("d{i}"), "level").child(leaf);
        }
        let forest = vec![leaf];
        let flat = flatten(&forest);
        assert_eq!(flat.len(), 100);
        assert_eq!(flat[99].depth, 99);
        assert_eq!(flat[99].path.len(), 100);
    }
}
