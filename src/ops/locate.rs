use crate::model::node::Node;

/// Structural context of a node: where it sits in the forest.
///
/// This is a transient borrowed view computed by walking the tree; it is never
/// stored on the node. `path` holds the sibling index at each nesting level
/// (so `path.last() == Some(&index)`), and is what mutators use to get back to
/// the node mutably once the shared borrow is released.
#[derive(Debug, Clone)]
pub struct Location<'a> {
    pub node: &'a Node,
    /// `None` for root-level nodes
    pub parent: Option<&'a Node>,
    /// The sequence the node lives in: the forest itself, or `parent.children`
    pub siblings: &'a [Node],
    pub index: usize,
    /// Nesting depth (0 = root level)
    pub depth: usize,
    pub path: Vec<usize>,
}

impl Location<'_> {
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.map(|p| p.id.as_str())
    }

    /// Path of the parent, i.e. the path that resolves to `siblings`.
    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len() - 1]
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.siblings.len()
    }
}

struct Frame<'a> {
    siblings: &'a [Node],
    parent: Option<&'a Node>,
    next: usize,
}

/// Depth-first, parent-before-children walk over a forest.
///
/// Uses an explicit stack so arbitrarily deep trees cannot overflow the call
/// stack.
pub struct Preorder<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Preorder<'a> {
    pub fn new(forest: &'a [Node]) -> Self {
        Preorder {
            stack: vec![Frame {
                siblings: forest,
                parent: None,
                next: 0,
            }],
        }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = Location<'a>;

    fn next(&mut self) -> Option<Location<'a>> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.next >= frame.siblings.len() {
                self.stack.pop();
                continue;
            }
            let index = frame.next;
            frame.next += 1;
            let siblings = frame.siblings;
            let parent = frame.parent;
            let node = &siblings[index];

            // Every frame's `next` has already moved past the node it is
            // currently visiting, so `next - 1` is that level's index.
            let path: Vec<usize> = self.stack.iter().map(|f| f.next - 1).collect();
            let depth = path.len() - 1;

            if !node.children.is_empty() {
                self.stack.push(Frame {
                    siblings: &node.children,
                    parent: Some(node),
                    next: 0,
                });
            }

            return Some(Location {
                node,
                parent,
                siblings,
                index,
                depth,
                path,
            });
        }
    }
}

/// Find a node by id anywhere in the forest.
pub fn locate<'a>(forest: &'a [Node], id: &str) -> Option<Location<'a>> {
    Preorder::new(forest).find(|loc| loc.node.id == id)
}

/// Index path of the node with `id`, if present.
pub fn find_path(forest: &[Node], id: &str) -> Option<Vec<usize>> {
    locate(forest, id).map(|loc| loc.path)
}

pub fn find_node<'a>(forest: &'a [Node], id: &str) -> Option<&'a Node> {
    locate(forest, id).map(|loc| loc.node)
}

pub fn find_node_mut<'a>(forest: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    let path = find_path(forest, id)?;
    node_at_mut(forest, &path)
}

/// Resolve an index path to a node.
pub fn node_at_mut<'a>(forest: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (&first, rest) = path.split_first()?;
    let mut node = forest.get_mut(first)?;
    for &i in rest {
        node = node.children.get_mut(i)?;
    }
    Some(node)
}

/// Resolve a parent path to the sibling sequence it owns. An empty path is the
/// forest itself.
pub fn siblings_at_mut<'a>(
    forest: &'a mut Vec<Node>,
    parent_path: &[usize],
) -> Option<&'a mut Vec<Node>> {
    let mut siblings = forest;
    for &i in parent_path {
        siblings = &mut siblings.get_mut(i)?.children;
    }
    Some(siblings)
}
