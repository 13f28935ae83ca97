use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single task in the outline. Children are owned exclusively; there is no
/// parent back-reference, so structural context is always recomputed by the
/// locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable unique id (UUID v4 for nodes created at runtime)
    #[serde(default = "new_id", deserialize_with = "null_as_new_id")]
    pub id: String,
    /// Task text, stored verbatim after creation
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    /// Set when the task is checked off, cleared when unchecked
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    /// Subtasks in visual order
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a fresh, open task with a new id and no children.
    pub fn new(text: impl Into<String>) -> Self {
        Node::with_id(new_id(), text)
    }

    /// Create an open task with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            text: text.into(),
            completed: false,
            completion_date: None,
            children: Vec::new(),
        }
    }

    /// Builder-style helper for assembling literal trees.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Flip completion, stamping or clearing the completion date.
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completion_date = if self.completed { Some(now) } else { None };
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// Generate a fresh node id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn null_as_new_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(new_id))
}

/// Legacy data sometimes carries explicit `null`s; treat them like absent keys.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
