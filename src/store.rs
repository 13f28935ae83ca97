use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use indexmap::IndexMap;
use log::debug;

use crate::model::node::Node;
use crate::ops::flatten::{self, FlatEntry};
use crate::ops::locate::{self, Location};
use crate::ops::navigate;
use crate::ops::tree_ops::{self, InsertPosition};

/// Owns the forest and the current selection.
///
/// Every mutation goes through here. Flattened views are recomputed on each
/// call and borrow the store, so a stale view cannot outlive a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStore {
    forest: Vec<Node>,
    active_id: Option<String>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around an existing forest, with nothing selected.
    pub fn from_forest(forest: Vec<Node>) -> Self {
        TreeStore {
            forest,
            active_id: None,
        }
    }

    /// The two-project demo outline new installs start with.
    pub fn sample() -> Self {
        Self::from_forest(vec![
            Node::with_id("1", "Project Alpha")
                .child(
                    Node::with_id("1-1", "Design")
                        .child(Node::with_id("1-1-1", "Wireframes"))
                        .child(Node::with_id("1-1-2", "Mockups")),
                )
                .child(
                    Node::with_id("1-2", "Development")
                        .child(Node::with_id("1-2-1", "Frontend"))
                        .child(Node::with_id("1-2-2", "Backend")),
                ),
            Node::with_id("2", "Project Beta").child(Node::with_id("2-1", "Research")),
        ])
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn forest(&self) -> &[Node] {
        &self.forest
    }

    /// Consume the store, handing back the forest.
    pub fn into_forest(self) -> Vec<Node> {
        self.forest
    }

    pub fn flattened(&self) -> Vec<FlatEntry<'_>> {
        flatten::flatten(&self.forest)
    }

    pub fn find(&self, id: &str) -> Option<Location<'_>> {
        locate::locate(&self.forest, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn indent_level(&self, id: &str) -> usize {
        flatten::indent_level(&self.forest, id)
    }

    pub fn indent_levels(&self) -> IndexMap<String, usize> {
        flatten::indent_levels(&self.forest)
    }

    /// Number of root-level tasks.
    pub fn root_count(&self) -> usize {
        self.forest.len()
    }

    /// Number of tasks at every depth.
    pub fn len(&self) -> usize {
        flatten::node_count(&self.forest)
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Select a task, or clear the selection with `None`.
    ///
    /// Selecting an id that is not in the forest is ignored, so the selection
    /// only ever names a live node at the moment it is set.
    pub fn set_active_id(&mut self, id: Option<&str>) {
        match id {
            None => self.active_id = None,
            Some(id) if self.contains(id) => self.active_id = Some(id.to_string()),
            Some(id) => {
                debug!("event=set_active module=store status=noop reason=not_found id={id}");
            }
        }
    }

    pub fn select_next(&mut self) {
        if let Some(id) = navigate::next_id(&self.forest, self.active_id.as_deref()) {
            self.active_id = Some(id);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(id) = navigate::previous_id(&self.forest, self.active_id.as_deref()) {
            self.active_id = Some(id);
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// See [`tree_ops::insert_task`].
    pub fn insert(
        &mut self,
        text: &str,
        relative_to: Option<&str>,
        position: InsertPosition,
    ) -> Option<String> {
        tree_ops::insert_task(&mut self.forest, text, relative_to, position)
    }

    /// Delete a task, promoting its children. The selection is left as is;
    /// if it pointed at the deleted task the caller re-points it.
    pub fn delete(&mut self, id: &str) -> bool {
        tree_ops::delete_task(&mut self.forest, id)
    }

    pub fn toggle_completion(&mut self, id: &str) -> bool {
        tree_ops::toggle_completion(&mut self.forest, id, Utc::now())
    }

    pub fn rename(&mut self, id: &str, new_text: &str) -> bool {
        tree_ops::rename_task(&mut self.forest, id, new_text)
    }

    pub fn move_up(&mut self, id: &str) -> bool {
        tree_ops::move_up(&mut self.forest, id)
    }

    pub fn move_down(&mut self, id: &str) -> bool {
        tree_ops::move_down(&mut self.forest, id)
    }

    pub fn nest(&mut self, id: &str) -> bool {
        tree_ops::nest(&mut self.forest, id)
    }

    pub fn unnest(&mut self, id: &str) -> bool {
        tree_ops::unnest(&mut self.forest, id)
    }

    /// Replace everything with one empty task and select it.
    pub fn clear_all(&mut self) -> String {
        let id = tree_ops::clear_all(&mut self.forest);
        self.active_id = Some(id.clone());
        id
    }

    /// Replace forest and selection wholesale. A selection that does not name
    /// a node in `forest` is dropped.
    pub(crate) fn replace(&mut self, forest: Vec<Node>, active_id: Option<String>) {
        self.forest = forest;
        self.active_id = active_id.filter(|id| locate::locate(&self.forest, id).is_some());
    }
}

/// A [`TreeStore`] behind a single lock, for hosts that touch the outline
/// from more than one thread.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<TreeStore>>,
}

impl SharedStore {
    pub fn new(store: TreeStore) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the whole store.
    pub fn with<R>(&self, f: impl FnOnce(&mut TreeStore) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Every store operation leaves the tree consistent, so a poisoned lock
    /// is still safe to reuse.
    pub fn lock(&self) -> MutexGuard<'_, TreeStore> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_two_roots() {
        let store = TreeStore::sample();
        assert_eq!(store.root_count(), 2);
        assert_eq!(store.len(), 9);
        assert!(store.active_id().is_none());
    }

    #[test]
    fn set_active_ignores_unknown_ids() {
        let mut store = TreeStore::sample();
        store.set_active_id(Some("1-2"));
        assert_eq!(store.active_id(), Some("1-2"));

        store.set_active_id(Some("ghost"));
        assert_eq!(store.active_id(), Some("1-2"));

        store.set_active_id(None);
        assert!(store.active_id().is_none());
    }

    #[test]
    fn clear_all_selects_new_task() {
        let mut store = TreeStore::sample();
        let id = store.clear_all();
        assert_eq!(store.active_id(), Some(id.as_str()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_leaves_selection_for_caller() {
        let mut store = TreeStore::sample();
        store.set_active_id(Some("2-1"));
        assert!(store.delete("2-1"));
        assert_eq!(store.active_id(), Some("2-1"));

        // Navigation recovers from the dangling id.
        store.select_next();
        assert_eq!(store.active_id(), Some("1"));
    }

    #[test]
    fn select_on_empty_store_keeps_none() {
        let mut store = TreeStore::new();
        store.select_next();
        store.select_previous();
        assert!(store.active_id().is_none());
    }

    #[test]
    fn toggle_stamps_date() {
        let mut store = TreeStore::sample();
        assert!(store.toggle_completion("1-1"));
        let node = store.find("1-1").unwrap().node;
        assert!(node.completed);
        assert!(node.completion_date.is_some());
    }

    #[test]
    fn replace_drops_dangling_selection() {
        let mut store = TreeStore::new();
        store.replace(TreeStore::sample().into_forest(), Some("nope".into()));
        assert!(store.active_id().is_none());
        store.replace(TreeStore::sample().into_forest(), Some("2".into()));
        assert_eq!(store.active_id(), Some("2"));
    }

    #[test]
    fn shared_store_serializes_writers() {
        let shared = SharedStore::new(TreeStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared.with(|store| {
                        store.insert(&format!("task {i}"), None, InsertPosition::After)
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
        assert_eq!(shared.lock().root_count(), 8);
    }
}
