use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::debug;

use crate::item::Item;
use crate::tree::{ChangesTree, NodeId, NodeKey};

/// Expand/select helpers over the changes tree. Absent objects are skipped
/// silently: the tree may simply not have caught up with the change list yet.
#[derive(Clone)]
pub struct TreeNavigator {
    tree: Rc<dyn ChangesTree>,
}

impl TreeNavigator {
    pub fn new(tree: Rc<dyn ChangesTree>) -> Self {
        Self { tree }
    }

    pub fn expand(&self, key: &NodeKey) {
        match self.tree.find_node_for_object(key) {
            Some(node) => self.tree.expand_node(node),
            None => debug!(?key, "nothing to expand"),
        }
    }

    pub fn select(&self, key: &NodeKey) {
        match self.tree.find_path_for_object(key) {
            Some(path) => self.tree.select_path(&path, false),
            None => debug!(?key, "nothing to select"),
        }
    }

    /// Selects the first node in pre-order backed by one of `candidates`.
    pub fn select_first(&self, candidates: &[Item]) -> Option<NodeId> {
        let mut found = None;
        self.tree.visit_preorder(&mut |id, key| match key {
            NodeKey::Item(item) if candidates.contains(item) => {
                found = Some(id);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        });

        let node = found?;
        let path = self.tree.path_to_node(node)?;
        self.tree.select_path(&path, false);
        Some(node)
    }
}
