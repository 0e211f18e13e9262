use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::debug;

use crate::item::{CommitId, Item};
use crate::listeners::{ListenerId, Multicaster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Root-to-node chain of a node in the changes tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath(pub Vec<NodeId>);

impl TreePath {
    pub fn last(&self) -> Option<NodeId> {
        self.0.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeGroup {
    Changes,
    Unversioned,
}

impl ChangeGroup {
    pub fn label(self) -> &'static str {
        match self {
            Self::Changes => "Changes",
            Self::Unversioned => "Unversioned Files",
        }
    }
}

/// The object a tree node is backed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Group(ChangeGroup),
    Commit(CommitId),
    Directory(String),
    Item(Item),
}

impl From<Item> for NodeKey {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<CommitId> for NodeKey {
    fn from(id: CommitId) -> Self {
        Self::Commit(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The user flipped inclusion checkboxes in the tree.
    InclusionToggled { items: Vec<Item>, included: bool },
    /// The tree finished rebuilding from its data source.
    Refreshed,
}

pub trait TreeListener {
    fn tree_changed(&self, event: &TreeEvent);
}

impl<F: Fn(&TreeEvent)> TreeListener for F {
    fn tree_changed(&self, event: &TreeEvent) {
        self(event)
    }
}

/// Externally owned hierarchical view of pending changes.
///
/// The tree is shared with the host shell. The panel only reads it and
/// touches its selection, expansion and checkbox projections.
pub trait ChangesTree {
    fn find_node_for_object(&self, key: &NodeKey) -> Option<NodeId>;
    fn find_path_for_object(&self, key: &NodeKey) -> Option<TreePath>;
    /// Walks every node in pre-order until the visitor breaks.
    fn visit_preorder(&self, visitor: &mut dyn FnMut(NodeId, &NodeKey) -> ControlFlow<()>);
    fn path_to_node(&self, node: NodeId) -> Option<TreePath>;
    /// Expands the node and its ancestors so all of its descendants are visible.
    fn expand_node(&self, node: NodeId);
    fn select_path(&self, path: &TreePath, scroll_to_visible: bool);
    fn selected_items(&self) -> Vec<Item>;
    fn set_show_checkboxes(&self, show: bool);
    fn subscribe(&self, listener: Rc<dyn TreeListener>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);

    /// Every distinct item currently in the tree, in display order.
    fn displayed_items(&self) -> Vec<Item> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        self.visit_preorder(&mut |_, key| {
            if let NodeKey::Item(item) = key
                && seen.insert(item.clone())
            {
                items.push(item.clone());
            }
            ControlFlow::Continue(())
        });
        items
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    key: NodeKey,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
}

#[derive(Default)]
struct NodeArena {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl NodeArena {
    fn insert(&mut self, parent: Option<NodeId>, key: NodeKey) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            key,
            parent,
            children: Vec::new(),
            expanded: false,
        });
        match parent.and_then(|parent| self.nodes.get_mut(parent.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn walk(&self, visitor: &mut dyn FnMut(NodeId, &NodeKey) -> ControlFlow<()>) {
        let mut stack = self.roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if visitor(id, &node.key).is_break() {
                return;
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn path_to(&self, node: NodeId) -> Option<TreePath> {
        let mut chain = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let node = self.nodes.get(id.0)?;
            chain.push(id);
            cursor = node.parent;
        }
        chain.reverse();
        Some(TreePath(chain))
    }

    fn expand_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0) {
                node.expanded = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }
}

#[derive(Default)]
struct DirectoryFolder {
    folders: BTreeMap<String, DirectoryFolder>,
    items: Vec<Item>,
}

/// In-memory [`ChangesTree`] laid out the way the changes view groups items:
/// an optional commit node, a "Changes" group with directory folders, and an
/// "Unversioned Files" group.
#[derive(Default)]
pub struct ChangesTreeModel {
    arena: RefCell<NodeArena>,
    selection: RefCell<Vec<NodeId>>,
    scrolled_to: Cell<Option<NodeId>>,
    show_checkboxes: Cell<bool>,
    listeners: Multicaster<dyn TreeListener>,
}

impl ChangesTreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(commit: Option<&CommitId>, items: &[Item]) -> Self {
        let model = Self::new();
        *model.arena.borrow_mut() = build_arena(commit, items);
        model
    }

    /// Appends a raw node. Mostly useful for callers that build a custom layout.
    pub fn add_node(&self, parent: Option<NodeId>, key: impl Into<NodeKey>) -> NodeId {
        self.arena.borrow_mut().insert(parent, key.into())
    }

    /// Rebuilds the tree from a fresh change list and announces the refresh.
    ///
    /// Selected items that survive the rebuild stay selected.
    pub fn reload(&self, commit: Option<&CommitId>, items: &[Item]) {
        let selected = self.selected_items();
        *self.arena.borrow_mut() = build_arena(commit, items);
        self.scrolled_to.set(None);

        let arena = self.arena.borrow();
        let mut reselected = Vec::new();
        arena.walk(&mut |id, key| {
            if let NodeKey::Item(item) = key
                && selected.contains(item)
            {
                reselected.push(id);
            }
            ControlFlow::Continue(())
        });
        drop(arena);
        *self.selection.borrow_mut() = reselected;

        debug!(items = items.len(), "changes tree reloaded");
        self.listeners
            .dispatch(|listener| listener.tree_changed(&TreeEvent::Refreshed));
    }

    /// Forwards a checkbox click. Ignored while checkboxes are hidden.
    pub fn toggle_inclusion(&self, items: Vec<Item>, included: bool) {
        if !self.show_checkboxes.get() {
            debug!("ignoring checkbox toggle while checkboxes are hidden");
            return;
        }
        let event = TreeEvent::InclusionToggled { items, included };
        self.listeners
            .dispatch(move |listener| listener.tree_changed(&event));
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().clear();
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.borrow().clone()
    }

    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to.get()
    }

    pub fn shows_checkboxes(&self) -> bool {
        self.show_checkboxes.get()
    }

    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.arena
            .borrow()
            .nodes
            .get(node.0)
            .is_some_and(|node| node.expanded)
    }

    pub fn node_key(&self, node: NodeId) -> Option<NodeKey> {
        self.arena
            .borrow()
            .nodes
            .get(node.0)
            .map(|node| node.key.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ChangesTree for ChangesTreeModel {
    fn find_node_for_object(&self, key: &NodeKey) -> Option<NodeId> {
        let mut found = None;
        self.visit_preorder(&mut |id, candidate| {
            if candidate == key {
                found = Some(id);
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        found
    }

    fn find_path_for_object(&self, key: &NodeKey) -> Option<TreePath> {
        let node = self.find_node_for_object(key)?;
        self.path_to_node(node)
    }

    fn visit_preorder(&self, visitor: &mut dyn FnMut(NodeId, &NodeKey) -> ControlFlow<()>) {
        self.arena.borrow().walk(visitor);
    }

    fn path_to_node(&self, node: NodeId) -> Option<TreePath> {
        self.arena.borrow().path_to(node)
    }

    fn expand_node(&self, node: NodeId) {
        let Some(path) = self.path_to_node(node) else {
            return;
        };
        let mut arena = self.arena.borrow_mut();
        for ancestor in path.0.iter().take(path.0.len().saturating_sub(1)) {
            if let Some(ancestor) = arena.nodes.get_mut(ancestor.0) {
                ancestor.expanded = true;
            }
        }
        arena.expand_subtree(node);
    }

    fn select_path(&self, path: &TreePath, scroll_to_visible: bool) {
        let Some(node) = path.last() else {
            return;
        };
        if self.arena.borrow().nodes.get(node.0).is_none() {
            return;
        }
        *self.selection.borrow_mut() = vec![node];
        if scroll_to_visible {
            self.scrolled_to.set(Some(node));
        }
    }

    fn selected_items(&self) -> Vec<Item> {
        let arena = self.arena.borrow();
        self.selection
            .borrow()
            .iter()
            .filter_map(|id| match arena.nodes.get(id.0).map(|node| &node.key) {
                Some(NodeKey::Item(item)) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    fn set_show_checkboxes(&self, show: bool) {
        self.show_checkboxes.set(show);
    }

    fn subscribe(&self, listener: Rc<dyn TreeListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

fn build_arena(commit: Option<&CommitId>, items: &[Item]) -> NodeArena {
    let mut arena = NodeArena::default();
    let commit_node = commit.map(|id| arena.insert(None, NodeKey::Commit(id.clone())));

    let mut changes = DirectoryFolder::default();
    let mut unversioned = Vec::new();
    for item in items {
        match item {
            Item::Change(_) => {
                let mut cursor = &mut changes;
                let mut parts = item.path().split('/').peekable();
                while let Some(part) = parts.next() {
                    if parts.peek().is_some() {
                        cursor = cursor.folders.entry(part.to_string()).or_default();
                    }
                }
                cursor.items.push(item.clone());
            }
            Item::Untracked(_) => unversioned.push(item.clone()),
        }
    }

    if !changes.folders.is_empty() || !changes.items.is_empty() {
        let group = arena.insert(commit_node, NodeKey::Group(ChangeGroup::Changes));
        insert_folder(&mut arena, group, &changes, "");
    }

    if !unversioned.is_empty() {
        let group = arena.insert(commit_node, NodeKey::Group(ChangeGroup::Unversioned));
        for item in unversioned {
            arena.insert(Some(group), NodeKey::Item(item));
        }
    }

    arena
}

fn insert_folder(arena: &mut NodeArena, parent: NodeId, folder: &DirectoryFolder, prefix: &str) {
    for (name, child) in &folder.folders {
        let path = join_path(prefix, name);
        let node = arena.insert(Some(parent), NodeKey::Directory(path.clone()));
        insert_folder(arena, node, child, &path);
    }

    for item in &folder.items {
        arena.insert(Some(parent), NodeKey::Item(item.clone()));
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
