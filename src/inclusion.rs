use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::item::{Item, ItemKind};
use crate::listeners::{ListenerId, Multicaster};
use crate::tree::{ChangesTree, NodeKey};

pub trait InclusionListener {
    fn inclusion_changed(&self);
}

impl<F: Fn()> InclusionListener for F {
    fn inclusion_changed(&self) {
        self()
    }
}

/// Backing store deciding which items are part of the next commit.
///
/// Mutators report whether anything actually changed.
pub trait InclusionModel {
    fn is_included(&self, item: &Item) -> bool;
    fn include(&mut self, items: &[Item]) -> bool;
    fn exclude(&mut self, items: &[Item]) -> bool;
    /// Drops state for items `keep` rejects.
    fn retain(&mut self, keep: &dyn Fn(&Item) -> bool) -> bool;
}

/// Explicit set of included items. Nothing is included until asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultInclusionModel {
    included: BTreeSet<Item>,
}

impl DefaultInclusionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            included: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.included.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

impl InclusionModel for DefaultInclusionModel {
    fn is_included(&self, item: &Item) -> bool {
        self.included.contains(item)
    }

    fn include(&mut self, items: &[Item]) -> bool {
        let mut changed = false;
        for item in items {
            changed |= self.included.insert(item.clone());
        }
        changed
    }

    fn exclude(&mut self, items: &[Item]) -> bool {
        let mut changed = false;
        for item in items {
            changed |= self.included.remove(item);
        }
        changed
    }

    fn retain(&mut self, keep: &dyn Fn(&Item) -> bool) -> bool {
        let before = self.included.len();
        self.included.retain(|item| keep(item));
        self.included.len() != before
    }
}

/// Everything displayed is included except what was explicitly unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionInclusionModel {
    excluded: BTreeSet<Item>,
}

impl ExclusionInclusionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}

impl InclusionModel for ExclusionInclusionModel {
    fn is_included(&self, item: &Item) -> bool {
        !self.excluded.contains(item)
    }

    fn include(&mut self, items: &[Item]) -> bool {
        let mut changed = false;
        for item in items {
            changed |= self.excluded.remove(item);
        }
        changed
    }

    fn exclude(&mut self, items: &[Item]) -> bool {
        let mut changed = false;
        for item in items {
            changed |= self.excluded.insert(item.clone());
        }
        changed
    }

    fn retain(&mut self, keep: &dyn Fn(&Item) -> bool) -> bool {
        let before = self.excluded.len();
        self.excluded.retain(|item| keep(item));
        self.excluded.len() != before
    }
}

/// Owns the inclusion store and projects it over the displayed tree.
///
/// Reads always go through the tree's current item universe, so an item the
/// tree no longer shows is never reported as included. Unknown items are
/// ignored rather than reported: the tree refreshes on its own schedule.
pub struct InclusionTracker {
    tree: Rc<dyn ChangesTree>,
    model: RefCell<Option<Box<dyn InclusionModel>>>,
    listeners: Multicaster<dyn InclusionListener>,
}

impl InclusionTracker {
    pub fn new(tree: Rc<dyn ChangesTree>, model: Option<Box<dyn InclusionModel>>) -> Self {
        Self {
            tree,
            model: RefCell::new(model),
            listeners: Multicaster::new(),
        }
    }

    pub fn included_items(&self) -> Vec<Item> {
        let model = self.model.borrow();
        let Some(model) = model.as_ref() else {
            return Vec::new();
        };
        self.tree
            .displayed_items()
            .into_iter()
            .filter(|item| model.is_included(item))
            .collect()
    }

    pub fn included_items_of_kind(&self, kind: ItemKind) -> Vec<Item> {
        self.included_items()
            .into_iter()
            .filter(|item| item.kind() == kind)
            .collect()
    }

    pub fn displayed_items(&self) -> Vec<Item> {
        self.tree.displayed_items()
    }

    pub fn displayed_items_of_kind(&self, kind: ItemKind) -> Vec<Item> {
        self.tree
            .displayed_items()
            .into_iter()
            .filter(|item| item.kind() == kind)
            .collect()
    }

    /// Items the tree does not display never read as included, whatever the model says.
    pub fn is_included(&self, item: &Item) -> bool {
        let key = NodeKey::Item(item.clone());
        if self.tree.find_node_for_object(&key).is_none() {
            return false;
        }
        self.model
            .borrow()
            .as_ref()
            .is_some_and(|model| model.is_included(item))
    }

    pub fn include_items(&self, items: &[Item]) {
        let displayed = self.displayed_subset(items);
        self.mutate("include", |model| model.include(&displayed));
    }

    pub fn exclude_items(&self, items: &[Item]) {
        let displayed = self.displayed_subset(items);
        self.mutate("exclude", |model| model.exclude(&displayed));
    }

    pub fn include_all(&self) {
        let displayed = self.tree.displayed_items();
        self.mutate("include all", |model| model.include(&displayed));
    }

    /// Swaps the inclusion store wholesale and returns the previous one.
    /// `None` detaches: nothing reads as included until a model is set again.
    pub fn set_inclusion_model(
        &self,
        model: Option<Box<dyn InclusionModel>>,
    ) -> Option<Box<dyn InclusionModel>> {
        let previous = self.model.replace(model);
        debug!(attached = self.model.borrow().is_some(), "inclusion model replaced");
        self.notify();
        previous
    }

    /// Forgets items the tree no longer displays.
    pub fn prune_stale(&self) {
        let displayed = self.tree.displayed_items().into_iter().collect::<HashSet<_>>();
        self.mutate("prune", |model| model.retain(&|item| displayed.contains(item)));
    }

    pub fn add_listener(&self, listener: Rc<dyn InclusionListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }

    fn displayed_subset(&self, items: &[Item]) -> Vec<Item> {
        let displayed = self.tree.displayed_items().into_iter().collect::<HashSet<_>>();
        let (known, unknown): (Vec<_>, Vec<_>) =
            items.iter().cloned().partition(|item| displayed.contains(item));
        if !unknown.is_empty() {
            debug!(count = unknown.len(), "ignoring items not displayed in the changes tree");
        }
        known
    }

    fn mutate(&self, operation: &str, apply: impl FnOnce(&mut dyn InclusionModel) -> bool) {
        let changed = {
            let mut model = self.model.borrow_mut();
            match model.as_deref_mut() {
                Some(model) => apply(model),
                None => {
                    debug!(operation, "no inclusion model attached");
                    false
                }
            }
        };

        if changed {
            debug!(operation, "inclusion changed");
            self.notify();
        }
    }

    fn notify(&self) {
        self.listeners
            .dispatch(|listener| listener.inclusion_changed());
    }
}
