use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::activation::{ActivationState, ActivationStateMachine};
use crate::config::PanelConfig;
use crate::host::{
    COMMIT_ACTION_ID, HostServices, MessageAugmentation, PreviewMode, StatusContributor,
};
use crate::inclusion::{DefaultInclusionModel, InclusionListener, InclusionModel, InclusionTracker};
use crate::item::{CommitAuthor, EditedCommit, Item, ItemKind};
use crate::listeners::{ListenerId, Multicaster};
use crate::navigation::TreeNavigator;
use crate::state::PanelState;
use crate::toolbar::{AmbientContext, PopupAnchor, ToolbarLayoutManager, ToolbarOrientation};
use crate::tree::{ChangesTree, NodeId, NodeKey, TreeEvent};

pub trait CommitAuthorListener {
    fn commit_author_changed(&self, author: Option<&CommitAuthor>);
}

impl<F: Fn(Option<&CommitAuthor>)> CommitAuthorListener for F {
    fn commit_author_changed(&self, author: Option<&CommitAuthor>) {
        self(author)
    }
}

/// Composition root of the commit review panel.
///
/// Every method takes `&self`: listeners and host callbacks may call back into
/// the coordinator at any point, so no borrow is held across an outbound call.
pub struct CommitReviewCoordinator {
    tree: Rc<dyn ChangesTree>,
    host: HostServices,
    inclusion: InclusionTracker,
    activation: ActivationStateMachine,
    toolbar: ToolbarLayoutManager,
    navigator: TreeNavigator,
    edited_commit: RefCell<Weak<EditedCommit>>,
    commit_author: RefCell<Option<CommitAuthor>>,
    author_listeners: Multicaster<dyn CommitAuthorListener>,
    tree_subscription: Cell<Option<ListenerId>>,
    disposed: Cell<bool>,
}

impl CommitReviewCoordinator {
    pub fn new(
        tree: Rc<dyn ChangesTree>,
        host: HostServices,
        config: &PanelConfig,
        augmentations: &[Rc<dyn MessageAugmentation>],
    ) -> Rc<Self> {
        let coordinator = Rc::new(Self {
            inclusion: InclusionTracker::new(
                tree.clone(),
                Some(Box::new(DefaultInclusionModel::new())),
            ),
            activation: ActivationStateMachine::new(
                host.windows.clone(),
                host.contents.clone(),
                host.focus.clone(),
                host.actions.clone(),
                tree.clone(),
            ),
            toolbar: ToolbarLayoutManager::new(host.toolbar.clone(), config.toolbar_orientation()),
            navigator: TreeNavigator::new(tree.clone()),
            edited_commit: RefCell::new(Weak::new()),
            commit_author: RefCell::new(None),
            author_listeners: Multicaster::new(),
            tree_subscription: Cell::new(None),
            disposed: Cell::new(false),
            tree,
            host,
        });

        let weak = Rc::downgrade(&coordinator);
        let subscription = coordinator.tree.subscribe(Rc::new(move |event: &TreeEvent| {
            if let Some(coordinator) = weak.upgrade() {
                coordinator.handle_tree_event(event);
            }
        }));
        coordinator.tree_subscription.set(Some(subscription));

        coordinator.tree.set_show_checkboxes(true);

        let editor = coordinator.host.message_editor.clone();
        for augmentation in augmentations {
            debug!(id = augmentation.id(), "installing commit message augmentation");
            augmentation.install(editor.as_ref());
        }

        coordinator
            .host
            .shortcuts
            .register(COMMIT_ACTION_ID, &config.keyboard_shortcuts.commit);

        let contributor: Weak<dyn StatusContributor> = Rc::downgrade(&coordinator) as Weak<CommitReviewCoordinator>;
        coordinator
            .host
            .status_strip
            .set_contributor(Some(contributor));

        info!(
            toolbar = ?coordinator.toolbar.orientation(),
            "commit panel created"
        );
        coordinator
    }

    pub fn included_items(&self) -> Vec<Item> {
        self.inclusion.included_items()
    }

    pub fn included_items_of_kind(&self, kind: ItemKind) -> Vec<Item> {
        self.inclusion.included_items_of_kind(kind)
    }

    pub fn displayed_items(&self) -> Vec<Item> {
        self.inclusion.displayed_items()
    }

    pub fn displayed_items_of_kind(&self, kind: ItemKind) -> Vec<Item> {
        self.inclusion.displayed_items_of_kind(kind)
    }

    pub fn included_count(&self) -> usize {
        self.inclusion.included_items().len()
    }

    pub fn is_included(&self, item: &Item) -> bool {
        self.inclusion.is_included(item)
    }

    pub fn include_items(&self, items: &[Item]) {
        self.inclusion.include_items(items);
    }

    pub fn exclude_items(&self, items: &[Item]) {
        self.inclusion.exclude_items(items);
    }

    pub fn set_item_included(&self, item: &Item, included: bool) {
        let items = std::slice::from_ref(item);
        if included {
            self.inclusion.include_items(items);
        } else {
            self.inclusion.exclude_items(items);
        }
    }

    pub fn include_all(&self) {
        self.inclusion.include_all();
    }

    pub fn set_inclusion_model(
        &self,
        model: Option<Box<dyn InclusionModel>>,
    ) -> Option<Box<dyn InclusionModel>> {
        self.inclusion.set_inclusion_model(model)
    }

    /// Applies a saved panel state, or includes everything when there is none.
    /// A saved state with no included paths restores as an empty selection.
    pub fn restore_state(&self, saved: Option<&PanelState>) {
        let Some(state) = saved else {
            self.inclusion.include_all();
            return;
        };

        let model = state.inclusion_model(&self.inclusion.displayed_items());
        self.inclusion.set_inclusion_model(Some(Box::new(model)));
        if let Some(message) = state.commit_message.as_deref() {
            self.set_commit_message(message);
        }
    }

    pub fn add_inclusion_listener(&self, listener: Rc<dyn InclusionListener>) -> ListenerId {
        self.inclusion.add_listener(listener)
    }

    pub fn remove_inclusion_listener(&self, id: ListenerId) -> bool {
        self.inclusion.remove_listener(id)
    }

    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }

    pub fn activation_state(&self) -> ActivationState {
        self.activation.state()
    }

    pub fn hides_host_on_deactivate(&self) -> bool {
        self.activation.hides_host_on_deactivate()
    }

    pub fn activate(&self) -> bool {
        self.activation.activate()
    }

    pub fn deactivate(&self, restore_host: bool) {
        self.activation.deactivate(restore_host);
    }

    pub fn toolbar_orientation(&self) -> ToolbarOrientation {
        self.toolbar.orientation()
    }

    pub fn is_toolbar_horizontal(&self) -> bool {
        self.toolbar.is_horizontal()
    }

    /// Returns whether the toolbar moved, so the caller knows to persist the preference.
    pub fn set_toolbar_orientation(&self, horizontal: bool) -> bool {
        self.toolbar.set_orientation(horizontal)
    }

    pub fn popup_anchor(&self, triggered_from_toolbar: bool, ambient: &AmbientContext) -> PopupAnchor {
        self.toolbar.popup_anchor(triggered_from_toolbar, ambient)
    }

    pub fn expand(&self, item: &Item) {
        self.navigator.expand(&NodeKey::Item(item.clone()));
    }

    pub fn select(&self, item: &Item) {
        self.navigator.select(&NodeKey::Item(item.clone()));
    }

    pub fn select_first(&self, candidates: &[Item]) -> Option<NodeId> {
        self.navigator.select_first(candidates)
    }

    pub fn edited_commit(&self) -> Option<Rc<EditedCommit>> {
        self.edited_commit.borrow().upgrade()
    }

    /// Points the panel at a commit being amended, or back at new changes.
    ///
    /// Every call refreshes, even when the same commit is set again. The panel
    /// holds the commit weakly.
    pub fn set_edited_commit(&self, commit: Option<&Rc<EditedCommit>>) {
        *self.edited_commit.borrow_mut() = commit.map(Rc::downgrade).unwrap_or_default();
        self.refresh_data();

        if let Some(commit) = commit {
            debug!(commit = commit.id.short(), "revealing edited commit");
            self.navigator.expand(&NodeKey::Commit(commit.id.clone()));
        }
    }

    pub fn refresh_data(&self) {
        self.host.changes_view.refresh(Box::new(|| {}));
    }

    /// Called once a commit attempt finished, whatever its outcome.
    pub fn end_execution(&self) {
        if self.host.changes_view.preview_mode() != PreviewMode::EditorForSelection {
            return;
        }

        let tree = self.tree.clone();
        let changes_view = self.host.changes_view.clone();
        self.host.changes_view.refresh(Box::new(move || {
            if changes_view.preview_mode() != PreviewMode::EditorForSelection {
                return;
            }
            if tree.selected_items().is_empty() {
                info!("closing empty change preview after commit");
                changes_view.close_preview();
            }
        }));
    }

    pub fn commit_message(&self) -> String {
        self.host.message_editor.text()
    }

    pub fn set_commit_message(&self, message: &str) {
        self.host.message_editor.set_text(message);
    }

    pub fn commit_author(&self) -> Option<CommitAuthor> {
        self.commit_author.borrow().clone()
    }

    pub fn set_commit_author(&self, author: Option<CommitAuthor>) {
        if *self.commit_author.borrow() == author {
            return;
        }
        *self.commit_author.borrow_mut() = author.clone();
        self.author_listeners
            .dispatch(move |listener| listener.commit_author_changed(author.as_ref()));
    }

    pub fn add_commit_author_listener(&self, listener: Rc<dyn CommitAuthorListener>) -> ListenerId {
        self.author_listeners.add(listener)
    }

    pub fn remove_commit_author_listener(&self, id: ListenerId) -> bool {
        self.author_listeners.remove(id)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Detaches the panel from the tree and the host. Does not deactivate;
    /// callers go through [`Self::deactivate`] for that.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        if let Some(subscription) = self.tree_subscription.take() {
            self.tree.unsubscribe(subscription);
        }
        self.host.status_strip.set_contributor(None);
        self.tree.set_show_checkboxes(false);
        self.host.shortcuts.unregister(COMMIT_ACTION_ID);
        self.activation.invalidate_pending();
        self.inclusion.clear_listeners();
        self.author_listeners.clear();

        info!("commit panel disposed");
    }

    fn handle_tree_event(&self, event: &TreeEvent) {
        match event {
            TreeEvent::InclusionToggled { items, included } => {
                if *included {
                    self.inclusion.include_items(items);
                } else {
                    self.inclusion.exclude_items(items);
                }
            }
            TreeEvent::Refreshed => self.inclusion.prune_stale(),
        }
    }
}

impl StatusContributor for CommitReviewCoordinator {
    fn status_text(&self) -> String {
        let displayed = self.inclusion.displayed_items().len();
        if displayed == 0 {
            return "No changes".to_string();
        }
        let included = self.included_count();
        let noun = if displayed == 1 { "file" } else { "files" };
        format!("{included} of {displayed} {noun} included")
    }
}
