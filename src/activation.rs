use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::host::{
    ActionLayer, COMMIT_CONTENT_ID, COMMIT_TOOL_WINDOW_ID, ContentRegistry, FocusManager,
    FocusTarget, HostResolver,
};
use crate::tree::ChangesTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Inactive,
    Active,
}

/// Tracks whether the panel is the foreground commit surface and puts the
/// host window back the way it found it on deactivation.
pub struct ActivationStateMachine {
    windows: Rc<dyn HostResolver>,
    contents: Rc<dyn ContentRegistry>,
    focus: Rc<dyn FocusManager>,
    actions: Rc<dyn ActionLayer>,
    tree: Rc<dyn ChangesTree>,
    state: Cell<ActivationState>,
    hide_host_on_deactivate: Cell<bool>,
    // Bumped on every transition; a focus request from an older activation is dropped.
    epoch: Rc<Cell<usize>>,
}

impl ActivationStateMachine {
    pub fn new(
        windows: Rc<dyn HostResolver>,
        contents: Rc<dyn ContentRegistry>,
        focus: Rc<dyn FocusManager>,
        actions: Rc<dyn ActionLayer>,
        tree: Rc<dyn ChangesTree>,
    ) -> Self {
        Self {
            windows,
            contents,
            focus,
            actions,
            tree,
            state: Cell::new(ActivationState::Inactive),
            hide_host_on_deactivate: Cell::new(false),
            epoch: Rc::new(Cell::new(0)),
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state.get() == ActivationState::Active
    }

    pub fn hides_host_on_deactivate(&self) -> bool {
        self.hide_host_on_deactivate.get()
    }

    pub fn activate(&self) -> bool {
        let Some(window) = self.windows.resolve_window(COMMIT_TOOL_WINDOW_ID) else {
            debug!("cannot activate commit panel: host window {COMMIT_TOOL_WINDOW_ID} is not registered");
            return false;
        };

        // A duplicate activate must keep the flag captured by the first one.
        if !self.is_active() {
            self.hide_host_on_deactivate.set(!window.is_visible());
        }

        self.tree.set_show_checkboxes(true);
        self.state.set(ActivationState::Active);
        self.actions.set_commit_surface_active(true);
        self.contents.select_content(COMMIT_CONTENT_ID);

        let epoch = self.next_epoch();
        let current_epoch = self.epoch.clone();
        let focus = self.focus.clone();
        window.activate(Box::new(move || {
            if current_epoch.get() != epoch {
                debug!("skipping stale commit message focus request");
                return;
            }
            focus.request_focus(FocusTarget::CommitMessage);
        }));

        info!(
            hide_host_on_deactivate = self.hide_host_on_deactivate.get(),
            "commit panel activated"
        );
        true
    }

    pub fn deactivate(&self, restore_host: bool) {
        if restore_host && self.hide_host_on_deactivate.get() {
            match self.windows.resolve_window(COMMIT_TOOL_WINDOW_ID) {
                Some(window) => window.hide(),
                None => debug!("host window vanished before it could be hidden again"),
            }
        }
        self.hide_host_on_deactivate.set(false);

        self.tree.set_show_checkboxes(false);
        self.state.set(ActivationState::Inactive);
        self.actions.set_commit_surface_active(false);
        self.next_epoch();

        info!(restore_host, "commit panel deactivated");
    }

    /// Drops any focus request still in flight without changing state.
    pub fn invalidate_pending(&self) {
        self.next_epoch();
    }

    fn next_epoch(&self) -> usize {
        let epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(epoch);
        epoch
    }
}
