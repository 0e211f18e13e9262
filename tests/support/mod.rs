#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use commit_review::CommitReviewCoordinator;
use commit_review::config::PanelConfig;
use commit_review::host::{
    ActionLayer, ChangesView, ContentRegistry, FocusManager, FocusTarget, HostResolver,
    HostServices, HostWindow, MessageAugmentation, MessageEditor, PreviewMode, ShortcutRegistry,
    StatusContributor, StatusStrip, ToolbarSurface,
};
use commit_review::item::{CommitId, FileStatus, Item};
use commit_review::toolbar::ToolbarPresentation;
use commit_review::tree::ChangesTreeModel;

pub fn sample_items() -> Vec<Item> {
    vec![
        Item::change("src/lib.rs", FileStatus::Modified),
        Item::change("src/tree.rs", FileStatus::Added),
        Item::change("README.md", FileStatus::Modified),
        Item::untracked("notes.txt"),
    ]
}

pub struct FakeWindow {
    pub visible: Cell<bool>,
    pub hide_calls: Cell<usize>,
    pub activate_calls: Cell<usize>,
    pub defer_activation: Cell<bool>,
    pending: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl FakeWindow {
    pub fn new(visible: bool) -> Self {
        Self {
            visible: Cell::new(visible),
            hide_calls: Cell::new(0),
            activate_calls: Cell::new(0),
            defer_activation: Cell::new(false),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn finish_pending_activations(&self) {
        let pending = self.pending.take();
        for on_complete in pending {
            on_complete();
        }
    }
}

impl HostWindow for FakeWindow {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn show(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        self.hide_calls.set(self.hide_calls.get() + 1);
        self.visible.set(false);
    }

    fn activate(&self, on_complete: Box<dyn FnOnce()>) {
        self.activate_calls.set(self.activate_calls.get() + 1);
        self.visible.set(true);
        if self.defer_activation.get() {
            self.pending.borrow_mut().push(on_complete);
        } else {
            on_complete();
        }
    }
}

/// Host double that records every call the panel makes into it.
pub struct FakeHost {
    pub tree: Rc<ChangesTreeModel>,
    pub window: Rc<FakeWindow>,
    pub window_registered: Cell<bool>,
    pub selected_content: RefCell<Vec<String>>,
    pub focus_requests: RefCell<Vec<FocusTarget>>,
    pub commit_surface_active: Cell<bool>,
    pub contributor: RefCell<Option<Weak<dyn StatusContributor>>>,
    pub reattachments: RefCell<Vec<ToolbarPresentation>>,
    pub shortcuts: RefCell<BTreeMap<String, Vec<String>>>,
    pub message: RefCell<String>,
    pub preview_mode: Cell<PreviewMode>,
    pub preview_closed: Cell<usize>,
    pub refreshes: Cell<usize>,
    pub next_snapshot: RefCell<Option<(Option<CommitId>, Vec<Item>)>>,
}

impl FakeHost {
    pub fn new(tree: Rc<ChangesTreeModel>, window_visible: bool) -> Rc<Self> {
        Rc::new(Self {
            tree,
            window: Rc::new(FakeWindow::new(window_visible)),
            window_registered: Cell::new(true),
            selected_content: RefCell::new(Vec::new()),
            focus_requests: RefCell::new(Vec::new()),
            commit_surface_active: Cell::new(false),
            contributor: RefCell::new(None),
            reattachments: RefCell::new(Vec::new()),
            shortcuts: RefCell::new(BTreeMap::new()),
            message: RefCell::new(String::new()),
            preview_mode: Cell::new(PreviewMode::Hidden),
            preview_closed: Cell::new(0),
            refreshes: Cell::new(0),
            next_snapshot: RefCell::new(None),
        })
    }

    pub fn services(self: &Rc<Self>) -> HostServices {
        HostServices {
            windows: self.clone(),
            contents: self.clone(),
            focus: self.clone(),
            actions: self.clone(),
            status_strip: self.clone(),
            changes_view: self.clone(),
            toolbar: self.clone(),
            shortcuts: self.clone(),
            message_editor: self.clone(),
        }
    }

    pub fn queue_snapshot(&self, commit: Option<CommitId>, items: Vec<Item>) {
        *self.next_snapshot.borrow_mut() = Some((commit, items));
    }

    pub fn status_text(&self) -> Option<String> {
        self.contributor
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|contributor| contributor.status_text())
    }
}

impl HostResolver for FakeHost {
    fn resolve_window(&self, _: &str) -> Option<Rc<dyn HostWindow>> {
        if !self.window_registered.get() {
            return None;
        }
        Some(self.window.clone())
    }
}

impl ContentRegistry for FakeHost {
    fn select_content(&self, id: &str) {
        self.selected_content.borrow_mut().push(id.to_string());
    }
}

impl FocusManager for FakeHost {
    fn request_focus(&self, target: FocusTarget) {
        self.focus_requests.borrow_mut().push(target);
    }
}

impl ActionLayer for FakeHost {
    fn set_commit_surface_active(&self, active: bool) {
        self.commit_surface_active.set(active);
    }
}

impl StatusStrip for FakeHost {
    fn set_contributor(&self, contributor: Option<Weak<dyn StatusContributor>>) {
        *self.contributor.borrow_mut() = contributor;
    }
}

impl ChangesView for FakeHost {
    fn refresh(&self, on_complete: Box<dyn FnOnce()>) {
        self.refreshes.set(self.refreshes.get() + 1);
        let next = self.next_snapshot.borrow_mut().take();
        if let Some((commit, items)) = next {
            self.tree.reload(commit.as_ref(), &items);
        }
        on_complete();
    }

    fn preview_mode(&self) -> PreviewMode {
        self.preview_mode.get()
    }

    fn close_preview(&self) {
        self.preview_closed.set(self.preview_closed.get() + 1);
    }
}

impl ToolbarSurface for FakeHost {
    fn reattach(&self, presentation: &ToolbarPresentation) {
        self.reattachments.borrow_mut().push(*presentation);
    }
}

impl ShortcutRegistry for FakeHost {
    fn register(&self, action_id: &str, shortcuts: &[String]) {
        self.shortcuts
            .borrow_mut()
            .insert(action_id.to_string(), shortcuts.to_vec());
    }

    fn unregister(&self, action_id: &str) {
        self.shortcuts.borrow_mut().remove(action_id);
    }
}

impl MessageEditor for FakeHost {
    fn text(&self) -> String {
        self.message.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.message.borrow_mut() = text.to_string();
    }
}

/// Augmentation that seeds the editor with a message template.
pub struct TemplateAugmentation(pub &'static str);

impl MessageAugmentation for TemplateAugmentation {
    fn id(&self) -> &str {
        "template"
    }

    fn install(&self, editor: &dyn MessageEditor) {
        editor.set_text(self.0);
    }
}

pub struct Panel {
    pub tree: Rc<ChangesTreeModel>,
    pub host: Rc<FakeHost>,
    pub coordinator: Rc<CommitReviewCoordinator>,
}

impl Panel {
    pub fn new(items: &[Item]) -> Self {
        Self::with_config(items, &PanelConfig::default(), false)
    }

    pub fn with_config(items: &[Item], config: &PanelConfig, window_visible: bool) -> Self {
        let tree = Rc::new(ChangesTreeModel::from_items(None, items));
        let host = FakeHost::new(tree.clone(), window_visible);
        let coordinator = CommitReviewCoordinator::new(tree.clone(), host.services(), config, &[]);
        Self {
            tree,
            host,
            coordinator,
        }
    }
}

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("commit-review-{prefix}-{unique}"));
        fs::create_dir_all(&path).expect("temp directory should be created");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
