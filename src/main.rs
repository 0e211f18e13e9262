use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use anyhow::Result;
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use commit_review::CommitReviewCoordinator;
use commit_review::config::{ConfigStore, PanelConfig};
use commit_review::git::load_snapshot;
use commit_review::host::{
    ActionLayer, ChangesView, ContentRegistry, FocusManager, FocusTarget, HostResolver,
    HostServices, HostWindow, MessageEditor, PreviewMode, ShortcutRegistry, StatusContributor,
    StatusStrip, ToolbarSurface,
};
use commit_review::state::{PanelState, PanelStateStore};
use commit_review::toolbar::ToolbarPresentation;
use commit_review::tree::ChangesTreeModel;

fn main() -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let repo_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    run(&repo_dir)
}

fn run(repo_dir: &Path) -> Result<()> {
    let config = load_panel_config();
    let snapshot = load_snapshot(repo_dir)?;
    let repo_root = snapshot.root.clone();

    let tree = Rc::new(ChangesTreeModel::from_items(None, &snapshot.items));
    let host = Rc::new(HeadlessHost::new(repo_root.clone(), tree.clone()));
    let coordinator = CommitReviewCoordinator::new(tree, host.services(), &config, &[]);

    let state_store = match PanelStateStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            error!("failed to initialize state path: {err:#}");
            None
        }
    };
    let saved = state_store.as_ref().and_then(|store| {
        store
            .load_for(&repo_root)
            .inspect_err(|err| {
                error!(
                    "failed to load panel state from {}: {err:#}",
                    store.path().display()
                )
            })
            .ok()
            .flatten()
    });

    coordinator.restore_state(saved.as_ref());

    if !coordinator.activate() {
        warn!("commit panel could not be activated");
    }

    println!("{}", coordinator.status_text());
    for item in coordinator.included_items() {
        println!("  {item}");
    }

    if let Some(store) = &state_store {
        let state = PanelState::capture(&coordinator.commit_message(), &coordinator.included_items());
        if let Err(err) = store.save_for(&repo_root, state) {
            error!(
                "failed to save panel state to {}: {err:#}",
                store.path().display()
            );
        }
    }

    coordinator.deactivate(true);
    coordinator.dispose();
    Ok(())
}

fn load_panel_config() -> PanelConfig {
    let store = match ConfigStore::new() {
        Ok(store) => store,
        Err(err) => {
            error!("failed to initialize config path: {err:#}");
            return PanelConfig::default();
        }
    };

    match store.load_or_create_default() {
        Ok(config) => config,
        Err(err) => {
            error!(
                "failed to load panel config from {}: {err:#}",
                store.path().display()
            );
            PanelConfig::default()
        }
    }
}

/// Stand-in shell for running the panel without a window system.
struct HeadlessHost {
    repo_root: PathBuf,
    tree: Rc<ChangesTreeModel>,
    window: Rc<HeadlessWindow>,
    message: RefCell<String>,
    contributor: RefCell<Option<Weak<dyn StatusContributor>>>,
}

struct HeadlessWindow {
    visible: Cell<bool>,
}

impl HeadlessHost {
    fn new(repo_root: PathBuf, tree: Rc<ChangesTreeModel>) -> Self {
        Self {
            repo_root,
            tree,
            window: Rc::new(HeadlessWindow {
                visible: Cell::new(false),
            }),
            message: RefCell::new(String::new()),
            contributor: RefCell::new(None),
        }
    }

    fn services(self: &Rc<Self>) -> HostServices {
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
}

impl HostWindow for HeadlessWindow {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn show(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        self.visible.set(false);
    }

    fn activate(&self, on_complete: Box<dyn FnOnce()>) {
        self.visible.set(true);
        on_complete();
    }
}

impl HostResolver for HeadlessHost {
    fn resolve_window(&self, _: &str) -> Option<Rc<dyn HostWindow>> {
        Some(self.window.clone())
    }
}

impl ContentRegistry for HeadlessHost {
    fn select_content(&self, id: &str) {
        debug!(id, "content selected");
    }
}

impl FocusManager for HeadlessHost {
    fn request_focus(&self, target: FocusTarget) {
        debug!(?target, "focus requested");
    }
}

impl ActionLayer for HeadlessHost {
    fn set_commit_surface_active(&self, active: bool) {
        debug!(active, "commit surface toggled");
    }
}

impl StatusStrip for HeadlessHost {
    fn set_contributor(&self, contributor: Option<Weak<dyn StatusContributor>>) {
        *self.contributor.borrow_mut() = contributor;
    }
}

impl ChangesView for HeadlessHost {
    fn refresh(&self, on_complete: Box<dyn FnOnce()>) {
        match load_snapshot(&self.repo_root) {
            Ok(snapshot) => self.tree.reload(None, &snapshot.items),
            Err(err) => error!("failed to refresh changes: {err:#}"),
        }
        on_complete();
    }

    fn preview_mode(&self) -> PreviewMode {
        PreviewMode::Hidden
    }

    fn close_preview(&self) {}
}

impl ToolbarSurface for HeadlessHost {
    fn reattach(&self, presentation: &ToolbarPresentation) {
        debug!(?presentation, "toolbar attached");
    }
}

impl ShortcutRegistry for HeadlessHost {
    fn register(&self, action_id: &str, shortcuts: &[String]) {
        debug!(action_id, ?shortcuts, "shortcuts registered");
    }

    fn unregister(&self, action_id: &str) {
        debug!(action_id, "shortcuts unregistered");
    }
}

impl MessageEditor for HeadlessHost {
    fn text(&self) -> String {
        self.message.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.message.borrow_mut() = text.to_string();
    }
}
