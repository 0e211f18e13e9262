//! Capabilities the surrounding shell lends to the panel.
//!
//! The panel never looks these up globally. Everything arrives through
//! [`HostServices`] at construction so a test can hand in fakes.

use std::rc::{Rc, Weak};

use crate::toolbar::ToolbarPresentation;

/// Identifier under which the host registers the window that hosts the panel.
pub const COMMIT_TOOL_WINDOW_ID: &str = "Commit";
/// Identifier of the panel's content inside the host's content registry.
pub const COMMIT_CONTENT_ID: &str = "commit-review";
/// Action the commit shortcuts are bound to.
pub const COMMIT_ACTION_ID: &str = "commit-review.commit";

pub trait HostWindow {
    fn is_visible(&self) -> bool;
    fn show(&self);
    fn hide(&self);
    /// Brings the window forward and runs `on_complete` once it is.
    fn activate(&self, on_complete: Box<dyn FnOnce()>);
}

pub trait HostResolver {
    fn resolve_window(&self, id: &str) -> Option<Rc<dyn HostWindow>>;
}

pub trait ContentRegistry {
    fn select_content(&self, id: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    CommitMessage,
    ChangesTree,
}

pub trait FocusManager {
    fn request_focus(&self, target: FocusTarget);
}

/// The shell's action layer, told which surface currently owns commit actions.
pub trait ActionLayer {
    fn set_commit_surface_active(&self, active: bool);
}

pub trait StatusContributor {
    fn status_text(&self) -> String;
}

/// Status area owned by the host. It only keeps a weak handle to whoever
/// contributes to it; the host outlives every panel.
pub trait StatusStrip {
    fn set_contributor(&self, contributor: Option<Weak<dyn StatusContributor>>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    Hidden,
    /// Preview docked inside the changes view.
    Embedded,
    /// Preview opened as an editor tab for whatever change is selected.
    EditorForSelection,
}

pub trait ChangesView {
    /// Schedules a rebuild of the changes tree; `on_complete` runs afterwards.
    fn refresh(&self, on_complete: Box<dyn FnOnce()>);
    fn preview_mode(&self) -> PreviewMode;
    fn close_preview(&self);
}

/// Host side of the relocatable toolbar.
pub trait ToolbarSurface {
    /// Moves the toolbar to `presentation.placement`, detaching it from its
    /// previous parent in the same step.
    fn reattach(&self, presentation: &ToolbarPresentation);
}

pub trait ShortcutRegistry {
    /// Binds `shortcuts` to `action_id` over the whole panel surface.
    fn register(&self, action_id: &str, shortcuts: &[String]);
    fn unregister(&self, action_id: &str);
}

pub trait MessageEditor {
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
}

/// Extension hooked into the commit message editor when the panel is built.
pub trait MessageAugmentation {
    fn id(&self) -> &str;
    fn install(&self, editor: &dyn MessageEditor);
}

#[derive(Clone)]
pub struct HostServices {
    pub windows: Rc<dyn HostResolver>,
    pub contents: Rc<dyn ContentRegistry>,
    pub focus: Rc<dyn FocusManager>,
    pub actions: Rc<dyn ActionLayer>,
    pub status_strip: Rc<dyn StatusStrip>,
    pub changes_view: Rc<dyn ChangesView>,
    pub toolbar: Rc<dyn ToolbarSurface>,
    pub shortcuts: Rc<dyn ShortcutRegistry>,
    pub message_editor: Rc<dyn MessageEditor>,
}
