use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::host::ToolbarSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarOrientation {
    Horizontal,
    Vertical,
}

impl ToolbarOrientation {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarPlacement {
    /// Inside the dedicated status strip under the message editor.
    StatusStrip,
    /// Directly beside the main content, separated by a visible border.
    BesideContent { border: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarPresentation {
    pub orientation: ToolbarOrientation,
    pub placement: ToolbarPlacement,
    pub reserve_auto_popup_icon: bool,
}

impl ToolbarPresentation {
    pub fn for_orientation(orientation: ToolbarOrientation) -> Self {
        match orientation {
            ToolbarOrientation::Horizontal => Self {
                orientation,
                placement: ToolbarPlacement::StatusStrip,
                reserve_auto_popup_icon: false,
            },
            ToolbarOrientation::Vertical => Self {
                orientation,
                placement: ToolbarPlacement::BesideContent { border: true },
                reserve_auto_popup_icon: true,
            },
        }
    }
}

/// Where a popup opened from the panel should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAnchor {
    AboveToolbar,
    AbovePanel,
    AtPoint { x: i32, y: i32 },
    /// No usable location in the invocation; the host picks one.
    BestPosition,
}

/// Whatever the host knows about where an action was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmbientContext {
    pub cursor: Option<(i32, i32)>,
    pub selection: Option<(i32, i32)>,
}

pub fn resolve_popup_anchor(
    triggered_from_toolbar: bool,
    horizontal: bool,
    ambient: &AmbientContext,
) -> PopupAnchor {
    if triggered_from_toolbar {
        return if horizontal {
            PopupAnchor::AboveToolbar
        } else {
            PopupAnchor::AbovePanel
        };
    }

    match ambient.selection.or(ambient.cursor) {
        Some((x, y)) => PopupAnchor::AtPoint { x, y },
        None => PopupAnchor::BestPosition,
    }
}

pub struct ToolbarLayoutManager {
    surface: Rc<dyn ToolbarSurface>,
    orientation: Cell<ToolbarOrientation>,
}

impl ToolbarLayoutManager {
    /// Attaches the toolbar for the initial orientation right away.
    pub fn new(surface: Rc<dyn ToolbarSurface>, orientation: ToolbarOrientation) -> Self {
        surface.reattach(&ToolbarPresentation::for_orientation(orientation));
        Self {
            surface,
            orientation: Cell::new(orientation),
        }
    }

    pub fn orientation(&self) -> ToolbarOrientation {
        self.orientation.get()
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation.get().is_horizontal()
    }

    /// Returns whether the toolbar moved.
    pub fn set_orientation(&self, horizontal: bool) -> bool {
        let orientation = ToolbarOrientation::from_horizontal(horizontal);
        if self.orientation.get() == orientation {
            return false;
        }

        self.orientation.set(orientation);
        let presentation = ToolbarPresentation::for_orientation(orientation);
        debug!(?presentation, "re-parenting commit toolbar");
        self.surface.reattach(&presentation);
        true
    }

    pub fn popup_anchor(&self, triggered_from_toolbar: bool, ambient: &AmbientContext) -> PopupAnchor {
        resolve_popup_anchor(triggered_from_toolbar, self.is_horizontal(), ambient)
    }
}
