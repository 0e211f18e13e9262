mod support;

use commit_review::config::PanelConfig;
use commit_review::toolbar::{
    AmbientContext, PopupAnchor, ToolbarOrientation, ToolbarPlacement, ToolbarPresentation,
    resolve_popup_anchor,
};

use support::{Panel, sample_items};

#[test]
fn toolbar_is_attached_once_for_the_configured_orientation() {
    let config = PanelConfig {
        toolbar_horizontal: true,
        ..PanelConfig::default()
    };
    let panel = Panel::with_config(&sample_items(), &config, false);

    let reattachments = panel.host.reattachments.borrow();
    assert_eq!(reattachments.len(), 1);
    assert_eq!(reattachments[0].placement, ToolbarPlacement::StatusStrip);
    assert!(panel.coordinator.is_toolbar_horizontal());
}

#[test]
fn repeated_orientation_change_reparents_once() {
    let panel = Panel::new(&sample_items());
    assert_eq!(panel.host.reattachments.borrow().len(), 1);

    assert!(panel.coordinator.set_toolbar_orientation(true));
    assert!(!panel.coordinator.set_toolbar_orientation(true));

    let reattachments = panel.host.reattachments.borrow();
    assert_eq!(reattachments.len(), 2, "second identical set must not re-parent");
    assert_eq!(
        reattachments[1],
        ToolbarPresentation::for_orientation(ToolbarOrientation::Horizontal)
    );
}

#[test]
fn setting_the_current_orientation_is_a_no_op() {
    let panel = Panel::new(&sample_items());

    assert!(!panel.coordinator.set_toolbar_orientation(false));
    assert_eq!(panel.host.reattachments.borrow().len(), 1);
    assert_eq!(
        panel.coordinator.toolbar_orientation(),
        ToolbarOrientation::Vertical
    );
}

#[test]
fn orientation_picks_placement_and_icon_reservation() {
    let horizontal = ToolbarPresentation::for_orientation(ToolbarOrientation::Horizontal);
    assert_eq!(horizontal.placement, ToolbarPlacement::StatusStrip);
    assert!(!horizontal.reserve_auto_popup_icon);

    let vertical = ToolbarPresentation::for_orientation(ToolbarOrientation::Vertical);
    assert_eq!(
        vertical.placement,
        ToolbarPlacement::BesideContent { border: true }
    );
    assert!(vertical.reserve_auto_popup_icon);
}

#[test]
fn popups_from_the_toolbar_anchor_by_orientation() {
    let ambient = AmbientContext {
        cursor: Some((10, 20)),
        selection: None,
    };

    assert_eq!(
        resolve_popup_anchor(true, true, &ambient),
        PopupAnchor::AboveToolbar
    );
    assert_eq!(
        resolve_popup_anchor(true, false, &ambient),
        PopupAnchor::AbovePanel
    );
}

#[test]
fn other_popups_anchor_at_the_invocation_context() {
    let at_cursor = AmbientContext {
        cursor: Some((10, 20)),
        selection: None,
    };
    assert_eq!(
        resolve_popup_anchor(false, true, &at_cursor),
        PopupAnchor::AtPoint { x: 10, y: 20 }
    );

    let with_selection = AmbientContext {
        cursor: Some((10, 20)),
        selection: Some((3, 4)),
    };
    assert_eq!(
        resolve_popup_anchor(false, false, &with_selection),
        PopupAnchor::AtPoint { x: 3, y: 4 }
    );

    assert_eq!(
        resolve_popup_anchor(false, false, &AmbientContext::default()),
        PopupAnchor::BestPosition
    );
}

#[test]
fn coordinator_popup_anchor_uses_current_orientation() {
    let panel = Panel::new(&sample_items());
    let ambient = AmbientContext::default();

    assert_eq!(
        panel.coordinator.popup_anchor(true, &ambient),
        PopupAnchor::AbovePanel
    );
    panel.coordinator.set_toolbar_orientation(true);
    assert_eq!(
        panel.coordinator.popup_anchor(true, &ambient),
        PopupAnchor::AboveToolbar
    );
}
