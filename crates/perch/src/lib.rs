#![forbid(unsafe_code)]

//! Perch public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and offers a
//! prelude for day-to-day usage.
//!
//! ```
//! use perch::prelude::*;
//!
//! let root = NodeId(1);
//! let mut host = MemoryHost::new(Size::new(800.0, 600.0)).with_node(root, Size::new(200.0, 100.0));
//! let mut overlays = OverlayManager::default();
//!
//! let trigger = Rect::new(100.0, 100.0, 50.0, 20.0);
//! let options = PanelOptions::new(root)
//!     .request(PositioningRequest::below(trigger).fit_to_screen(true))
//!     .transition(TransitionConfig::none());
//! let id = overlays.open_panel(&mut host, options);
//!
//! let placement = overlays.resolve_placement(&host, id)?.expect("laid out");
//! assert_eq!((placement.top, placement.left), (120.0, 100.0));
//! # Ok::<(), perch::OverlayError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use perch_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, NodeId, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use perch_core::geometry::{Point, Rect, Scale, Size};

// --- Overlay re-exports ----------------------------------------------------

pub use perch_overlay::{
    CloseOthers, DismissReason, HorizontalAlign, LifecyclePhase, MemoryHost, OverlayConfig,
    OverlayError, OverlayHost, OverlayManager, Panel, PanelFlags, PanelId, PanelNotice,
    PanelOptions, PanelProps, PanelView, PlacementResult, PositionMode, PositioningRequest,
    RectTrigger, Result, Target, TransitionConfig, TriggerHandle, VerticalAlign,
};

#[cfg(feature = "tracing-subscriber")]
pub use perch_core::logging::init_tracing;

/// Prelude for overlay hosts.
pub mod prelude {
    pub use crate::{
        CloseOthers, DismissReason, Event, HorizontalAlign, KeyCode, KeyEvent, LifecyclePhase,
        MemoryHost, NodeId, OverlayConfig, OverlayHost, OverlayManager, Panel, PanelNotice,
        PanelOptions, PanelProps, PlacementResult, Point, PointerEvent, PositioningRequest, Rect,
        Size, TransitionConfig, TriggerHandle, VerticalAlign,
    };

    pub use crate::{core, overlay};
}

pub use perch_core as core;
pub use perch_overlay as overlay;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use web_time::Instant;

    #[test]
    fn prelude_drives_a_declarative_panel() {
        let root = NodeId(7);
        let mut host =
            MemoryHost::new(Size::new(640.0, 480.0)).with_node(root, Size::new(100.0, 50.0));
        let mut overlays = OverlayManager::default();
        let mut panel = Panel::new();
        let props = PanelProps::default()
            .opened(true)
            .transition(TransitionConfig::none());

        let view = panel.sync(&mut overlays, &mut host, root, &props);
        assert!(view.visible);
        assert_eq!(view.phase, LifecyclePhase::Open);

        let escape = Event::Key(KeyEvent::new(KeyCode::Escape));
        let notices = overlays.handle_event(&mut host, &escape, Instant::now());
        assert_eq!(panel.apply_notices(&notices), Some(DismissReason::EscapeKey));
    }
}
