#![forbid(unsafe_code)]

//! Declarative panel wrapper.
//!
//! A [`Panel`] lets a consumer describe a panel as data ([`PanelProps`]) and
//! call [`Panel::sync`] once per render. The wrapper creates the managed
//! panel the first time `opened` becomes true, forwards changes of `opened`
//! (edges only, so a dismissal is not undone by a stale `true`), and forgets
//! its handle once the panel has fully closed.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use perch_core::event::NodeId;

use crate::arena::PanelId;
use crate::host::{OverlayHost, TriggerHandle};
use crate::lifecycle::{LifecyclePhase, TransitionConfig};
use crate::manager::{DismissReason, OverlayManager, PanelFlags, PanelNotice, PanelOptions};
use crate::position::{PlacementResult, PositioningRequest};
use crate::stack::CloseOthers;

/// Consumer-facing description of a panel.
#[derive(Debug, Clone)]
pub struct PanelProps {
    pub opened: bool,
    pub position: PositioningRequest,
    pub cancel_on_outside_click: bool,
    pub cancel_on_esc_key: bool,
    pub close_others: CloseOthers,
    pub modal: bool,
    pub locks_scroll: bool,
    pub history_guard: bool,
    pub shake_on_blocked_close: bool,
    pub focus_on_open: bool,
    pub transition: TransitionConfig,
    pub class: Option<Cow<'static, str>>,
    pub hover_close_delay: Option<Duration>,
    pub trigger: Option<Arc<dyn TriggerHandle>>,
}

impl Default for PanelProps {
    fn default() -> Self {
        Self {
            opened: false,
            position: PositioningRequest::centered(),
            cancel_on_outside_click: true,
            cancel_on_esc_key: true,
            close_others: CloseOthers::Never,
            modal: false,
            locks_scroll: false,
            history_guard: false,
            shake_on_blocked_close: false,
            focus_on_open: true,
            transition: TransitionConfig::default(),
            class: None,
            hover_close_delay: None,
            trigger: None,
        }
    }
}

impl PanelProps {
    #[must_use]
    pub fn opened(mut self, opened: bool) -> Self {
        self.opened = opened;
        self
    }

    #[must_use]
    pub fn position(mut self, position: PositioningRequest) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Arc<dyn TriggerHandle>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn flags(&self) -> PanelFlags {
        let mut flags = PanelFlags::empty();
        flags.set(PanelFlags::CANCEL_ON_OUTSIDE_CLICK, self.cancel_on_outside_click);
        flags.set(PanelFlags::CANCEL_ON_ESC_KEY, self.cancel_on_esc_key);
        flags.set(PanelFlags::MODAL, self.modal);
        flags.set(PanelFlags::LOCKS_SCROLL, self.locks_scroll);
        flags.set(PanelFlags::HISTORY_GUARD, self.history_guard);
        flags.set(PanelFlags::SHAKE_ON_BLOCKED_CLOSE, self.shake_on_blocked_close);
        flags.set(PanelFlags::FOCUS_ON_OPEN, self.focus_on_open);
        flags
    }

    fn to_options(&self, root: NodeId) -> PanelOptions {
        PanelOptions {
            root,
            request: self.position,
            flags: self.flags(),
            close_others: self.close_others.clone(),
            class: self.class.clone(),
            transition: self.transition,
            trigger: self.trigger.clone(),
            hover_close_delay: self.hover_close_delay,
        }
    }
}

/// What the consumer should render this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    /// Content must be mounted.
    pub visible: bool,
    pub phase: LifecyclePhase,
    pub placement: Option<PlacementResult>,
    pub scale: f64,
    pub opacity: f64,
}

impl PanelView {
    const HIDDEN: Self = Self {
        visible: false,
        phase: LifecyclePhase::Closed,
        placement: None,
        scale: 1.0,
        opacity: 0.0,
    };
}

/// Declarative handle bound to one root node.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    id: Option<PanelId>,
    last_opened: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Managed panel currently backing this wrapper.
    pub fn id(&self) -> Option<PanelId> {
        self.id
    }

    /// Reconcile `props` with the manager and report what to render.
    pub fn sync<H: OverlayHost + ?Sized>(
        &mut self,
        manager: &mut OverlayManager,
        host: &mut H,
        root: NodeId,
        props: &PanelProps,
    ) -> PanelView {
        if let Some(id) = self.id
            && !manager.contains(id)
        {
            self.id = None;
        }

        if props.opened != self.last_opened {
            self.last_opened = props.opened;
            match (self.id, props.opened) {
                (None, true) => {
                    self.id = Some(manager.open_panel(host, props.to_options(root)));
                }
                (Some(id), opened) => {
                    // Handle was checked above; a failure only means it just closed.
                    if manager.set_opened(host, id, opened).is_err() {
                        self.id = None;
                    }
                }
                (None, false) => {}
            }
        }

        let Some(id) = self.id else {
            return PanelView::HIDDEN;
        };
        if let Err(err) = manager.update_request(id, props.position) {
            tracing::trace!(%err, "panel closed during sync");
            self.id = None;
            return PanelView::HIDDEN;
        }

        let placement = manager.resolve_placement(&*host, id).ok().flatten();
        match manager.lifecycle(id) {
            Some(lifecycle) => PanelView {
                visible: lifecycle.phase().is_mounted(),
                phase: lifecycle.phase(),
                placement,
                scale: lifecycle.current_scale(),
                opacity: lifecycle.current_opacity(),
            },
            None => {
                self.id = None;
                PanelView::HIDDEN
            }
        }
    }

    /// Scan notices for ones about this panel.
    ///
    /// Returns the reason if the panel was dismissed, so the consumer can set
    /// its own `opened` to false; it stays closed until `opened` goes false
    /// and then true again. Drops the handle on `Closed`.
    pub fn apply_notices(&mut self, notices: &[PanelNotice]) -> Option<DismissReason> {
        let id = self.id?;
        let mut dismissed = None;
        for notice in notices.iter().filter(|notice| notice.id() == id) {
            match *notice {
                PanelNotice::Dismissed { reason, .. } => dismissed = Some(reason),
                PanelNotice::Closed(_) => self.id = None,
                _ => {}
            }
        }
        dismissed
    }
}
