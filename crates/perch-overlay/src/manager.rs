#![forbid(unsafe_code)]

//! Overlay manager: owns every panel and the state shared between them.
//!
//! One manager instance replaces what would otherwise be ambient globals: the
//! stack registry, the scroll-lock count, and the history guard. Hosts create
//! as many managers as they have isolated overlay layers and pass their
//! [`OverlayHost`] into each call.
//!
//! # Event flow
//!
//! ```text
//! open_panel / set_opened ─┐
//! transition_finished ─────┼─▶ PanelLifecycle::dispatch ─▶ effects ─▶ registry
//! tick ────────────────────┘                                        ─▶ scroll lock
//!                                                                   ─▶ history
//! handle_event ─▶ arbitration ─▶ dismiss ─▶ (same path)             ─▶ broadcast
//! ```
//!
//! Everything is synchronous and depth-first: opening a panel that closes
//! another through a broadcast also releases that panel's scroll lock before
//! `open_panel` returns.
//!
//! # Invariants
//!
//! - A panel is in the registry iff its phase is not `Closed`.
//! - The scroll-lock count equals the number of mounted panels with
//!   [`PanelFlags::LOCKS_SCROLL`].
//! - A panel's arena slot is freed exactly when it returns to `Closed`; its
//!   [`PanelId`] resolves to nothing afterwards.
//! - Timer deadlines live on the panel they belong to, so a closed panel can
//!   never receive a late hover-close or shake reset.
//!
//! # Failure Modes
//!
//! - Mutating calls on unknown handles return [`OverlayError::UnknownPanel`];
//!   queries answer `false` / `Closed`.
//! - A click whose target is unknown or detached counts as outside.
//! - Missing measurements keep the last good placement.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use bitflags::bitflags;
use perch_core::event::{Event, NodeId, PointerEvent, PointerEventKind};
use web_time::Instant;

use crate::arena::{PanelArena, PanelId};
use crate::config::OverlayConfig;
use crate::error::{OverlayError, Result};
use crate::guard::{HistoryGuard, ScrollLock};
use crate::host::{OverlayHost, TriggerHandle};
use crate::lifecycle::{
    LifecycleEffect, LifecycleEvent, LifecyclePhase, LifecycleStep, PanelLifecycle,
    TransitionConfig,
};
use crate::position::{PanelMetrics, PlacementResult, PositioningRequest, Target, resolve};
use crate::stack::{CloseOthers, StackEntry, StackRegistry};

// ============================================================================
// Options
// ============================================================================

bitflags! {
    /// Behavior switches fixed when a panel is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PanelFlags: u16 {
        /// Close on a pointer press outside the panel and its trigger.
        const CANCEL_ON_OUTSIDE_CLICK = 1 << 0;
        /// Close on Escape.
        const CANCEL_ON_ESC_KEY = 1 << 1;
        /// Shield panels beneath from outside-click dismissal.
        const MODAL = 1 << 2;
        /// Hold the document scroll lock while mounted.
        const LOCKS_SCROLL = 1 << 3;
        /// Push a history entry on open; back navigation closes the panel.
        const HISTORY_GUARD = 1 << 4;
        /// Emit a shake notice when a dismissal gesture is refused.
        const SHAKE_ON_BLOCKED_CLOSE = 1 << 5;
        /// Focus the panel root once it is fully open.
        const FOCUS_ON_OPEN = 1 << 6;
    }
}

impl Default for PanelFlags {
    fn default() -> Self {
        Self::CANCEL_ON_OUTSIDE_CLICK | Self::CANCEL_ON_ESC_KEY | Self::FOCUS_ON_OPEN
    }
}

/// Everything needed to create a panel.
#[derive(Debug, Clone)]
pub struct PanelOptions {
    /// Host node the panel content is rendered into.
    pub root: NodeId,
    pub request: PositioningRequest,
    pub flags: PanelFlags,
    pub close_others: CloseOthers,
    /// Class matched by other panels' [`CloseOthers::Class`].
    pub class: Option<Cow<'static, str>>,
    pub transition: TransitionConfig,
    pub trigger: Option<Arc<dyn TriggerHandle>>,
    /// Close this long after the pointer leaves panel and trigger.
    pub hover_close_delay: Option<Duration>,
}

impl PanelOptions {
    /// Centered panel with default flags and transition.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            request: PositioningRequest::centered(),
            flags: PanelFlags::default(),
            close_others: CloseOthers::Never,
            class: None,
            transition: TransitionConfig::default(),
            trigger: None,
            hover_close_delay: None,
        }
    }

    #[must_use]
    pub fn request(mut self, request: PositioningRequest) -> Self {
        self.request = request;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: PanelFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn modal(mut self, modal: bool) -> Self {
        self.flags.set(PanelFlags::MODAL, modal);
        self
    }

    #[must_use]
    pub fn locks_scroll(mut self, locks: bool) -> Self {
        self.flags.set(PanelFlags::LOCKS_SCROLL, locks);
        self
    }

    #[must_use]
    pub fn history_guard(mut self, enabled: bool) -> Self {
        self.flags.set(PanelFlags::HISTORY_GUARD, enabled);
        self
    }

    #[must_use]
    pub fn close_others(mut self, close_others: CloseOthers) -> Self {
        self.close_others = close_others;
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<Cow<'static, str>>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: impl TriggerHandle + 'static) -> Self {
        let trigger: Arc<dyn TriggerHandle> = Arc::new(trigger);
        self.trigger = Some(trigger);
        self
    }

    /// Share a trigger that is also registered elsewhere.
    #[must_use]
    pub fn shared_trigger(mut self, trigger: Arc<dyn TriggerHandle>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn hover_close_delay(mut self, delay: Duration) -> Self {
        self.hover_close_delay = Some(delay);
        self
    }
}

// ============================================================================
// Notices
// ============================================================================

/// Why a panel was closed by something other than its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    OutsideClick,
    EscapeKey,
    /// Another panel opened and this one declared `close_others`.
    OtherOpened,
    HistoryBack,
    HoverLeave,
    Explicit,
}

impl DismissReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutsideClick => "outside_click",
            Self::EscapeKey => "escape_key",
            Self::OtherOpened => "other_opened",
            Self::HistoryBack => "history_back",
            Self::HoverLeave => "hover_leave",
            Self::Explicit => "explicit",
        }
    }
}

/// Something consumers may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelNotice {
    /// The panel left `Closed` and is now rendered.
    Mounted(PanelId),
    /// The panel reached `Open`.
    Opened(PanelId),
    /// The panel returned to `Closed`; its handle is now stale.
    Closed(PanelId),
    /// The panel's intent was flipped to closed on the consumer's behalf.
    Dismissed { id: PanelId, reason: DismissReason },
    /// A dismissal gesture was refused.
    Shake(PanelId),
    ShakeEnded(PanelId),
    /// A layout change moved the panel.
    Repositioned {
        id: PanelId,
        placement: PlacementResult,
    },
}

impl PanelNotice {
    /// The panel the notice is about.
    pub fn id(&self) -> PanelId {
        match *self {
            Self::Mounted(id)
            | Self::Opened(id)
            | Self::Closed(id)
            | Self::Shake(id)
            | Self::ShakeEnded(id)
            | Self::Dismissed { id, .. }
            | Self::Repositioned { id, .. } => id,
        }
    }
}

// ============================================================================
// Per-panel state
// ============================================================================

#[derive(Debug)]
struct PanelState {
    root: NodeId,
    request: PositioningRequest,
    flags: PanelFlags,
    close_others: CloseOthers,
    class: Option<Cow<'static, str>>,
    trigger: Option<Arc<dyn TriggerHandle>>,
    hover_close_delay: Option<Duration>,
    lifecycle: PanelLifecycle,
    /// Last good placement.
    placement: Option<PlacementResult>,
    hover_deadline: Option<Instant>,
    shake_deadline: Option<Instant>,
}

impl PanelState {
    /// Whether an event dispatched to `node` landed on the panel or its trigger.
    fn is_hit<H: OverlayHost + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        if host.contains(self.root, node) {
            return true;
        }
        self.trigger.as_ref().is_some_and(|trigger| {
            trigger.contains(node)
                || trigger
                    .node()
                    .is_some_and(|trigger_node| host.contains(trigger_node, node))
        })
    }

    fn is_hover_boundary(&self, node: NodeId) -> bool {
        node == self.root
            || self
                .trigger
                .as_ref()
                .is_some_and(|trigger| trigger.node() == Some(node))
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Owner of all panels in one overlay layer.
#[derive(Debug)]
pub struct OverlayManager {
    config: OverlayConfig,
    panels: PanelArena<PanelState>,
    registry: StackRegistry,
    scroll_lock: ScrollLock,
    history: HistoryGuard,
    roots: AHashMap<NodeId, PanelId>,
    notices: Vec<PanelNotice>,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl OverlayManager {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config: config.validated(),
            panels: PanelArena::new(),
            registry: StackRegistry::new(),
            scroll_lock: ScrollLock::new(),
            history: HistoryGuard::new(),
            roots: AHashMap::new(),
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Open / close
    // ------------------------------------------------------------------------

    /// Create a panel and set its intent to open.
    ///
    /// If `options.root` already belongs to a live panel (typically one that
    /// is still exiting), that panel is re-opened instead: its request and
    /// trigger are refreshed and the remaining options are ignored.
    ///
    /// Notices produced here (including panels closed by the broadcast) are
    /// queued and returned by the next [`handle_event`](Self::handle_event),
    /// [`tick`](Self::tick), or [`drain_notices`](Self::drain_notices).
    pub fn open_panel<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        options: PanelOptions,
    ) -> PanelId {
        if let Some(&id) = self.roots.get(&options.root)
            && let Some(state) = self.panels.get_mut(id)
        {
            tracing::debug!(panel = %id, root = options.root.get(), "re-opening live panel");
            state.request = options.request;
            if options.trigger.is_some() {
                state.trigger = options.trigger;
            }
            self.dispatch(host, id, LifecycleEvent::IntentChanged(true));
            return id;
        }

        let transition = if self.config.reduced_motion {
            TransitionConfig::none()
        } else {
            options.transition
        };
        let hover_close_delay = options.hover_close_delay.or(self.config.hover_close_delay);
        let root = options.root;
        let flags = options.flags;
        let id = self.panels.insert_with(|_| PanelState {
            root,
            request: options.request,
            flags,
            close_others: options.close_others,
            class: options.class,
            trigger: options.trigger,
            hover_close_delay,
            lifecycle: PanelLifecycle::new(transition),
            placement: None,
            hover_deadline: None,
            shake_deadline: None,
        });
        self.roots.insert(root, id);
        tracing::debug!(panel = %id, root = root.get(), flags = flags.bits(), "panel created");

        self.dispatch(host, id, LifecycleEvent::IntentChanged(true));
        id
    }

    /// Set the panel's intent to closed.
    pub fn close_panel<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) -> Result<()> {
        self.set_opened(host, id, false)
    }

    /// Forward the consumer's `opened` intent.
    pub fn set_opened<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PanelId,
        opened: bool,
    ) -> Result<()> {
        if !self.panels.contains(id) {
            return Err(OverlayError::UnknownPanel(id));
        }
        self.dispatch(host, id, LifecycleEvent::IntentChanged(opened));
        Ok(())
    }

    /// Report that the transition started at `epoch` finished.
    ///
    /// Returns `false` when the signal was stale (old epoch, wrong direction,
    /// or a panel that has already closed).
    pub fn transition_finished<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PanelId,
        epoch: u64,
    ) -> bool {
        self.dispatch(host, id, LifecycleEvent::TransitionFinished { epoch })
    }

    /// Close a panel on the consumer's behalf.
    ///
    /// Outside-click and Escape reasons honor the panel's flags unless
    /// `force` is set; a refused dismissal shakes the panel if it asked for
    /// that. Returns whether the panel's intent changed.
    pub fn request_dismiss<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PanelId,
        reason: DismissReason,
        force: bool,
        now: Instant,
    ) -> Result<bool> {
        let state = self.panels.get(id).ok_or(OverlayError::UnknownPanel(id))?;
        let allowed = force
            || match reason {
                DismissReason::OutsideClick => {
                    state.flags.contains(PanelFlags::CANCEL_ON_OUTSIDE_CLICK)
                }
                DismissReason::EscapeKey => state.flags.contains(PanelFlags::CANCEL_ON_ESC_KEY),
                _ => true,
            };
        if !allowed {
            if state.flags.contains(PanelFlags::SHAKE_ON_BLOCKED_CLOSE) {
                self.shake(id, now);
            }
            return Ok(false);
        }
        Ok(self.dismiss(host, id, reason))
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    /// Resolve the panel's placement against the host's current geometry.
    ///
    /// The target rectangle is refreshed from the trigger first. When the
    /// panel is not laid out yet the last good placement is returned.
    pub fn resolve_placement<H: OverlayHost + ?Sized>(
        &mut self,
        host: &H,
        id: PanelId,
    ) -> Result<Option<PlacementResult>> {
        let min_gap = self.config.min_screen_gap;
        // Live slots are always mounted; the slot is freed on unmount.
        let state = self.panels.get_mut(id).ok_or(OverlayError::UnknownPanel(id))?;

        if matches!(state.request.target, Target::Rect(_))
            && let Some(rect) = state.trigger.as_ref().and_then(|trigger| trigger.bounding_box())
        {
            state.request.target = Target::Rect(rect);
        }

        let Some(size) = host.measure(state.root) else {
            tracing::trace!(panel = %id, "panel not laid out; keeping last placement");
            return Ok(state.placement);
        };
        let metrics = PanelMetrics::new(size).with_scale(host.scale_of(state.root));
        match resolve(
            metrics,
            host.viewport(),
            host.scroll_offset(),
            &state.request,
            min_gap,
        ) {
            Some(placement) => {
                state.placement = Some(placement);
                Ok(Some(placement))
            }
            None => Ok(state.placement),
        }
    }

    /// Replace the positioning request; takes effect on the next resolve.
    pub fn update_request(&mut self, id: PanelId, request: PositioningRequest) -> Result<()> {
        let state = self.panels.get_mut(id).ok_or(OverlayError::UnknownPanel(id))?;
        state.request = request;
        Ok(())
    }

    /// Last good placement, without re-resolving.
    pub fn placement(&self, id: PanelId) -> Option<PlacementResult> {
        self.panels.get(id).and_then(|state| state.placement)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.contains(id)
    }

    /// Number of live (mounted) panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn is_topmost(&self, id: PanelId) -> bool {
        self.registry.is_topmost(id)
    }

    pub fn is_shielded(&self, id: PanelId) -> bool {
        self.registry.is_shielded(id)
    }

    /// Current phase; closed (destroyed) panels report `Closed`.
    pub fn phase(&self, id: PanelId) -> LifecyclePhase {
        self.panels
            .get(id)
            .map_or(LifecyclePhase::Closed, |state| state.lifecycle.phase())
    }

    pub fn epoch(&self, id: PanelId) -> Result<u64> {
        self.panels
            .get(id)
            .map(|state| state.lifecycle.epoch())
            .ok_or(OverlayError::UnknownPanel(id))
    }

    /// Latest open intent.
    pub fn is_opened(&self, id: PanelId) -> bool {
        self.panels
            .get(id)
            .is_some_and(|state| state.lifecycle.opened())
    }

    /// Lifecycle details (progress, scale, opacity) for rendering.
    pub fn lifecycle(&self, id: PanelId) -> Option<&PanelLifecycle> {
        self.panels.get(id).map(|state| &state.lifecycle)
    }

    pub fn is_shaking(&self, id: PanelId) -> bool {
        self.panels
            .get(id)
            .is_some_and(|state| state.shake_deadline.is_some())
    }

    /// The live panel rendered into `root`, if any.
    pub fn panel_for_root(&self, root: NodeId) -> Option<PanelId> {
        self.roots
            .get(&root)
            .copied()
            .filter(|id| self.panels.contains(*id))
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked()
    }

    pub fn scroll_lock_count(&self) -> usize {
        self.scroll_lock.count()
    }

    /// Outstanding history entries owned by open panels.
    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    pub fn registry(&self) -> &StackRegistry {
        &self.registry
    }

    /// Take every queued notice.
    pub fn drain_notices(&mut self) -> Vec<PanelNotice> {
        std::mem::take(&mut self.notices)
    }

    // ------------------------------------------------------------------------
    // Events and time
    // ------------------------------------------------------------------------

    /// Route one host event and return the notices it produced.
    pub fn handle_event<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &Event,
        now: Instant,
    ) -> Vec<PanelNotice> {
        match event {
            Event::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Down(_) => {
                    self.arbitrate(host, pointer.target, DismissReason::OutsideClick, now);
                }
                PointerEventKind::Enter | PointerEventKind::Leave => {
                    self.track_hover(pointer, now);
                }
                PointerEventKind::Up(_) | PointerEventKind::Moved => {}
            },
            Event::Key(key) if key.is_escape_press() => {
                self.arbitrate(host, None, DismissReason::EscapeKey, now);
            }
            Event::Key(_) => {}
            Event::PopState => {
                if let Some(id) = self.history.on_pop_state() {
                    self.dismiss(host, id, DismissReason::HistoryBack);
                }
            }
            Event::Resize(_) => {
                for id in self.live_ids() {
                    self.reposition(&*host, id);
                }
            }
            Event::ContentResized(node) => {
                for id in self.live_ids() {
                    let affected = self
                        .panels
                        .get(id)
                        .is_some_and(|state| state.is_hit(&*host, *node));
                    if affected {
                        self.reposition(&*host, id);
                    }
                }
            }
        }
        self.drain_notices()
    }

    /// Advance transitions by `delta` and fire deadlines due at `now`.
    pub fn tick<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        delta: Duration,
        now: Instant,
    ) -> Vec<PanelNotice> {
        for id in self.live_ids() {
            let step = self
                .panels
                .get_mut(id)
                .and_then(|state| state.lifecycle.tick(delta));
            if let Some(step) = step {
                self.apply_step(host, id, &step);
            }
        }

        for id in self.live_ids() {
            let Some(state) = self.panels.get_mut(id) else {
                continue;
            };
            if state.shake_deadline.is_some_and(|deadline| deadline <= now) {
                state.shake_deadline = None;
                self.notices.push(PanelNotice::ShakeEnded(id));
            }
            if state.hover_deadline.is_some_and(|deadline| deadline <= now) {
                state.hover_deadline = None;
                tracing::debug!(panel = %id, "hover-close delay elapsed");
                self.dismiss(host, id, DismissReason::HoverLeave);
            }
        }
        self.drain_notices()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn live_ids(&self) -> Vec<PanelId> {
        self.panels.iter().map(|(id, _)| id).collect()
    }

    /// Feed one lifecycle event and perform the resulting effects.
    ///
    /// Returns `false` for unknown panels and stale signals.
    fn dispatch<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PanelId,
        event: LifecycleEvent,
    ) -> bool {
        let Some(state) = self.panels.get_mut(id) else {
            tracing::trace!(panel = %id, ?event, "lifecycle event for closed panel");
            return false;
        };
        if !matches!(event, LifecycleEvent::TransitionFinished { .. }) {
            state.hover_deadline = None;
        }
        let step = state.lifecycle.dispatch(event);
        self.apply_step(host, id, &step);
        !step.stale
    }

    fn apply_step<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId, step: &LifecycleStep) {
        for effect in &step.effects {
            match *effect {
                LifecycleEffect::Mount => self.on_mount(host, id),
                LifecycleEffect::Reentered => self.on_reentered(host, id),
                LifecycleEffect::Settled => self.on_settled(host, id),
                LifecycleEffect::Unmount => self.on_unmount(host, id),
            }
        }
    }

    fn on_mount<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) {
        let Some(state) = self.panels.get(id) else {
            return;
        };
        let flags = state.flags;
        let entry = StackEntry::new(id)
            .modal(flags.contains(PanelFlags::MODAL))
            .close_others(state.close_others.clone())
            .class(state.class.clone());
        self.registry.push(entry);

        if flags.contains(PanelFlags::LOCKS_SCROLL) && self.scroll_lock.acquire() {
            tracing::debug!(panel = %id, "document scroll locked");
            host.set_scroll_locked(true);
        }
        if flags.contains(PanelFlags::HISTORY_GUARD) {
            self.history.push(id);
            host.push_history_entry(id);
        }
        self.notices.push(PanelNotice::Mounted(id));
        self.broadcast_opened(host, id);
    }

    /// An exiting panel was re-opened. It kept its registry slot and scroll
    /// lock, but a back navigation may have consumed its history entry.
    fn on_reentered<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) {
        let Some(state) = self.panels.get(id) else {
            return;
        };
        if state.flags.contains(PanelFlags::HISTORY_GUARD) && !self.history.contains(id) {
            self.history.push(id);
            host.push_history_entry(id);
        }
        tracing::debug!(panel = %id, "panel re-entered");
        self.broadcast_opened(host, id);
    }

    fn broadcast_opened<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) {
        for other in self.registry.broadcast_targets(id) {
            tracing::debug!(panel = %other, opened = %id, "closing panel on broadcast");
            self.dismiss(host, other, DismissReason::OtherOpened);
        }
    }

    fn on_settled<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) {
        let Some(state) = self.panels.get(id) else {
            return;
        };
        if state.flags.contains(PanelFlags::FOCUS_ON_OPEN) {
            host.focus(state.root);
        }
        self.notices.push(PanelNotice::Opened(id));
    }

    fn on_unmount<H: OverlayHost + ?Sized>(&mut self, host: &mut H, id: PanelId) {
        self.registry.remove(id);
        let Some(state) = self.panels.remove(id) else {
            return;
        };
        if self.roots.get(&state.root) == Some(&id) {
            self.roots.remove(&state.root);
        }

        if state.flags.contains(PanelFlags::LOCKS_SCROLL) && self.scroll_lock.release() {
            tracing::debug!(panel = %id, "document scroll unlocked");
            host.set_scroll_locked(false);
        }
        if state.flags.contains(PanelFlags::HISTORY_GUARD) && self.history.release(id) {
            host.history_back();
        }
        self.notices.push(PanelNotice::Closed(id));
    }

    /// Flip an open panel's intent to closed on the consumer's behalf.
    fn dismiss<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: PanelId,
        reason: DismissReason,
    ) -> bool {
        let Some(state) = self.panels.get(id) else {
            return false;
        };
        if !state.lifecycle.opened() {
            return false;
        }
        tracing::debug!(panel = %id, reason = reason.as_str(), "dismissing panel");
        self.notices.push(PanelNotice::Dismissed { id, reason });
        self.dispatch(host, id, LifecycleEvent::ExternalDismissRequested);
        true
    }

    fn shake(&mut self, id: PanelId, now: Instant) {
        if let Some(state) = self.panels.get_mut(id) {
            state.shake_deadline = Some(now + self.config.shake_duration);
            tracing::trace!(panel = %id, "dismissal refused");
            self.notices.push(PanelNotice::Shake(id));
        }
    }

    /// Outside-click / Escape arbitration.
    ///
    /// Decisions are taken against the registry as it was when the gesture
    /// arrived, then applied top to bottom.
    fn arbitrate<H: OverlayHost + ?Sized>(
        &mut self,
        host: &mut H,
        target: Option<NodeId>,
        reason: DismissReason,
        now: Instant,
    ) {
        let flag = match reason {
            DismissReason::OutsideClick => PanelFlags::CANCEL_ON_OUTSIDE_CLICK,
            _ => PanelFlags::CANCEL_ON_ESC_KEY,
        };

        let mut dismissed = Vec::new();
        let mut refused = Vec::new();
        for entry in self.registry.iter().rev() {
            let Some(state) = self.panels.get(entry.id) else {
                continue;
            };
            // Already on its way out.
            if !state.lifecycle.opened() {
                continue;
            }
            if target.is_some_and(|node| state.is_hit(&*host, node)) {
                continue;
            }
            if !self.registry.is_topmost(entry.id) && self.registry.is_shielded(entry.id) {
                tracing::trace!(panel = %entry.id, reason = reason.as_str(), "panel shielded");
                continue;
            }
            if state.flags.contains(flag) {
                dismissed.push(entry.id);
            } else if state.flags.contains(PanelFlags::SHAKE_ON_BLOCKED_CLOSE) {
                refused.push(entry.id);
            }
        }

        for id in refused {
            self.shake(id, now);
        }
        for id in dismissed {
            self.dismiss(host, id, reason);
        }
    }

    /// Pointer crossings on descendants are moves within the panel; only the
    /// root and trigger boundaries arm or clear the close deadline.
    fn track_hover(&mut self, pointer: &PointerEvent, now: Instant) {
        let Some(node) = pointer.target else {
            return;
        };
        let entering = matches!(pointer.kind, PointerEventKind::Enter);
        for id in self.live_ids() {
            let Some(state) = self.panels.get_mut(id) else {
                continue;
            };
            let Some(delay) = state.hover_close_delay else {
                continue;
            };
            if !state.lifecycle.opened() || !state.is_hover_boundary(node) {
                continue;
            }
            state.hover_deadline = if entering { None } else { Some(now + delay) };
        }
    }

    fn reposition<H: OverlayHost + ?Sized>(&mut self, host: &H, id: PanelId) {
        let before = self.placement(id);
        if let Ok(Some(placement)) = self.resolve_placement(host, id)
            && before != Some(placement)
        {
            self.notices.push(PanelNotice::Repositioned { id, placement });
        }
    }
}
