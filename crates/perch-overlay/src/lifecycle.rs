#![forbid(unsafe_code)]

//! Open/close lifecycle state machine for a single panel.
//!
//! The consumer expresses *intent* (`opened`), the state machine decides what
//! is actually on screen. Close transitions run to completion while the
//! panel stays mounted, and rapid toggling redirects the transition in flight.
//!
//! # State machine
//!
//! ```text
//!            intent=true               finished
//!   Closed ─────────────▶ Entering ─────────────▶ Open
//!     ▲                    │    ▲                  │
//!     │ finished           │    │ intent=true      │ intent=false
//!     │                    ▼    │                  ▼
//!     └──────────────── Exiting ◀──────────────────┘
//! ```
//!
//! Without a configured enter (exit) transition, `Entering` (`Exiting`) is
//! skipped and the phase jumps straight to `Open` (`Closed`).
//!
//! # Invariants
//!
//! - Every directional change bumps the epoch. A `TransitionFinished` signal
//!   carrying an old epoch, or disagreeing with the latest intent, is ignored.
//! - `Mount` is emitted exactly when leaving `Closed`; `Unmount` exactly when
//!   returning to it. A panel reversing out of `Exiting` is never unmounted
//!   and emits `Reentered` instead.
//! - Progress is always in `[0.0, 1.0]`; reversal mirrors it so the visual
//!   resumes where it was.
//!
//! # Failure Modes
//!
//! - Zero-duration transitions complete instantly.
//! - Completion signals for a direction no longer wanted are dropped silently.

use std::time::Duration;

use smallvec::SmallVec;

/// Accumulated float error tolerated when deciding a transition has ended.
const PROGRESS_EPSILON: f64 = 1e-9;

// ============================================================================
// Phase
// ============================================================================

/// Where a panel is in its open/close lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Not mounted; content is not instantiated.
    #[default]
    Closed,
    /// Mounted and running the enter transition.
    Entering,
    /// Mounted and fully visible.
    Open,
    /// Mounted and running the exit transition.
    Exiting,
}

impl LifecyclePhase {
    /// Whether the panel's content should be instantiated.
    #[inline]
    pub fn is_mounted(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether a transition is in flight.
    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Entering | Self::Exiting)
    }

    /// Whether the panel is heading toward, or sitting at, `Open`.
    #[inline]
    pub fn is_opening_or_open(self) -> bool {
        matches!(self, Self::Entering | Self::Open)
    }

    /// Stable name for presentation layers that map phases to styles.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Entering => "entering",
            Self::Open => "open",
            Self::Exiting => "exiting",
        }
    }
}

// ============================================================================
// Easing / transition config
// ============================================================================

/// Easing curve applied to transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    Linear,
    /// Decelerating; the usual choice for entrances.
    #[default]
    EaseOut,
    /// Accelerating.
    EaseIn,
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// Enter/exit transition timing for a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    /// Enter duration; `None` opens instantly.
    pub enter: Option<Duration>,
    /// Exit duration; `None` closes instantly.
    pub exit: Option<Duration>,
    pub easing: Easing,
    /// Scale at the start of the enter transition (and end of exit).
    pub min_scale: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter: Some(Duration::from_millis(150)),
            exit: Some(Duration::from_millis(100)),
            easing: Easing::EaseOut,
            min_scale: 0.95,
        }
    }
}

impl TransitionConfig {
    /// No transitions: panels open and close instantly.
    pub const fn none() -> Self {
        Self {
            enter: None,
            exit: None,
            easing: Easing::Linear,
            min_scale: 1.0,
        }
    }

    /// Set the enter duration.
    #[must_use]
    pub fn enter(mut self, duration: Option<Duration>) -> Self {
        self.enter = duration;
        self
    }

    /// Set the exit duration.
    #[must_use]
    pub fn exit(mut self, duration: Option<Duration>) -> Self {
        self.exit = duration;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn min_scale(mut self, scale: f64) -> Self {
        self.min_scale = scale.clamp(0.0, 1.0);
        self
    }

    fn enter_duration(&self) -> Option<Duration> {
        self.enter.filter(|d| !d.is_zero())
    }

    fn exit_duration(&self) -> Option<Duration> {
        self.exit.filter(|d| !d.is_zero())
    }

    /// Whether any transition is configured.
    pub fn is_animated(&self) -> bool {
        self.enter_duration().is_some() || self.exit_duration().is_some()
    }
}

// ============================================================================
// Events and steps
// ============================================================================

/// Input to [`PanelLifecycle::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The consumer's `opened` intent changed (or was re-asserted).
    IntentChanged(bool),
    /// The transition started at `epoch` has finished.
    TransitionFinished { epoch: u64 },
    /// Something outside the consumer asked the panel to close.
    ExternalDismissRequested,
}

/// Side effect a transition asks the owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEffect {
    /// Left `Closed`: register, lock scroll, push history, broadcast.
    Mount,
    /// Left `Exiting` toward `Open` while still mounted: restore history,
    /// broadcast.
    Reentered,
    /// Reached `Open`: focus-on-open.
    Settled,
    /// Returned to `Closed`: unregister, unlock scroll, release history.
    Unmount,
}

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleStep {
    pub from: LifecyclePhase,
    pub to: LifecyclePhase,
    pub effects: SmallVec<[LifecycleEffect; 2]>,
    /// The event was a stale completion signal and had no effect.
    pub stale: bool,
}

impl LifecycleStep {
    fn unchanged(phase: LifecyclePhase) -> Self {
        Self {
            from: phase,
            to: phase,
            effects: SmallVec::new(),
            stale: false,
        }
    }

    /// Whether the phase changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Whether the step carries the given effect.
    pub fn has(&self, effect: LifecycleEffect) -> bool {
        self.effects.contains(&effect)
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Lifecycle state for one panel.
#[derive(Debug, Clone)]
pub struct PanelLifecycle {
    phase: LifecyclePhase,
    /// Latest intent observed.
    opened: bool,
    epoch: u64,
    /// Progress within the current transition (0.0 to 1.0).
    progress: f64,
    transition: TransitionConfig,
}

impl Default for PanelLifecycle {
    fn default() -> Self {
        Self::new(TransitionConfig::default())
    }
}

impl PanelLifecycle {
    /// Create a closed lifecycle.
    pub fn new(transition: TransitionConfig) -> Self {
        Self {
            phase: LifecyclePhase::Closed,
            opened: false,
            epoch: 0,
            progress: 0.0,
            transition,
        }
    }

    #[inline]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Latest intent.
    #[inline]
    pub fn opened(&self) -> bool {
        self.opened
    }

    /// Current transition epoch; completion signals must carry this value.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Raw progress within the current transition.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn transition(&self) -> &TransitionConfig {
        &self.transition
    }

    /// Single entry point for all lifecycle input.
    pub fn dispatch(&mut self, event: LifecycleEvent) -> LifecycleStep {
        let step = match event {
            LifecycleEvent::IntentChanged(opened) => self.set_intent(opened),
            LifecycleEvent::ExternalDismissRequested => self.set_intent(false),
            LifecycleEvent::TransitionFinished { epoch } => self.finish(epoch),
        };
        if step.changed() {
            tracing::trace!(
                from = step.from.as_str(),
                to = step.to.as_str(),
                epoch = self.epoch,
                "panel lifecycle transition"
            );
        }
        step
    }

    fn set_intent(&mut self, opened: bool) -> LifecycleStep {
        self.opened = opened;
        let from = self.phase;
        let mut step = LifecycleStep::unchanged(from);

        match (from, opened) {
            (LifecyclePhase::Closed, true) => {
                self.epoch += 1;
                step.effects.push(LifecycleEffect::Mount);
                if self.transition.enter_duration().is_some() {
                    self.progress = 0.0;
                    self.phase = LifecyclePhase::Entering;
                } else {
                    self.settle_open();
                    step.effects.push(LifecycleEffect::Settled);
                }
            }
            (LifecyclePhase::Exiting, true) => {
                self.epoch += 1;
                step.effects.push(LifecycleEffect::Reentered);
                if self.transition.enter_duration().is_some() {
                    self.progress = 1.0 - self.progress;
                    self.phase = LifecyclePhase::Entering;
                } else {
                    self.settle_open();
                    step.effects.push(LifecycleEffect::Settled);
                }
            }
            (LifecyclePhase::Open, false) | (LifecyclePhase::Entering, false) => {
                self.epoch += 1;
                if self.transition.exit_duration().is_some() {
                    self.progress = if from == LifecyclePhase::Entering {
                        1.0 - self.progress
                    } else {
                        0.0
                    };
                    self.phase = LifecyclePhase::Exiting;
                } else {
                    self.settle_closed();
                    step.effects.push(LifecycleEffect::Unmount);
                }
            }
            (LifecyclePhase::Entering | LifecyclePhase::Open, true)
            | (LifecyclePhase::Exiting | LifecyclePhase::Closed, false) => {}
        }

        step.to = self.phase;
        step
    }

    fn finish(&mut self, epoch: u64) -> LifecycleStep {
        let from = self.phase;
        let mut step = LifecycleStep::unchanged(from);
        if epoch != self.epoch {
            tracing::trace!(epoch, current = self.epoch, "ignoring stale transition signal");
            step.stale = true;
            return step;
        }

        match from {
            LifecyclePhase::Entering if self.opened => {
                self.settle_open();
                step.effects.push(LifecycleEffect::Settled);
            }
            LifecyclePhase::Exiting if !self.opened => {
                self.settle_closed();
                step.effects.push(LifecycleEffect::Unmount);
            }
            _ => step.stale = true,
        }

        step.to = self.phase;
        step
    }

    fn settle_open(&mut self) {
        self.phase = LifecyclePhase::Open;
        self.progress = 1.0;
    }

    fn settle_closed(&mut self) {
        self.phase = LifecyclePhase::Closed;
        self.progress = 0.0;
    }

    /// Advance the in-flight transition by `delta`.
    ///
    /// Returns the completion step when the transition ends during this tick.
    /// Hosts that receive native animation-end callbacks can dispatch
    /// [`LifecycleEvent::TransitionFinished`] instead of ticking.
    pub fn tick(&mut self, delta: Duration) -> Option<LifecycleStep> {
        let duration = match self.phase {
            LifecyclePhase::Entering => self.transition.enter_duration(),
            LifecyclePhase::Exiting => self.transition.exit_duration(),
            LifecyclePhase::Open | LifecyclePhase::Closed => return None,
        };

        match duration {
            Some(duration) => {
                self.progress += delta.as_secs_f64() / duration.as_secs_f64();
            }
            None => self.progress = 1.0,
        }
        if self.progress >= 1.0 - PROGRESS_EPSILON {
            self.progress = 1.0;
            let epoch = self.epoch;
            Some(self.dispatch(LifecycleEvent::TransitionFinished { epoch }))
        } else {
            None
        }
    }

    /// Eased progress toward fully open (1.0) for the current phase.
    pub fn visibility(&self) -> f64 {
        match self.phase {
            LifecyclePhase::Entering => self.transition.easing.apply(self.progress),
            LifecyclePhase::Exiting => 1.0 - self.transition.easing.apply(self.progress),
            LifecyclePhase::Open => 1.0,
            LifecyclePhase::Closed => 0.0,
        }
    }

    /// Visual scale of the panel right now, in `[min_scale, 1.0]`.
    pub fn current_scale(&self) -> f64 {
        let min = self.transition.min_scale.clamp(0.0, 1.0);
        min + (1.0 - min) * self.visibility()
    }

    /// Visual opacity of the panel right now, in `[0.0, 1.0]`.
    pub fn current_opacity(&self) -> f64 {
        self.visibility()
    }
}
