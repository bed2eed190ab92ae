#![forbid(unsafe_code)]

//! Positioning, stacking, and lifecycle engine for floating panels.
//!
//! # Role in perch
//! Every dropdown, tooltip, dialog, and context menu a host renders is a
//! *panel* owned by an [`OverlayManager`]. The manager decides where the
//! panel goes ([`position::resolve`]), whether it is on screen
//! ([`lifecycle::PanelLifecycle`]), and which panels respond to an outside
//! click, Escape, or another panel opening ([`stack::StackRegistry`]).
//!
//! # How it fits in the system
//! Hosts implement [`OverlayHost`] to provide measurement and document side
//! effects, feed [`perch_core::event::Event`]s into
//! [`OverlayManager::handle_event`], and call [`OverlayManager::tick`] once
//! per frame. Consumers either drive the manager imperatively or describe
//! panels declaratively through [`panel::Panel`].

pub mod arena;
pub mod config;
pub mod error;
pub mod guard;
pub mod host;
pub mod lifecycle;
pub mod manager;
pub mod panel;
pub mod position;
pub mod stack;

pub use arena::PanelId;
pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use host::{MemoryHost, OverlayHost, RectTrigger, TriggerHandle};
pub use lifecycle::{LifecyclePhase, TransitionConfig};
pub use manager::{DismissReason, OverlayManager, PanelFlags, PanelNotice, PanelOptions};
pub use panel::{Panel, PanelProps, PanelView};
pub use position::{
    HorizontalAlign, PlacementResult, PositionMode, PositioningRequest, Target, VerticalAlign,
};
pub use stack::CloseOthers;
