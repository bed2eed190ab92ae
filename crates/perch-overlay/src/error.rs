#![forbid(unsafe_code)]

//! Error types for the overlay manager.
//!
//! Only programmer errors surface here. Degraded geometry (a node that is not
//! laid out yet) is reported as "no placement", never as an error.

use thiserror::Error;

use crate::arena::PanelId;

/// Errors returned by [`OverlayManager`](crate::manager::OverlayManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The handle never existed here, or its panel already closed.
    ///
    /// A live handle always refers to a mounted panel, so this is also what
    /// placement queries report once a panel has finished closing.
    #[error("unknown or closed panel {0}")]
    UnknownPanel(PanelId),
}

/// Result alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;
