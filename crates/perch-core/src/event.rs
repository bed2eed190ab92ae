#![forbid(unsafe_code)]

//! Canonical host events.
//!
//! Hosts translate their native input into these types before handing them
//! to the overlay manager. Only the events the overlay engine reacts to are
//! modelled: pointer presses and hover transitions, key presses, history
//! pops, and layout changes.
//!
//! # Design Notes
//!
//! - Pointer coordinates are viewport pixels.
//! - `target` is the host node the event was dispatched to. `None` means the
//!   node could not be identified (detached before dispatch, or the event hit
//!   the document itself).
//! - `KeyEventKind` defaults to `Press`.

use bitflags::bitflags;

use crate::geometry::{Point, Size};

/// Opaque handle to a host node (DOM element, widget id, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Canonical host event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A pointer event.
    Pointer(PointerEvent),

    /// A keyboard event.
    Key(KeyEvent),

    /// The viewport was resized.
    Resize(Size),

    /// The rendered size of a node changed (size-observer callback).
    ContentResized(NodeId),

    /// Browser-style back navigation (`popstate`).
    PopState,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// Viewport position.
    pub position: Point,

    /// Node the event was dispatched to, if known.
    pub target: Option<NodeId>,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            target: None,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press at `position` dispatched to `target`.
    #[must_use]
    pub const fn down(position: Point, target: Option<NodeId>) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), position).with_target(target)
    }

    /// Set the dispatch target.
    #[must_use]
    pub const fn with_target(mut self, target: Option<NodeId>) -> Self {
        self.target = target;
        self
    }

    /// Set modifier keys.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is a button press of any kind.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, PointerEventKind::Down(_))
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved over `target`.
    Moved,

    /// Pointer entered `target`.
    Enter,

    /// Pointer left `target`.
    Leave,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    Primary,

    /// Right mouse button (context menus).
    Secondary,

    /// Middle mouse button.
    Auxiliary,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Escape was pressed (repeats and releases do not count).
    #[must_use]
    pub const fn is_escape_press(&self) -> bool {
        matches!(self.code, KeyCode::Escape) && matches!(self.kind, KeyEventKind::Press)
    }
}

/// Key codes the overlay engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    Escape,
    Enter,
    Tab,

    /// Any other key.
    Other,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<PointerEvent> for Event {
    fn from(pointer: PointerEvent) -> Self {
        Self::Pointer(pointer)
    }
}
