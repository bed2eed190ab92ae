#![forbid(unsafe_code)]

//! Stack registry: the z-ordered list of mounted panels.
//!
//! Panels are appended when they mount and removed when they unmount. The
//! order is insertion order and is never re-sorted, so "later" always means
//! "rendered on top".
//!
//! # Invariants
//!
//! - A panel appears at most once.
//! - Exactly one entry is topmost whenever the registry is non-empty.
//! - The topmost entry is never shielded.
//!
//! # Failure Modes
//!
//! - Queries for ids not in the registry answer `false` (not topmost, not
//!   shielded) rather than panicking.
//! - Pushing an id that is already present is ignored.

use std::borrow::Cow;

use crate::arena::PanelId;

/// Which newly opened panels make this panel close.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CloseOthers {
    /// Stay open when other panels open.
    #[default]
    Never,
    /// Close whenever any other panel opens.
    Any,
    /// Close when a panel with this class opens.
    Class(Cow<'static, str>),
}

impl CloseOthers {
    /// Whether a panel opening with `class` should close this one.
    pub fn matches(&self, class: Option<&str>) -> bool {
        match self {
            Self::Never => false,
            Self::Any => true,
            Self::Class(wanted) => class == Some(wanted.as_ref()),
        }
    }
}

/// One mounted panel in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub id: PanelId,
    /// Shields entries beneath it from outside-click dismissal.
    pub modal: bool,
    pub close_others: CloseOthers,
    pub class: Option<Cow<'static, str>>,
}

impl StackEntry {
    pub fn new(id: PanelId) -> Self {
        Self {
            id,
            modal: false,
            close_others: CloseOthers::Never,
            class: None,
        }
    }

    #[must_use]
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    #[must_use]
    pub fn close_others(mut self, close_others: CloseOthers) -> Self {
        self.close_others = close_others;
        self
    }

    #[must_use]
    pub fn class(mut self, class: Option<Cow<'static, str>>) -> Self {
        self.class = class;
        self
    }
}

/// Ordered registry of mounted panels, bottom to top.
#[derive(Debug, Clone, Default)]
pub struct StackRegistry {
    entries: Vec<StackEntry>,
}

impl StackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly mounted panel on top.
    ///
    /// Returns `false` if the id was already registered.
    pub fn push(&mut self, entry: StackEntry) -> bool {
        if self.contains(entry.id) {
            tracing::warn!(panel = %entry.id, "panel registered twice; ignoring");
            return false;
        }
        tracing::debug!(panel = %entry.id, modal = entry.modal, depth = self.entries.len() + 1, "panel registered");
        self.entries.push(entry);
        true
    }

    /// Remove a panel from any position.
    pub fn remove(&mut self, id: PanelId) -> Option<StackEntry> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);
        tracing::debug!(panel = %id, depth = self.entries.len(), "panel unregistered");
        Some(entry)
    }

    /// Z-order index of a panel (0 = bottom).
    pub fn position(&self, id: PanelId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    #[inline]
    pub fn contains(&self, id: PanelId) -> bool {
        self.position(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The topmost entry.
    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn get(&self, id: PanelId) -> Option<&StackEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StackEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Ids bottom to top.
    pub fn ids(&self) -> Vec<PanelId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Whether `id` is the last-mounted panel.
    pub fn is_topmost(&self, id: PanelId) -> bool {
        self.top().is_some_and(|entry| entry.id == id)
    }

    /// Whether a modal panel is stacked anywhere above `id`.
    pub fn is_shielded(&self, id: PanelId) -> bool {
        match self.position(id) {
            Some(index) => self.entries[index + 1..].iter().any(|entry| entry.modal),
            None => false,
        }
    }

    /// Panels that should close because `opened` just opened.
    ///
    /// The opener and the topmost panel are never included.
    pub fn broadcast_targets(&self, opened: PanelId) -> Vec<PanelId> {
        let class = self.get(opened).and_then(|entry| entry.class.as_deref());
        let top = self.top().map(|entry| entry.id);
        self.entries
            .iter()
            .filter(|entry| entry.id != opened && Some(entry.id) != top)
            .filter(|entry| entry.close_others.matches(class))
            .map(|entry| entry.id)
            .collect()
    }
}
