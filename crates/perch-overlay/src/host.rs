#![forbid(unsafe_code)]

//! Host capabilities consumed by the overlay manager.
//!
//! The manager never talks to a platform directly. A host (browser binding,
//! native toolkit, test harness) implements [`OverlayHost`] to expose
//! measurement, ancestry, and the document-level side effects, and registers
//! triggers through [`TriggerHandle`].
//!
//! [`MemoryHost`] is a complete in-memory host used by the test suites and by
//! headless embedders.

use std::fmt;

use ahash::AHashMap;
use perch_core::event::NodeId;
use perch_core::geometry::{Point, Rect, Scale, Size};

use crate::arena::PanelId;

/// Platform primitives the manager consumes.
pub trait OverlayHost {
    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Page scroll offset (used by absolute positioning).
    fn scroll_offset(&self) -> Point {
        Point::ORIGIN
    }

    /// Laid-out size of a node, `None` if it is not laid out yet.
    fn measure(&self, node: NodeId) -> Option<Size>;

    /// Active scale transform on a node.
    fn scale_of(&self, _node: NodeId) -> Scale {
        Scale::IDENTITY
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Lock or unlock document scrolling.
    fn set_scroll_locked(&mut self, locked: bool);

    /// Push one history entry on behalf of `panel`.
    fn push_history_entry(&mut self, _panel: PanelId) {}

    /// Navigate back one history entry.
    fn history_back(&mut self) {}

    /// Move keyboard focus to `node`.
    fn focus(&mut self, _node: NodeId) {}
}

/// A trigger element registered with a panel.
pub trait TriggerHandle: fmt::Debug + Send + Sync {
    /// Current bounding box in viewport pixels, `None` if detached.
    fn bounding_box(&self) -> Option<Rect>;

    /// Host node of the trigger, used for ancestry checks.
    fn node(&self) -> Option<NodeId> {
        None
    }

    /// Whether an event dispatched to `node` hit the trigger.
    fn contains(&self, node: NodeId) -> bool {
        self.node() == Some(node)
    }
}

/// Trigger with a fixed bounding box, optionally bound to a host node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectTrigger {
    pub rect: Rect,
    pub node: Option<NodeId>,
}

impl RectTrigger {
    pub fn new(rect: Rect) -> Self {
        Self { rect, node: None }
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

impl TriggerHandle for RectTrigger {
    fn bounding_box(&self) -> Option<Rect> {
        Some(self.rect)
    }

    fn node(&self) -> Option<NodeId> {
        self.node
    }
}

#[derive(Debug, Clone, Copy)]
struct MemoryNode {
    size: Option<Size>,
    scale: Scale,
    parent: Option<NodeId>,
}

/// In-memory [`OverlayHost`] that records every side effect.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub viewport: Size,
    pub scroll: Point,
    nodes: AHashMap<NodeId, MemoryNode>,
    pub scroll_locked: bool,
    /// Number of times the lock state was changed.
    pub scroll_lock_changes: usize,
    /// Entries pushed, in order.
    pub history: Vec<PanelId>,
    pub history_back_calls: usize,
    pub focused: Option<NodeId>,
}

impl MemoryHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            scroll: Point::ORIGIN,
            nodes: AHashMap::new(),
            scroll_locked: false,
            scroll_lock_changes: 0,
            history: Vec::new(),
            history_back_calls: 0,
            focused: None,
        }
    }

    /// Add (or replace) a root-level node with a laid-out size.
    #[must_use]
    pub fn with_node(mut self, node: NodeId, size: Size) -> Self {
        self.set_node(node, Some(size), None);
        self
    }

    /// Add a node nested under `parent`.
    #[must_use]
    pub fn with_child(mut self, parent: NodeId, node: NodeId, size: Size) -> Self {
        self.set_node(node, Some(size), Some(parent));
        self
    }

    /// Add or update a node.
    pub fn set_node(&mut self, node: NodeId, size: Option<Size>, parent: Option<NodeId>) {
        self.nodes.insert(
            node,
            MemoryNode {
                size,
                scale: Scale::IDENTITY,
                parent,
            },
        );
    }

    /// Change a node's laid-out size (`None` = not laid out).
    pub fn resize_node(&mut self, node: NodeId, size: Option<Size>) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.size = size;
        }
    }

    /// Apply a scale transform to a node.
    pub fn set_scale(&mut self, node: NodeId, scale: Scale) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.scale = scale;
        }
    }

    /// Detach a node (and implicitly its subtree) from the host.
    pub fn remove_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }
}

impl OverlayHost for MemoryHost {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn measure(&self, node: NodeId) -> Option<Size> {
        self.nodes.get(&node).and_then(|entry| entry.size)
    }

    fn scale_of(&self, node: NodeId) -> Scale {
        self.nodes
            .get(&node)
            .map_or(Scale::IDENTITY, |entry| entry.scale)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        // Bounded walk; a malformed parent cycle must not hang the host.
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == ancestor => return self.nodes.contains_key(&id),
                Some(id) => current = self.nodes.get(&id).and_then(|entry| entry.parent),
                None => return false,
            }
        }
        false
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
        self.scroll_lock_changes += 1;
    }

    fn push_history_entry(&mut self, panel: PanelId) {
        self.history.push(panel);
    }

    fn history_back(&mut self) {
        self.history_back_calls += 1;
        self.history.pop();
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_walks_ancestry() {
        let host = MemoryHost::new(Size::new(800.0, 600.0))
            .with_node(NodeId(1), Size::new(10.0, 10.0))
            .with_child(NodeId(1), NodeId(2), Size::new(5.0, 5.0))
            .with_child(NodeId(2), NodeId(3), Size::new(1.0, 1.0))
            .with_node(NodeId(9), Size::new(1.0, 1.0));
        assert!(host.contains(NodeId(1), NodeId(3)));
        assert!(host.contains(NodeId(1), NodeId(1)));
        assert!(!host.contains(NodeId(3), NodeId(1)));
        assert!(!host.contains(NodeId(1), NodeId(9)));
    }

    #[test]
    fn detached_nodes_are_not_contained() {
        let mut host = MemoryHost::new(Size::new(800.0, 600.0))
            .with_node(NodeId(1), Size::new(10.0, 10.0))
            .with_child(NodeId(1), NodeId(2), Size::new(5.0, 5.0));
        host.remove_node(NodeId(2));
        assert!(!host.contains(NodeId(1), NodeId(2)));
        assert!(!host.contains(NodeId(1), NodeId(77)));
    }

    #[test]
    fn measure_and_scale() {
        let mut host = MemoryHost::new(Size::new(800.0, 600.0)).with_node(NodeId(1), Size::new(10.0, 20.0));
        assert_eq!(host.measure(NodeId(1)), Some(Size::new(10.0, 20.0)));
        host.set_scale(NodeId(1), Scale::uniform(0.5));
        assert_eq!(host.scale_of(NodeId(1)), Scale::uniform(0.5));
        host.resize_node(NodeId(1), None);
        assert_eq!(host.measure(NodeId(1)), None);
        assert_eq!(host.scale_of(NodeId(5)), Scale::IDENTITY);
    }

    #[test]
    fn rect_trigger_contains_own_node() {
        let trigger = RectTrigger::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_node(NodeId(4));
        assert!(trigger.contains(NodeId(4)));
        assert!(!trigger.contains(NodeId(5)));
        assert_eq!(trigger.bounding_box(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }
}
