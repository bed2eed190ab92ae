#![forbid(unsafe_code)]

//! Geometry resolver for anchored floating panels.
//!
//! [`resolve`] computes where a floating panel goes relative to a trigger
//! rectangle or a pointer position. It aligns the panel against the target,
//! optionally flips it to the opposite side when that side has materially
//! more room, and optionally clamps (or shrinks) it into the viewport.
//!
//! The function is pure: identical inputs always produce identical output,
//! so it can run on every resize or content mutation without drift.
//!
//! # Algorithm
//!
//! Each axis is solved independently:
//!
//! 1. Desired origin from the alignment, overlap mode, and offset.
//! 2. Flip to the opposite side when the panel does not fit on the chosen
//!    side and the opposite side has more room by more than `|offset|`
//!    (only with `flip` and either `fit_to_screen` or [`PositionMode::Fixed`]).
//! 3. Clamp into `[min_gap, viewport - min_gap - size]`, or pin the origin to
//!    `min_gap` and emit a `max_*` bound when the panel cannot fit.
//! 4. Add the page scroll offset in [`PositionMode::Absolute`].
//!
//! Panel sizes are corrected for an active scale transform before any of
//! this runs, so a panel caught mid scale-in is placed by its final size.
//!
//! # Example
//!
//! ```
//! use perch_core::geometry::{Point, Rect, Size};
//! use perch_overlay::position::{resolve, PanelMetrics, PositioningRequest, MIN_SCREEN_GAP};
//!
//! let trigger = Rect::new(100.0, 100.0, 50.0, 20.0);
//! let request = PositioningRequest::below(trigger).fit_to_screen(true);
//! let placement = resolve(
//!     PanelMetrics::new(Size::new(200.0, 100.0)),
//!     Size::new(800.0, 600.0),
//!     Point::ORIGIN,
//!     &request,
//!     MIN_SCREEN_GAP,
//! )
//! .unwrap();
//! assert_eq!((placement.top, placement.left), (120.0, 100.0));
//! ```

use perch_core::geometry::{Point, Rect, Scale, Size};

/// Minimum distance between a clamped panel and the viewport edge.
pub const MIN_SCREEN_GAP: f64 = 8.0;

/// Horizontal alignment against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlign {
    /// Left edges aligned, or to the right of the target without overlap.
    #[default]
    Left,
    /// Centered on the target's horizontal midpoint.
    Center,
    /// Right edges aligned, or to the left of the target without overlap.
    Right,
}

impl HorizontalAlign {
    /// Return the opposite alignment for flip logic.
    pub fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Center => Self::Center,
        }
    }

    fn edge(self) -> Edge {
        match self {
            Self::Left => Edge::Start,
            Self::Center => Edge::Center,
            Self::Right => Edge::End,
        }
    }
}

/// Vertical alignment against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlign {
    /// Top edges aligned, or below the target without overlap.
    #[default]
    Top,
    /// Centered on the target's vertical midpoint.
    Middle,
    /// Bottom edges aligned, or above the target without overlap.
    Bottom,
}

impl VerticalAlign {
    /// Return the opposite alignment for flip logic.
    pub fn flip(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Middle => Self::Middle,
        }
    }

    fn edge(self) -> Edge {
        match self {
            Self::Top => Edge::Start,
            Self::Middle => Edge::Center,
            Self::Bottom => Edge::End,
        }
    }
}

/// Coordinate space of the resulting placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionMode {
    /// Document coordinates: page scroll offsets are added.
    #[default]
    Absolute,
    /// Viewport coordinates; always clamped into the viewport.
    Fixed,
    /// Viewport coordinates, centered in the viewport regardless of target.
    Centered,
}

/// What the panel is positioned against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    /// Bounding box of a trigger element.
    Rect(Rect),
    /// Pointer position (context menus).
    Point(Point),
}

impl Target {
    /// Build a target from optional parts.
    ///
    /// Supplying both is a caller bug; the pointer point wins. Supplying
    /// neither yields `None`.
    pub fn from_parts(rect: Option<Rect>, point: Option<Point>) -> Option<Self> {
        match (rect, point) {
            (Some(rect), Some(point)) => {
                tracing::debug!(?rect, ?point, "both rect and point target supplied; point wins");
                Some(Self::Point(point))
            }
            (None, Some(point)) => Some(Self::Point(point)),
            (Some(rect), None) => Some(Self::Rect(rect)),
            (None, None) => None,
        }
    }

    /// The target as a rectangle; points become zero-size rectangles.
    pub fn rect(&self) -> Rect {
        match *self {
            Self::Rect(rect) => rect,
            Self::Point(point) => Rect::at_point(point),
        }
    }
}

/// Input to [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositioningRequest {
    pub target: Target,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    /// Signed pixel delta applied away from the alignment edge.
    pub horizontal_offset: f64,
    /// Signed pixel delta applied away from the alignment edge.
    pub vertical_offset: f64,
    /// Place the panel beside the target horizontally instead of on it.
    pub no_horizontal_overlap: bool,
    /// Place the panel beside the target vertically instead of on it.
    pub no_vertical_overlap: bool,
    /// Allow swapping to the opposite side when it has more room.
    pub flip: bool,
    /// Keep the panel inside the viewport, shrinking it if necessary.
    pub fit_to_screen: bool,
    pub mode: PositionMode,
}

impl PositioningRequest {
    /// Create a request with edges aligned top-left on the target.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            horizontal_offset: 0.0,
            vertical_offset: 0.0,
            no_horizontal_overlap: false,
            no_vertical_overlap: false,
            flip: false,
            fit_to_screen: false,
            mode: PositionMode::Absolute,
        }
    }

    /// Dropdown-style placement: directly below `trigger`, left edges aligned.
    pub fn below(trigger: Rect) -> Self {
        Self::new(Target::Rect(trigger)).no_vertical_overlap(true)
    }

    /// Context-menu placement at a pointer position.
    pub fn at_point(point: Point) -> Self {
        Self::new(Target::Point(point))
    }

    /// Dialog placement centered in the viewport.
    pub fn centered() -> Self {
        let mut request = Self::new(Target::Point(Point::ORIGIN));
        request.mode = PositionMode::Centered;
        request.fit_to_screen = true;
        request
    }

    /// Replace the target.
    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Set both alignments.
    #[must_use]
    pub fn align(mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        self.horizontal_align = horizontal;
        self.vertical_align = vertical;
        self
    }

    /// Set both offsets.
    #[must_use]
    pub fn offset(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_offset = horizontal;
        self.vertical_offset = vertical;
        self
    }

    #[must_use]
    pub fn no_horizontal_overlap(mut self, enabled: bool) -> Self {
        self.no_horizontal_overlap = enabled;
        self
    }

    #[must_use]
    pub fn no_vertical_overlap(mut self, enabled: bool) -> Self {
        self.no_vertical_overlap = enabled;
        self
    }

    /// Enable or disable flipping.
    #[must_use]
    pub fn flip(mut self, enabled: bool) -> Self {
        self.flip = enabled;
        self
    }

    /// Enable or disable viewport fitting.
    #[must_use]
    pub fn fit_to_screen(mut self, enabled: bool) -> Self {
        self.fit_to_screen = enabled;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: PositionMode) -> Self {
        self.mode = mode;
        self
    }

    fn constrained(&self) -> bool {
        self.fit_to_screen || matches!(self.mode, PositionMode::Fixed)
    }
}

/// Measured panel size plus the scale transform active at measurement time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelMetrics {
    pub size: Size,
    pub scale: Scale,
}

impl PanelMetrics {
    /// Metrics for an untransformed panel.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            scale: Scale::IDENTITY,
        }
    }

    /// Attach the active scale transform.
    #[must_use]
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Size with the scale transform divided out.
    pub fn true_size(&self) -> Size {
        self.size.unscaled(self.scale)
    }
}

/// Computed placement.
///
/// `max_width`/`max_height` are only set when the panel had to shrink to
/// stay inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementResult {
    pub top: f64,
    pub left: f64,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl PlacementResult {
    /// Whether the panel was shrunk on either axis.
    pub fn is_constrained(&self) -> bool {
        self.max_width.is_some() || self.max_height.is_some()
    }
}

/// Compute the placement for a panel.
///
/// Returns `None` for zero-area or non-finite measurements; the caller keeps
/// its previous placement in that case.
pub fn resolve(
    panel: PanelMetrics,
    viewport: Size,
    scroll: Point,
    request: &PositioningRequest,
    min_gap: f64,
) -> Option<PlacementResult> {
    let size = panel.true_size();
    let target = request.target.rect();
    let offsets_finite =
        request.horizontal_offset.is_finite() && request.vertical_offset.is_finite();
    if size.is_empty()
        || viewport.is_empty()
        || !target.is_finite()
        || !scroll.is_finite()
        || !offsets_finite
    {
        return None;
    }
    let min_gap = if min_gap.is_finite() { min_gap.max(0.0) } else { MIN_SCREEN_GAP };

    let horizontal = Axis {
        target_start: target.x,
        target_len: target.width,
        panel_len: size.width,
        viewport_len: viewport.width,
        offset: request.horizontal_offset,
        no_overlap: request.no_horizontal_overlap,
    };
    let vertical = Axis {
        target_start: target.y,
        target_len: target.height,
        panel_len: size.height,
        viewport_len: viewport.height,
        offset: request.vertical_offset,
        no_overlap: request.no_vertical_overlap,
    };

    let (left, max_width) = horizontal.solve(request.horizontal_align.edge(), request, min_gap);
    let (top, max_height) = vertical.solve(request.vertical_align.edge(), request, min_gap);

    let (left, top) = match request.mode {
        PositionMode::Absolute => (left + scroll.x, top + scroll.y),
        PositionMode::Fixed | PositionMode::Centered => (left, top),
    };

    Some(PlacementResult {
        top,
        left,
        max_width,
        max_height,
    })
}

/// Alignment edge on a single axis: `Start` is top/left, `End` is bottom/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    Center,
    End,
}

impl Edge {
    fn flip(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
            Self::Center => Self::Center,
        }
    }
}

/// One axis of the problem, in viewport coordinates.
#[derive(Debug, Clone, Copy)]
struct Axis {
    target_start: f64,
    target_len: f64,
    panel_len: f64,
    viewport_len: f64,
    offset: f64,
    no_overlap: bool,
}

impl Axis {
    fn target_end(&self) -> f64 {
        self.target_start + self.target_len
    }

    fn solve(&self, edge: Edge, request: &PositioningRequest, min_gap: f64) -> (f64, Option<f64>) {
        let constrained = request.constrained();

        let (origin, beside) = if matches!(request.mode, PositionMode::Centered) {
            ((self.viewport_len - self.panel_len) / 2.0 + self.offset, false)
        } else {
            let edge = if request.flip && constrained {
                self.flip_if_roomier(edge)
            } else {
                edge
            };
            (self.desired(edge), self.no_overlap && edge != Edge::Center)
        };

        if !constrained {
            return (origin, None);
        }
        self.clamp(origin, beside, min_gap)
    }

    /// Desired origin for the given edge, offset applied away from the edge.
    fn desired(&self, edge: Edge) -> f64 {
        match (edge, self.no_overlap) {
            (Edge::Start, true) => self.target_end() + self.offset,
            (Edge::Start, false) => self.target_start + self.offset,
            (Edge::End, true) => self.target_start - self.panel_len - self.offset,
            (Edge::End, false) => self.target_end() - self.panel_len - self.offset,
            (Edge::Center, _) => {
                self.target_start + self.target_len / 2.0 - self.panel_len / 2.0 + self.offset
            }
        }
    }

    /// Room the panel has when anchored at `edge`, up to the viewport edge.
    fn room(&self, edge: Edge) -> f64 {
        match (edge, self.no_overlap) {
            (Edge::Start, true) => self.viewport_len - self.target_end(),
            (Edge::Start, false) => self.viewport_len - self.target_start,
            (Edge::End, true) => self.target_start,
            (Edge::End, false) => self.target_end(),
            (Edge::Center, _) => self.viewport_len,
        }
    }

    fn flip_if_roomier(&self, edge: Edge) -> Edge {
        if edge == Edge::Center {
            return edge;
        }
        let margin = self.offset.abs();
        let current = self.room(edge);
        if current >= self.panel_len + margin {
            return edge;
        }
        let opposite = self.room(edge.flip());
        if opposite - current > margin {
            tracing::trace!(current, opposite, "flipping panel to roomier side");
            edge.flip()
        } else {
            edge
        }
    }

    fn clamp(&self, origin: f64, beside: bool, min_gap: f64) -> (f64, Option<f64>) {
        let available = self.viewport_len - 2.0 * min_gap;
        if self.panel_len > available {
            return (min_gap, Some(available.max(0.0)));
        }

        let max_origin = self.viewport_len - min_gap - self.panel_len;
        if origin >= min_gap && origin <= max_origin {
            return (origin, None);
        }

        // Shifting a beside-placed panel would slide it over its target. If
        // neither side of the target can hold it, it takes the whole axis.
        if beside {
            let before = self.target_start - min_gap;
            let after = self.viewport_len - min_gap - self.target_end();
            if before < self.panel_len && after < self.panel_len {
                return (min_gap, Some(available));
            }
        }

        // max_origin can dip below min_gap by rounding at extreme magnitudes.
        (origin.min(max_origin).max(min_gap), None)
    }
}
