#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are CSS-style pixels in viewport space: origin at the top-left
//! of the viewport, `x` growing right and `y` growing down. Sizes are never
//! negative in well-formed input; the resolver rejects non-finite values.

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The viewport origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero, negative, or not finite.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Divide out an active scale transform.
    ///
    /// A panel that is mid scale-in reports a laid-out size smaller than its
    /// final size; this recovers the final size.
    #[inline]
    pub fn unscaled(self, scale: Scale) -> Self {
        let scale = scale.sanitized();
        Self::new(self.width / scale.x, self.height / scale.y)
    }
}

/// An axis-aligned scale transform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    /// No transform.
    pub const IDENTITY: Self = Self::new(1.0, 1.0);

    /// Create a scale with independent factors.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a uniform scale.
    #[inline]
    pub const fn uniform(factor: f64) -> Self {
        Self::new(factor, factor)
    }

    /// Whether this is the identity transform.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0
    }

    /// Replace unusable factors (zero, negative, NaN, infinite) with `1.0`.
    #[inline]
    pub fn sanitized(self) -> Self {
        fn factor(v: f64) -> f64 {
            if v.is_finite() && v > 0.0 { v } else { 1.0 }
        }
        Self::new(factor(self.x), factor(self.y))
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A rectangle in viewport pixels.
///
/// A zero-size rectangle is a valid degenerate target (pointer positions are
/// represented this way).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Zero-size rectangle located at `point`.
    #[inline]
    pub const fn at_point(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal midpoint.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical midpoint.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Whether every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Check if a point is inside the rectangle (right/bottom edges exclusive).
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Move the rectangle by the given delta.
    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl From<Point> for Rect {
    fn from(point: Point) -> Self {
        Self::at_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Scale, Size};

    #[test]
    fn rect_edges() {
        let rect = Rect::new(100.0, 50.0, 40.0, 20.0);
        assert_eq!(rect.right(), 140.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.center_x(), 120.0);
        assert_eq!(rect.center_y(), 60.0);
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains_point(Point::new(2.0, 3.0)));
        assert!(rect.contains_point(Point::new(5.9, 7.9)));
        assert!(!rect.contains_point(Point::new(6.0, 3.0)));
        assert!(!rect.contains_point(Point::new(2.0, 8.0)));
    }

    #[test]
    fn point_rect_is_empty_but_positioned() {
        let rect = Rect::at_point(Point::new(10.0, 20.0));
        assert!(rect.is_empty());
        assert_eq!(rect.bottom(), 20.0);
        assert_eq!(rect.right(), 10.0);
    }

    #[test]
    fn size_empty_cases() {
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(10.0, -1.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn unscaled_divides_out_scale() {
        let measured = Size::new(90.0, 45.0);
        assert_eq!(measured.unscaled(Scale::uniform(0.9)), Size::new(100.0, 50.0));
    }

    #[test]
    fn unscaled_ignores_degenerate_scale() {
        let measured = Size::new(90.0, 45.0);
        assert_eq!(measured.unscaled(Scale::new(0.0, f64::NAN)), measured);
        assert_eq!(measured.unscaled(Scale::IDENTITY), measured);
    }

    #[test]
    fn translate_moves_origin_only() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0).translate(10.0, -2.0);
        assert_eq!(rect, Rect::new(11.0, 0.0, 3.0, 4.0));
    }
}
