//! Property-based tests for the geometry primitives.
//!
//! 1. Sanitized scale factors are always finite and positive
//! 2. Unscaling recovers the pre-transform size
//! 3. Rectangles are half-open: the right and bottom edges are outside
//! 4. Translation moves containment with the rectangle
//!
//! Integer-derived coordinates keep the edge arithmetic exact.

use perch_core::geometry::{Point, Rect, Scale, Size};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-1000i32..1000, -1000i32..1000, 0i32..500, 0i32..500)
        .prop_map(|(x, y, w, h)| Rect::new(x.into(), y.into(), w.into(), h.into()))
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-1600i32..1600, -1600i32..1600).prop_map(|(x, y)| Point::new(x.into(), y.into()))
}

// ═══════════════════════════════════════════════════════════════════════
// 1–2. Scale
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sanitized_scale_is_usable(x in any::<f64>(), y in any::<f64>()) {
        let scale = Scale::new(x, y).sanitized();
        prop_assert!(scale.x.is_finite() && scale.x > 0.0);
        prop_assert!(scale.y.is_finite() && scale.y > 0.0);
    }

    #[test]
    fn unscaled_inverts_scale(
        (w, h) in (1u32..4000, 1u32..4000),
        (sx, sy) in (1u32..=400, 1u32..=400),
    ) {
        let full = Size::new(f64::from(w), f64::from(h));
        let scale = Scale::new(f64::from(sx) / 100.0, f64::from(sy) / 100.0);
        let shown = Size::new(full.width * scale.x, full.height * scale.y);

        let recovered = shown.unscaled(scale);
        prop_assert!((recovered.width - full.width).abs() < 1e-9 * full.width);
        prop_assert!((recovered.height - full.height).abs() < 1e-9 * full.height);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3–4. Containment
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn far_edges_are_exclusive(rect in rect_strategy(), along in 0i32..500) {
        let along = f64::from(along);
        prop_assert!(!rect.contains_point(Point::new(rect.right(), rect.y + along)));
        prop_assert!(!rect.contains_point(Point::new(rect.x + along, rect.bottom())));
        prop_assert_eq!(
            rect.contains_point(Point::new(rect.x, rect.y)),
            !rect.is_empty()
        );
    }

    #[test]
    fn translation_preserves_containment(
        rect in rect_strategy(),
        point in point_strategy(),
        (dx, dy) in (-500i32..500, -500i32..500),
    ) {
        let (dx, dy) = (f64::from(dx), f64::from(dy));
        let moved = rect.translate(dx, dy);
        prop_assert_eq!(moved.size(), rect.size());
        prop_assert_eq!(
            moved.contains_point(Point::new(point.x + dx, point.y + dy)),
            rect.contains_point(point)
        );
    }
}
