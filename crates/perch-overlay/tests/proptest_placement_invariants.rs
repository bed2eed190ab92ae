//! Property-based invariant tests for the placement resolver.
//!
//! 1. Clamping: panels that fit stay inside the gap-inset viewport, unshrunk
//! 2. Overflow: panels that do not fit are pinned to the gap and shrunk
//! 3. Flip symmetry: mirroring the target and the vertical alignment mirrors
//!    the placement
//! 4. Idempotence: resolving twice with unchanged inputs is identical
//!
//! Coordinates are drawn from integers so mirrored arithmetic is exact.

use perch_core::event::NodeId;
use perch_core::geometry::{Point, Rect, Size};
use perch_overlay::position::{
    HorizontalAlign, MIN_SCREEN_GAP, PanelMetrics, PlacementResult, PositionMode,
    PositioningRequest, Target, VerticalAlign, resolve,
};
use perch_overlay::{MemoryHost, OverlayManager, PanelOptions, TransitionConfig};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn viewport_strategy() -> impl Strategy<Value = Size> {
    (100i32..2000, 100i32..2000).prop_map(|(w, h)| Size::new(w as f64, h as f64))
}

fn target_strategy() -> impl Strategy<Value = Rect> {
    (-200i32..2200, -200i32..2200, 0i32..300, 0i32..300)
        .prop_map(|(x, y, w, h)| Rect::new(x as f64, y as f64, w as f64, h as f64))
}

fn horizontal_strategy() -> impl Strategy<Value = HorizontalAlign> {
    prop_oneof![
        Just(HorizontalAlign::Left),
        Just(HorizontalAlign::Center),
        Just(HorizontalAlign::Right),
    ]
}

fn vertical_strategy() -> impl Strategy<Value = VerticalAlign> {
    prop_oneof![
        Just(VerticalAlign::Top),
        Just(VerticalAlign::Middle),
        Just(VerticalAlign::Bottom),
    ]
}

fn mode_strategy() -> impl Strategy<Value = PositionMode> {
    prop_oneof![
        Just(PositionMode::Absolute),
        Just(PositionMode::Fixed),
        Just(PositionMode::Centered),
    ]
}

fn offset_strategy() -> impl Strategy<Value = f64> {
    (-40i32..40).prop_map(f64::from)
}

/// Fraction in `(0, 1]` used to derive a panel length that fits.
fn fit_fraction() -> impl Strategy<Value = f64> {
    (1u32..=1000).prop_map(|n| n as f64 / 1000.0)
}

fn place(panel: Size, viewport: Size, request: &PositioningRequest) -> PlacementResult {
    resolve(
        PanelMetrics::new(panel),
        viewport,
        Point::ORIGIN,
        request,
        MIN_SCREEN_GAP,
    )
    .expect("valid inputs resolve")
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Clamping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fitting_panel_stays_inside_gap(
        viewport in viewport_strategy(),
        target in target_strategy(),
        fw in fit_fraction(),
        fh in fit_fraction(),
        h_align in horizontal_strategy(),
        v_align in vertical_strategy(),
        (h_off, v_off) in (offset_strategy(), offset_strategy()),
        flip in any::<bool>(),
        mode in mode_strategy(),
    ) {
        let gap = MIN_SCREEN_GAP;
        let panel = Size::new(
            ((viewport.width - 2.0 * gap) * fw).max(1.0),
            ((viewport.height - 2.0 * gap) * fh).max(1.0),
        );
        let request = PositioningRequest::new(Target::Rect(target))
            .align(h_align, v_align)
            .offset(h_off, v_off)
            .flip(flip)
            .fit_to_screen(true)
            .mode(mode);

        let placement = place(panel, viewport, &request);

        prop_assert!(placement.max_width.is_none(), "no shrink for fitting width");
        prop_assert!(placement.max_height.is_none(), "no shrink for fitting height");
        prop_assert!(placement.left >= gap);
        prop_assert!(placement.left <= viewport.width - gap - panel.width);
        prop_assert!(placement.top >= gap);
        prop_assert!(placement.top <= viewport.height - gap - panel.height);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Overflow
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn oversized_panel_is_pinned_and_shrunk(
        viewport in viewport_strategy(),
        target in target_strategy(),
        extra in (1i32..1500).prop_map(f64::from),
        v_align in vertical_strategy(),
        no_overlap in any::<bool>(),
        flip in any::<bool>(),
    ) {
        let gap = MIN_SCREEN_GAP;
        let panel = Size::new(viewport.width - 2.0 * gap + extra, 50.0);
        let request = PositioningRequest::new(Target::Rect(target))
            .align(HorizontalAlign::Left, v_align)
            .no_horizontal_overlap(no_overlap)
            .flip(flip)
            .fit_to_screen(true);

        let placement = place(panel, viewport, &request);

        prop_assert_eq!(placement.left, gap);
        prop_assert_eq!(placement.max_width, Some(viewport.width - 2.0 * gap));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Flip symmetry
// ═══════════════════════════════════════════════════════════════════════

fn mirror_vertically(rect: Rect, viewport: Size) -> Rect {
    Rect::new(rect.x, viewport.height - rect.bottom(), rect.width, rect.height)
}

proptest! {
    #[test]
    fn unconstrained_placement_mirrors(
        viewport in viewport_strategy(),
        target in target_strategy(),
        panel_h in (1i32..800).prop_map(f64::from),
        v_off in offset_strategy(),
        no_overlap in any::<bool>(),
        from_top in any::<bool>(),
    ) {
        let (align, mirrored_align) = if from_top {
            (VerticalAlign::Top, VerticalAlign::Bottom)
        } else {
            (VerticalAlign::Bottom, VerticalAlign::Top)
        };
        let panel = Size::new(100.0, panel_h);
        let base = |target: Rect, v: VerticalAlign| {
            PositioningRequest::new(Target::Rect(target))
                .align(HorizontalAlign::Left, v)
                .offset(0.0, v_off)
                .no_vertical_overlap(no_overlap)
        };

        let original = place(panel, viewport, &base(target, align));
        let mirrored = place(
            panel,
            viewport,
            &base(mirror_vertically(target, viewport), mirrored_align),
        );

        prop_assert_eq!(mirrored.top, viewport.height - original.top - panel.height);
        prop_assert_eq!(mirrored.left, original.left);
    }

    #[test]
    fn flipped_and_clamped_placement_mirrors(
        viewport in viewport_strategy(),
        target in target_strategy(),
        fh in fit_fraction(),
        v_off in offset_strategy(),
        from_top in any::<bool>(),
    ) {
        let (align, mirrored_align) = if from_top {
            (VerticalAlign::Top, VerticalAlign::Bottom)
        } else {
            (VerticalAlign::Bottom, VerticalAlign::Top)
        };
        let panel = Size::new(100.0, ((viewport.height - 2.0 * MIN_SCREEN_GAP) * fh).round().max(1.0));
        let base = |target: Rect, v: VerticalAlign| {
            PositioningRequest::new(Target::Rect(target))
                .align(HorizontalAlign::Left, v)
                .offset(0.0, v_off)
                .flip(true)
                .fit_to_screen(true)
        };

        let original = place(panel, viewport, &base(target, align));
        let mirrored = place(
            panel,
            viewport,
            &base(mirror_vertically(target, viewport), mirrored_align),
        );

        prop_assert_eq!(mirrored.top, viewport.height - original.top - panel.height);
        prop_assert_eq!(mirrored.max_height, original.max_height);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Idempotence
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolve_is_pure(
        viewport in viewport_strategy(),
        target in target_strategy(),
        (w, h) in (1i32..3000, 1i32..3000),
        h_align in horizontal_strategy(),
        v_align in vertical_strategy(),
        flip in any::<bool>(),
        fit in any::<bool>(),
    ) {
        let panel = Size::new(f64::from(w), f64::from(h));
        let request = PositioningRequest::new(Target::Rect(target))
            .align(h_align, v_align)
            .flip(flip)
            .fit_to_screen(fit);
        prop_assert_eq!(place(panel, viewport, &request), place(panel, viewport, &request));
    }

    #[test]
    fn manager_placement_does_not_drift(
        viewport in viewport_strategy(),
        target in target_strategy(),
        (w, h) in (1i32..3000, 1i32..3000),
        v_align in vertical_strategy(),
    ) {
        let root = NodeId(1);
        let mut host = MemoryHost::new(viewport).with_node(root, Size::new(f64::from(w), f64::from(h)));
        let mut manager = OverlayManager::default();
        let request = PositioningRequest::new(Target::Rect(target))
            .align(HorizontalAlign::Left, v_align)
            .no_vertical_overlap(true)
            .flip(true)
            .fit_to_screen(true);
        let id = manager.open_panel(
            &mut host,
            PanelOptions::new(root).request(request).transition(TransitionConfig::none()),
        );

        let first = manager.resolve_placement(&host, id).expect("live panel");
        let second = manager.resolve_placement(&host, id).expect("live panel");
        prop_assert!(first.is_some());
        prop_assert_eq!(first, second);
    }
}
