#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use perch_core::geometry::{Point, Rect, Scale, Size};
use perch_overlay::position::{
    HorizontalAlign, PanelMetrics, PositionMode, PositioningRequest, Target, VerticalAlign, resolve,
};

#[derive(Debug, Arbitrary)]
struct Input {
    panel: (f64, f64),
    scale: (f64, f64),
    viewport: (f64, f64),
    scroll: (f64, f64),
    rect: (f64, f64, f64, f64),
    point: Option<(f64, f64)>,
    align: (u8, u8),
    offset: (f64, f64),
    no_overlap: (bool, bool),
    flip: bool,
    fit: bool,
    mode: u8,
    gap: f64,
}

fn horizontal(raw: u8) -> HorizontalAlign {
    match raw % 3 {
        0 => HorizontalAlign::Left,
        1 => HorizontalAlign::Center,
        _ => HorizontalAlign::Right,
    }
}

fn vertical(raw: u8) -> VerticalAlign {
    match raw % 3 {
        0 => VerticalAlign::Top,
        1 => VerticalAlign::Middle,
        _ => VerticalAlign::Bottom,
    }
}

fn mode(raw: u8) -> PositionMode {
    match raw % 3 {
        0 => PositionMode::Absolute,
        1 => PositionMode::Fixed,
        _ => PositionMode::Centered,
    }
}

fuzz_target!(|input: Input| {
    let rect = Rect::new(input.rect.0, input.rect.1, input.rect.2, input.rect.3);
    let point = input.point.map(|(x, y)| Point::new(x, y));
    let Some(target) = Target::from_parts(Some(rect), point) else {
        return;
    };

    let request = PositioningRequest::new(target)
        .align(horizontal(input.align.0), vertical(input.align.1))
        .offset(input.offset.0, input.offset.1)
        .no_horizontal_overlap(input.no_overlap.0)
        .no_vertical_overlap(input.no_overlap.1)
        .flip(input.flip)
        .fit_to_screen(input.fit)
        .mode(mode(input.mode));
    let metrics = PanelMetrics::new(Size::new(input.panel.0, input.panel.1))
        .with_scale(Scale::new(input.scale.0, input.scale.1));

    // Must never panic, whatever the input.
    let Some(placement) = resolve(
        metrics,
        Size::new(input.viewport.0, input.viewport.1),
        Point::new(input.scroll.0, input.scroll.1),
        &request,
        input.gap,
    ) else {
        return;
    };

    for max in [placement.max_width, placement.max_height].into_iter().flatten() {
        assert!(max >= 0.0, "negative max extent: {placement:?}");
    }
    if placement.is_constrained() {
        assert!(
            input.fit || matches!(request.mode, PositionMode::Fixed),
            "unconstrained request was shrunk: {placement:?}"
        );
    }
});
