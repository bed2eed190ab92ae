#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use perch_core::event::{Event, KeyCode, KeyEvent, NodeId, PointerEvent, PointerEventKind};
use perch_core::geometry::{Point, Size};
use perch_overlay::{
    CloseOthers, MemoryHost, OverlayManager, PanelFlags, PanelOptions, TransitionConfig,
};
use web_time::Instant;

const SLOTS: u64 = 8;

#[derive(Debug, Arbitrary)]
enum Op {
    Open { slot: u8, flags: u16, animated: bool, close_others: bool },
    Close(u8),
    Finish { slot: u8, epoch_skew: u8 },
    Click(Option<u8>),
    Hover { slot: u8, enter: bool },
    Escape,
    PopState,
    Resize(u16, u16),
    Tick(u16),
}

fn node(raw: u8) -> NodeId {
    NodeId(u64::from(raw) % SLOTS + 1)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut host = MemoryHost::new(Size::new(1024.0, 768.0));
    for slot in 1..=SLOTS {
        host.set_node(NodeId(slot), Some(Size::new(80.0 * slot as f64, 60.0)), None);
    }
    let mut manager = OverlayManager::default();
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;

    for op in ops.iter().take(256) {
        let now = start + elapsed;
        match *op {
            Op::Open { slot, flags, animated, close_others } => {
                let transition = if animated {
                    TransitionConfig::default()
                } else {
                    TransitionConfig::none()
                };
                let close_others = if close_others { CloseOthers::Any } else { CloseOthers::Never };
                let options = PanelOptions::new(node(slot))
                    .flags(PanelFlags::from_bits_truncate(flags))
                    .close_others(close_others)
                    .transition(transition)
                    .hover_close_delay(Duration::from_millis(50));
                manager.open_panel(&mut host, options);
            }
            Op::Close(slot) => {
                if let Some(id) = manager.panel_for_root(node(slot)) {
                    manager.close_panel(&mut host, id).expect("live panel");
                }
            }
            Op::Finish { slot, epoch_skew } => {
                if let Some(id) = manager.panel_for_root(node(slot)) {
                    let epoch = manager.epoch(id).expect("live panel");
                    let epoch = epoch.saturating_sub(u64::from(epoch_skew % 3));
                    manager.transition_finished(&mut host, id, epoch);
                }
            }
            Op::Click(target) => {
                let click = PointerEvent::down(Point::ORIGIN, target.map(node));
                manager.handle_event(&mut host, &Event::Pointer(click), now);
            }
            Op::Hover { slot, enter } => {
                let kind = if enter { PointerEventKind::Enter } else { PointerEventKind::Leave };
                let event = PointerEvent::new(kind, Point::ORIGIN).with_target(Some(node(slot)));
                manager.handle_event(&mut host, &Event::Pointer(event), now);
            }
            Op::Escape => {
                manager.handle_event(&mut host, &Event::Key(KeyEvent::new(KeyCode::Escape)), now);
            }
            Op::PopState => {
                manager.handle_event(&mut host, &Event::PopState, now);
            }
            Op::Resize(w, h) => {
                host.viewport = Size::new(f64::from(w), f64::from(h));
                let resize = Event::Resize(host.viewport);
                manager.handle_event(&mut host, &resize, now);
            }
            Op::Tick(ms) => {
                let delta = Duration::from_millis(u64::from(ms % 500));
                elapsed += delta;
                manager.tick(&mut host, delta, start + elapsed);
            }
        }

        // Post-conditions that must always hold:
        let ids = manager.registry().ids();
        assert_eq!(ids.len(), manager.len(), "registry out of sync with live panels");
        if let Some(&top) = ids.last() {
            assert!(manager.is_topmost(top));
            assert!(!manager.is_shielded(top), "topmost panel shielded");
        }
        assert_eq!(host.scroll_locked, manager.is_scroll_locked(), "host lock out of sync");
    }
});
