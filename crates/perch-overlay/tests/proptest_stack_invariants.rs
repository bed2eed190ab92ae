//! Property-based invariant tests for the overlay manager's shared state.
//!
//! 1. Exactly one topmost panel whenever any panel is mounted
//! 2. The topmost panel is never shielded
//! 3. Registry membership matches live panels
//! 4. Scroll lock is held iff a locking panel is mounted
//! 5. Scroll-lock reference counting is order independent

use std::time::Duration;

use perch_core::event::{Event, KeyCode, KeyEvent, NodeId, PointerEvent};
use perch_core::geometry::{Point, Size};
use perch_overlay::{MemoryHost, OverlayManager, PanelOptions, TransitionConfig};
use proptest::prelude::*;
use web_time::Instant;

const SLOTS: u64 = 6;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Open { slot: u64, modal: bool, animated: bool },
    Close(u64),
    Click(Option<u64>),
    Escape,
    Tick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1..=SLOTS, any::<bool>(), any::<bool>())
            .prop_map(|(slot, modal, animated)| Op::Open { slot, modal, animated }),
        2 => (1..=SLOTS).prop_map(Op::Close),
        1 => proptest::option::of(1..=SLOTS + 2).prop_map(Op::Click),
        1 => Just(Op::Escape),
        2 => (0u64..200).prop_map(Op::Tick),
    ]
}

fn host() -> MemoryHost {
    let mut host = MemoryHost::new(Size::new(1024.0, 768.0));
    for slot in 1..=SLOTS {
        host.set_node(NodeId(slot), Some(Size::new(120.0, 80.0)), None);
    }
    host
}

fn apply(manager: &mut OverlayManager, host: &mut MemoryHost, op: &Op, now: Instant) {
    match *op {
        Op::Open { slot, modal, animated } => {
            let transition = if animated {
                TransitionConfig::default()
            } else {
                TransitionConfig::none()
            };
            let options = PanelOptions::new(NodeId(slot))
                .modal(modal)
                .locks_scroll(true)
                .transition(transition);
            manager.open_panel(host, options);
        }
        Op::Close(slot) => {
            if let Some(id) = manager.panel_for_root(NodeId(slot)) {
                manager.close_panel(host, id).expect("live panel");
            }
        }
        Op::Click(target) => {
            let click = PointerEvent::down(Point::new(5.0, 5.0), target.map(NodeId));
            manager.handle_event(host, &Event::Pointer(click), now);
        }
        Op::Escape => {
            manager.handle_event(host, &Event::Key(KeyEvent::new(KeyCode::Escape)), now);
        }
        Op::Tick(ms) => {
            manager.tick(host, Duration::from_millis(ms), now);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1–4. Stack and lock invariants under arbitrary operation sequences
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stack_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut host = host();
        let mut manager = OverlayManager::default();
        let now = Instant::now();

        for op in &ops {
            apply(&mut manager, &mut host, op, now);

            let ids = manager.registry().ids();
            prop_assert_eq!(ids.len(), manager.len(), "registry mirrors live panels");
            for &id in &ids {
                prop_assert!(manager.contains(id));
            }

            let topmost: Vec<_> = ids.iter().filter(|&&id| manager.is_topmost(id)).collect();
            if ids.is_empty() {
                prop_assert!(topmost.is_empty());
            } else {
                prop_assert_eq!(topmost.len(), 1, "exactly one topmost panel");
                prop_assert!(!manager.is_shielded(*topmost[0]), "topmost is never shielded");
            }

            prop_assert_eq!(manager.scroll_lock_count(), manager.len());
            prop_assert_eq!(host.scroll_locked, !manager.is_empty());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Reference counting is commutative
// ═══════════════════════════════════════════════════════════════════════

fn close_order() -> impl Strategy<Value = Vec<u64>> {
    (1..=SLOTS).prop_flat_map(|n| Just((1..=n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #[test]
    fn scroll_lock_released_by_last_close(order in close_order()) {
        let mut host = host();
        let mut manager = OverlayManager::default();
        let mut ids = Vec::new();
        for slot in 1..=order.len() as u64 {
            let options = PanelOptions::new(NodeId(slot))
                .locks_scroll(true)
                .transition(TransitionConfig::none());
            ids.push(manager.open_panel(&mut host, options));
        }
        prop_assert!(host.scroll_locked);

        let (last, rest) = order.split_last().expect("at least one panel");
        for slot in rest {
            manager.close_panel(&mut host, ids[(*slot - 1) as usize]).expect("live panel");
            prop_assert!(host.scroll_locked, "still locked while a locking panel is open");
        }
        manager.close_panel(&mut host, ids[(*last - 1) as usize]).expect("live panel");

        prop_assert!(!host.scroll_locked);
        prop_assert!(!manager.is_scroll_locked());
        // One lock edge and one unlock edge, however many panels nested.
        prop_assert_eq!(host.scroll_lock_changes, 2);
    }
}
