//! Property tests for the gesture simulator.
//!
//! 1. Dispatching gestures directly and through the SGR wire loop yields the
//!    same handler calls.
//! 2. The tracked position is always the last event's cell.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use proptest::prelude::*;
use termgate_core::{MouseFormat, Rect};
use termgate_harness::{DispatchSink, GestureSimulator, InputSink, Loopback, ScrollDirection};
use termgate_hit::{ElementId, Handlers, HitRegistry, PointerEventKind};
use termgate_vt::Terminal;

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Click(u16, u16),
    RightClick(u16, u16),
    MiddleClick(u16, u16),
    DoubleClick(u16, u16),
    Down(u16, u16),
    Up(u16, u16),
    Drag((u16, u16), (u16, u16), u16),
    Scroll(u16, u16, bool, u16),
    Hover(u16, u16),
}

impl Gesture {
    fn end(self) -> Option<(u16, u16)> {
        match self {
            Self::Click(x, y)
            | Self::RightClick(x, y)
            | Self::MiddleClick(x, y)
            | Self::DoubleClick(x, y)
            | Self::Down(x, y)
            | Self::Up(x, y)
            | Self::Hover(x, y)
            | Self::Scroll(x, y, _, _) => Some((x, y)),
            Self::Drag(_, to, _) => Some(to),
        }
    }

    fn run<S: InputSink>(self, sim: &mut GestureSimulator<S>) {
        match self {
            Self::Click(x, y) => {
                sim.click(x, y);
            }
            Self::RightClick(x, y) => {
                sim.right_click(x, y);
            }
            Self::MiddleClick(x, y) => {
                sim.middle_click(x, y);
            }
            Self::DoubleClick(x, y) => {
                sim.double_click(x, y);
            }
            Self::Down(x, y) => {
                sim.mouse_down(x, y);
            }
            Self::Up(x, y) => {
                sim.mouse_up(x, y);
            }
            Self::Drag(from, to, steps) => {
                sim.drag_with_steps(from, to, steps);
            }
            Self::Scroll(x, y, up, amount) => {
                let direction = if up {
                    ScrollDirection::Up
                } else {
                    ScrollDirection::Down
                };
                sim.scroll(x, y, direction, amount);
            }
            Self::Hover(x, y) => {
                sim.hover(x, y);
            }
        }
    }
}

fn point() -> impl Strategy<Value = (u16, u16)> {
    (0u16..30, 0u16..12)
}

fn gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        point().prop_map(|(x, y)| Gesture::Click(x, y)),
        point().prop_map(|(x, y)| Gesture::RightClick(x, y)),
        point().prop_map(|(x, y)| Gesture::MiddleClick(x, y)),
        point().prop_map(|(x, y)| Gesture::DoubleClick(x, y)),
        point().prop_map(|(x, y)| Gesture::Down(x, y)),
        point().prop_map(|(x, y)| Gesture::Up(x, y)),
        (point(), point(), 0u16..6).prop_map(|(a, b, n)| Gesture::Drag(a, b, n)),
        (point(), any::<bool>(), 0u16..4).prop_map(|((x, y), up, n)| Gesture::Scroll(x, y, up, n)),
        point().prop_map(|(x, y)| Gesture::Hover(x, y)),
    ]
}

type Log = Rc<RefCell<Vec<(ElementId, PointerEventKind, u16, u16)>>>;

fn registry(log: &Log) -> HitRegistry {
    let mut registry = HitRegistry::new();
    for (id, rect, parent) in [
        (1, Rect::new(0, 0, 20, 8), None),
        (2, Rect::new(2, 1, 6, 3), Some(1)),
        (3, Rect::new(10, 2, 15, 8), None),
    ] {
        let handlers = PointerEventKind::ALL.into_iter().fold(Handlers::new(), |h, kind| {
            let log = Rc::clone(log);
            h.on(kind, move |ev| {
                log.borrow_mut().push((ev.current, ev.kind, ev.x, ev.y));
            })
        });
        registry.register(ElementId(id), rect, handlers, parent.map(ElementId));
    }
    registry
}

proptest! {
    #[test]
    fn wire_loop_matches_direct_dispatch(gestures in proptest::collection::vec(gesture(), 0..24)) {
        let direct_log = Log::default();
        let mut direct = GestureSimulator::new(DispatchSink::new(registry(&direct_log)));

        let wire_log = Log::default();
        let mut wire_registry = registry(&wire_log);
        let mut loopback = Loopback::new(Terminal::new(30, 12));
        loopback.sync_mouse_mode(&wire_registry);
        let mut wire = GestureSimulator::new(loopback).mouse_format(MouseFormat::Sgr);

        let now = direct.sink().now();
        for g in &gestures {
            g.run(&mut direct);
            g.run(&mut wire);
        }
        wire.sink_mut().pump_at(&mut wire_registry, now);

        prop_assert_eq!(&*direct_log.borrow(), &*wire_log.borrow());
        prop_assert_eq!(direct.sink().registry().hovered(), wire_registry.hovered());
    }

    #[test]
    fn position_tracks_last_event(gestures in proptest::collection::vec(gesture(), 1..16)) {
        let mut sim = GestureSimulator::new(DispatchSink::new(HitRegistry::new()));
        for g in &gestures {
            g.run(&mut sim);
        }
        let expected = gestures.last().and_then(|g| g.end());
        prop_assert_eq!(Some(sim.position()), expected);
    }
}

#[test]
fn wire_loop_uses_a_single_timestamp() {
    let log = Log::default();
    let mut registry = registry(&log);
    let mut lb = Loopback::new(Terminal::new(30, 12));
    lb.sync_mouse_mode(&registry);
    let mut sim = GestureSimulator::new(lb);
    sim.double_click(3, 2);
    sim.sink_mut().pump_at(&mut registry, Instant::now());
    assert!(
        log.borrow()
            .iter()
            .any(|(id, kind, _, _)| *id == ElementId(2) && *kind == PointerEventKind::DoubleClick)
    );
}
