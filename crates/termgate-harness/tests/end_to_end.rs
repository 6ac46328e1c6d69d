//! Gestures driven through the full wire loop: simulator, terminal encoder,
//! input decoder, click normalizer, hit-test dispatch.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use termgate_core::{Event, KeyCode, KeyEvent, MouseFormat, Rect};
use termgate_harness::{DispatchSink, GestureSimulator, Loopback, ScrollDirection};
use termgate_hit::{ElementId, Handlers, HitRegistry, LayoutNode, PointerEventKind};
use termgate_vt::Terminal;

type Log = Rc<RefCell<Vec<(u64, PointerEventKind)>>>;

fn logging(id: u64, log: &Log) -> Handlers {
    PointerEventKind::ALL
        .into_iter()
        .fold(Handlers::new(), |h, kind| {
            let log = Rc::clone(log);
            h.on(kind, move |ev| {
                if ev.current == ev.target {
                    log.borrow_mut().push((id, ev.kind));
                }
            })
        })
}

/// A toolbar (1) holding two buttons (2, 3), plus a list (4) below it.
fn frame(log: &Log) -> HitRegistry {
    let tree = LayoutNode::new(ElementId(100), Rect::new(0, 0, 40, 12)).children([
        LayoutNode::new(ElementId(1), Rect::new(0, 0, 40, 3))
            .handlers(logging(1, log))
            .children([
                LayoutNode::new(ElementId(2), Rect::new(1, 1, 8, 1)).handlers(logging(2, log)),
                LayoutNode::new(ElementId(3), Rect::new(10, 1, 8, 1)).handlers(logging(3, log)),
            ]),
        LayoutNode::new(ElementId(4), Rect::new(0, 4, 40, 8)).handlers(logging(4, log)),
    ]);
    let mut registry = HitRegistry::new();
    registry.register_from_layout(&tree);
    registry
}

fn kinds_for(log: &Log, id: u64) -> Vec<PointerEventKind> {
    log.borrow()
        .iter()
        .filter(|(target, _)| *target == id)
        .map(|(_, kind)| *kind)
        .collect()
}

fn count(log: &Log, id: u64, kind: PointerEventKind) -> usize {
    kinds_for(log, id).iter().filter(|k| **k == kind).count()
}

fn loopback(format: MouseFormat, registry: &HitRegistry) -> GestureSimulator<Loopback> {
    let mut lb = Loopback::new(Terminal::new(40, 12));
    assert!(lb.sync_mouse_mode(registry));
    GestureSimulator::new(lb).mouse_format(format)
}

// ── Clicks ──────────────────────────────────────────────────────────────

#[test]
fn double_click_over_the_wire_in_both_formats() {
    for format in [MouseFormat::Sgr, MouseFormat::X10] {
        let log = Log::default();
        let mut registry = frame(&log);
        let mut sim = loopback(format, &registry);

        assert!(sim.double_click(3, 1));
        sim.sink_mut().pump_at(&mut registry, Instant::now());

        assert_eq!(count(&log, 2, PointerEventKind::Click), 1, "{format:?}");
        assert_eq!(count(&log, 2, PointerEventKind::DoubleClick), 1, "{format:?}");
        assert_eq!(count(&log, 2, PointerEventKind::MouseDown), 2, "{format:?}");
    }
}

#[test]
fn clicks_in_separate_pumps_respect_the_window() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::Sgr, &registry);
    let t0 = Instant::now();

    sim.click(12, 1);
    sim.sink_mut().pump_at(&mut registry, t0);
    sim.click(12, 1);
    sim.sink_mut().pump_at(&mut registry, t0 + Duration::from_millis(500));

    assert_eq!(count(&log, 3, PointerEventKind::Click), 2);
    assert_eq!(count(&log, 3, PointerEventKind::DoubleClick), 0);
}

#[test]
fn right_click_opens_context_menu() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::Sgr, &registry);
    sim.right_click(20, 6);
    sim.sink_mut().pump(&mut registry);
    assert_eq!(count(&log, 4, PointerEventKind::ContextMenu), 1);
    assert_eq!(count(&log, 4, PointerEventKind::Click), 0);
}

#[test]
fn click_on_empty_space_hits_nothing() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::Sgr, &registry);
    sim.click(39, 3);
    assert_eq!(sim.sink_mut().pump(&mut registry), 0);
    assert!(log.borrow().is_empty());
}

// ── Hover, drag, scroll ─────────────────────────────────────────────────

#[test]
fn hover_walk_enters_and_leaves_once() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::Sgr, &registry);
    for x in 0..20 {
        sim.hover(x, 1);
    }
    sim.sink_mut().pump(&mut registry);

    for id in [2, 3] {
        assert_eq!(count(&log, id, PointerEventKind::MouseEnter), 1, "#{id}");
        assert_eq!(count(&log, id, PointerEventKind::MouseLeave), 1, "#{id}");
    }
    assert_eq!(count(&log, 2, PointerEventKind::MouseMove), 8);
    assert_eq!(registry.hovered(), Some(ElementId(1)));
}

#[test]
fn drag_off_a_button_is_not_a_click() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::Sgr, &registry);
    sim.drag((2, 1), (20, 8));
    sim.sink_mut().pump(&mut registry);

    assert_eq!(kinds_for(&log, 2).first(), Some(&PointerEventKind::MouseDown));
    assert_eq!(count(&log, 4, PointerEventKind::MouseUp), 1);
    assert!(
        !log.borrow()
            .iter()
            .any(|(_, kind)| *kind == PointerEventKind::Click)
    );
}

#[test]
fn scroll_notches_arrive_individually() {
    let log = Log::default();
    let mut registry = frame(&log);
    let mut sim = loopback(MouseFormat::X10, &registry);
    sim.scroll(5, 6, ScrollDirection::Down, 4);
    sim.sink_mut().pump(&mut registry);
    assert_eq!(count(&log, 4, PointerEventKind::Scroll), 4);
}

// ── Bubbling and frames ─────────────────────────────────────────────────

#[test]
fn stop_propagation_keeps_toolbar_quiet() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (button, toolbar) = (Rc::clone(&seen), Rc::clone(&seen));
    let tree = LayoutNode::new(ElementId(1), Rect::new(0, 0, 40, 3))
        .handlers(Handlers::new().on_click(move |_| toolbar.borrow_mut().push("toolbar")))
        .child(LayoutNode::new(ElementId(2), Rect::new(1, 1, 8, 1)).handlers(
            Handlers::new().on_click(move |ev| {
                button.borrow_mut().push("button");
                ev.stop_propagation();
            }),
        ));
    let mut registry = HitRegistry::new();
    registry.register_from_layout(&tree);

    let mut sim = GestureSimulator::new(DispatchSink::new(registry));
    sim.click(2, 1);
    sim.click(20, 1);
    assert_eq!(*seen.borrow(), vec!["button", "toolbar"]);
}

#[test]
fn hover_survives_frame_rebuilds() {
    let log = Log::default();
    let mut sim = GestureSimulator::new(DispatchSink::new(frame(&log)));
    sim.hover(2, 1);
    for _ in 0..3 {
        let registry = sim.sink_mut().registry_mut();
        registry.reset();
        registry.register_from_layout(
            &LayoutNode::new(ElementId(2), Rect::new(1, 1, 8, 1)).handlers(logging(2, &log)),
        );
        sim.hover(3, 1);
    }
    assert_eq!(count(&log, 2, PointerEventKind::MouseEnter), 1);
    assert_eq!(count(&log, 2, PointerEventKind::MouseMove), 4);
}

#[test]
fn advancing_the_clock_splits_a_double_click() {
    let log = Log::default();
    let mut sim = GestureSimulator::new(DispatchSink::new(frame(&log)));
    sim.click(3, 1);
    sim.sink_mut().advance(Duration::from_millis(301));
    sim.click(3, 1);
    assert_eq!(count(&log, 2, PointerEventKind::Click), 2);
    assert_eq!(count(&log, 2, PointerEventKind::DoubleClick), 0);
}

// ── Keyboard ────────────────────────────────────────────────────────────

#[test]
fn typed_text_decodes_back_to_keys() {
    let mut registry = HitRegistry::new();
    let mut sim = GestureSimulator::new(Loopback::new(Terminal::new(40, 12)));
    sim.type_text("ok\n");
    sim.key_spec("ctrl+c").unwrap();
    sim.sink_mut().pump(&mut registry);

    let codes: Vec<_> = sim
        .sink()
        .received()
        .iter()
        .filter_map(|e| match e {
            Event::Key(k) => Some(*k),
            _ => None,
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            KeyEvent::new(KeyCode::Char('o')),
            KeyEvent::new(KeyCode::Char('k')),
            KeyEvent::new(KeyCode::Enter),
            termgate_core::parse_key_spec("ctrl+c").unwrap(),
        ]
    );
}
