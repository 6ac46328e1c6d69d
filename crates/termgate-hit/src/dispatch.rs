//! Mouse event dispatch.
//!
//! [`HitRegistry::handle_mouse_event`] resolves the topmost element under a
//! normalized mouse event and invokes handlers:
//!
//! | Event | Handler |
//! |-------|---------|
//! | move / drag | leave (old target) + enter (new target) on change, then move |
//! | press / release | mouse-down / mouse-up |
//! | left click | double-click when it pairs with the previous click, else click |
//! | middle click | click (never pairs) |
//! | right click | context-menu |
//! | wheel click | scroll, once per notch |
//!
//! Every kind except enter/leave bubbles from the target through its
//! ancestor chain until a handler calls
//! [`stop_propagation`](PointerEvent::stop_propagation).

use std::time::Instant;

use smallvec::SmallVec;
use termgate_core::{MouseAction, MouseButton, MouseEvent, Rect};

use crate::layout::{ElementId, Handler};
use crate::pointer::{PointerEvent, PointerEventKind};
use crate::registry::HitRegistry;

/// The last left click that did not complete a double click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LastClick {
    element: ElementId,
    x: u16,
    y: u16,
    at: Instant,
}

/// Hover and click-pairing memory, owned by the registry.
#[derive(Debug, Clone, Default)]
pub(crate) struct DispatchState {
    pub(crate) hovered: Option<ElementId>,
    last_click: Option<LastClick>,
}

/// Handlers resolved along a bubble path, with the bounds of their element.
type BubblePath = SmallVec<[(ElementId, Rect, Handler); 4]>;

/// The entry under the pointer: its slot in the registry and its id.
///
/// Dispatch works on the slot so that, with duplicate ids, the entry that
/// was actually hit runs its own handlers.
#[derive(Debug, Clone, Copy)]
struct Target {
    slot: usize,
    id: ElementId,
}

impl HitRegistry {
    /// Dispatch a normalized mouse event, timestamped now.
    ///
    /// Returns whether an element was under the pointer.
    pub fn handle_mouse_event(&mut self, event: &MouseEvent) -> bool {
        self.handle_mouse_event_at(event, Instant::now())
    }

    /// Dispatch a normalized mouse event that happened at `now`.
    ///
    /// Returns whether an element was under the pointer.
    pub fn handle_mouse_event_at(&mut self, event: &MouseEvent, now: Instant) -> bool {
        let hit = self.hit_slot(event.x, event.y).map(|slot| Target {
            slot,
            id: self.entries()[slot].id,
        });

        match event.action {
            MouseAction::Move | MouseAction::Drag => {
                self.update_hover(hit, event);
                if let Some(target) = hit {
                    self.fire(PointerEventKind::MouseMove, target.slot, event);
                }
            }
            MouseAction::Press => {
                if let Some(target) = hit {
                    self.fire(PointerEventKind::MouseDown, target.slot, event);
                }
            }
            MouseAction::Release => {
                if let Some(target) = hit {
                    self.fire(PointerEventKind::MouseUp, target.slot, event);
                }
            }
            MouseAction::Click => self.dispatch_click(hit, event, now),
        }

        hit.is_some()
    }

    fn dispatch_click(&mut self, hit: Option<Target>, event: &MouseEvent, now: Instant) {
        match event.button {
            MouseButton::Left => {
                let Some(target) = hit else {
                    self.dispatch.last_click = None;
                    return;
                };
                let window = self.config.double_click_window;
                let pairs = self.dispatch.last_click.is_some_and(|last| {
                    last.element == target.id
                        && (last.x, last.y) == (event.x, event.y)
                        && now.saturating_duration_since(last.at) <= window
                });
                if pairs {
                    termgate_core::trace!(element = target.id.0, "double click");
                    self.dispatch.last_click = None;
                    self.fire(PointerEventKind::DoubleClick, target.slot, event);
                } else {
                    self.dispatch.last_click = Some(LastClick {
                        element: target.id,
                        x: event.x,
                        y: event.y,
                        at: now,
                    });
                    self.fire(PointerEventKind::Click, target.slot, event);
                }
            }
            MouseButton::Middle => {
                if let Some(target) = hit {
                    self.fire(PointerEventKind::Click, target.slot, event);
                }
            }
            MouseButton::Right => {
                if let Some(target) = hit {
                    self.fire(PointerEventKind::ContextMenu, target.slot, event);
                }
            }
            MouseButton::ScrollUp | MouseButton::ScrollDown => {
                if let Some(target) = hit {
                    self.fire(PointerEventKind::Scroll, target.slot, event);
                }
            }
            MouseButton::None => {}
        }
    }

    fn update_hover(&mut self, hit: Option<Target>, event: &MouseEvent) {
        let previous = self.dispatch.hovered;
        let current = hit.map(|target| target.id);
        if previous == current {
            return;
        }
        termgate_core::trace!(from = ?previous, to = ?current, "hover changed");
        self.dispatch.hovered = current;
        // The old target may be gone after a frame rebuild.
        if let Some(slot) = previous.and_then(|old| self.slot_of(old)) {
            self.fire(PointerEventKind::MouseLeave, slot, event);
        }
        if let Some(target) = hit {
            self.fire(PointerEventKind::MouseEnter, target.slot, event);
        }
    }

    /// Collect the handlers for `kind` from the entry at `slot` outward.
    fn bubble_path(&self, kind: PointerEventKind, slot: usize) -> BubblePath {
        let mut path = BubblePath::new();
        let Some(entry) = self.entries().get(slot) else {
            return path;
        };
        if let Some(handler) = entry.handlers.get(kind) {
            path.push((entry.id, entry.bounds, handler.clone()));
        }
        if !kind.bubbles() {
            return path;
        }
        for ancestor in entry.ancestors.iter().filter_map(|id| self.entry(*id)) {
            if let Some(handler) = ancestor.handlers.get(kind) {
                path.push((ancestor.id, ancestor.bounds, handler.clone()));
            }
        }
        path
    }

    /// Run `kind` handlers for the entry at `slot` and its ancestors.
    fn fire(&self, kind: PointerEventKind, slot: usize, event: &MouseEvent) {
        let Some(target) = self.entries().get(slot).map(|entry| entry.id) else {
            return;
        };
        let path = self.bubble_path(kind, slot);
        let mut pointer = PointerEvent::new(
            kind,
            event.position(),
            event.button,
            event.modifiers,
            target,
        );
        for (element, bounds, handler) in path {
            (pointer.x, pointer.y) = bounds.relative(event.x, event.y);
            pointer.current = element;
            handler(&mut pointer);
            if pointer.is_propagation_stopped() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use termgate_core::Modifiers;

    use super::*;
    use crate::config::DispatchConfig;
    use crate::layout::{Handlers, LayoutNode};

    type Log = Rc<RefCell<Vec<String>>>;

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Handlers for every kind, each appending `"<name>:<kind>"` to `log`.
    fn logging_handlers(name: &'static str, log: &Log) -> Handlers {
        PointerEventKind::ALL
            .into_iter()
            .fold(Handlers::new(), |handlers, kind| {
                let log = Rc::clone(log);
                handlers.on(kind, move |ev| {
                    log.borrow_mut().push(format!("{name}:{:?}", ev.kind));
                })
            })
    }

    fn ev(x: u16, y: u16, button: MouseButton, action: MouseAction) -> MouseEvent {
        MouseEvent::new(x, y, button, action)
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        ev(x, y, MouseButton::Left, MouseAction::Click)
    }

    fn hover(x: u16, y: u16) -> MouseEvent {
        ev(x, y, MouseButton::None, MouseAction::Move)
    }

    fn single(log: &Log, rect: Rect) -> HitRegistry {
        let mut reg = HitRegistry::new();
        reg.register_from_layout(
            &LayoutNode::new(ElementId(1), rect).handlers(logging_handlers("a", log)),
        );
        reg
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    // ── Basic routing ──────────────────────────────────────────────

    #[test]
    fn miss_is_noop_returning_false() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        assert!(!reg.handle_mouse_event(&click(10, 10)));
        assert!(take(&log).is_empty());
    }

    #[test]
    fn press_release_route_to_down_up() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        assert!(reg.handle_mouse_event(&ev(1, 1, MouseButton::Left, MouseAction::Press)));
        assert!(reg.handle_mouse_event(&ev(1, 1, MouseButton::Left, MouseAction::Release)));
        assert_eq!(take(&log), vec!["a:MouseDown", "a:MouseUp"]);
    }

    #[test]
    fn right_click_is_context_menu() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        reg.handle_mouse_event(&ev(1, 1, MouseButton::Right, MouseAction::Click));
        assert_eq!(take(&log), vec!["a:ContextMenu"]);
    }

    #[test]
    fn wheel_fires_scroll_per_notch() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        for _ in 0..3 {
            reg.handle_mouse_event(&ev(1, 1, MouseButton::ScrollDown, MouseAction::Click));
        }
        assert_eq!(take(&log), vec!["a:Scroll"; 3]);
    }

    #[test]
    fn handler_receives_relative_and_absolute_coordinates() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut reg = HitRegistry::new();
        let node = LayoutNode::new(ElementId(1), Rect::new(10, 4, 6, 3))
            .handlers(Handlers::new().on_click(move |ev| *sink.borrow_mut() = Some(ev.clone())));
        reg.register_from_layout(&node);
        reg.handle_mouse_event(&click(12, 5).with_modifiers(Modifiers::CTRL));
        let ev = seen.borrow().clone().unwrap();
        assert_eq!((ev.x, ev.y), (2, 1));
        assert_eq!((ev.absolute_x, ev.absolute_y), (12, 5));
        assert_eq!(ev.target, ElementId(1));
        assert_eq!(ev.button, MouseButton::Left);
        assert_eq!(ev.modifiers, Modifiers::CTRL);
    }

    // ── Double click ───────────────────────────────────────────────

    #[test]
    fn second_click_within_window_is_double_click_only() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        let t0 = Instant::now();
        reg.handle_mouse_event_at(&click(1, 1), t0);
        reg.handle_mouse_event_at(&click(1, 1), t0 + Duration::from_millis(300));
        assert_eq!(take(&log), vec!["a:Click", "a:DoubleClick"]);
    }

    #[test]
    fn third_click_starts_new_pair() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        let t0 = Instant::now();
        for ms in [0, 50, 100, 150] {
            reg.handle_mouse_event_at(&click(1, 1), t0 + Duration::from_millis(ms));
        }
        assert_eq!(
            take(&log),
            vec!["a:Click", "a:DoubleClick", "a:Click", "a:DoubleClick"]
        );
    }

    #[test]
    fn slow_or_moved_clicks_do_not_pair() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        let t0 = Instant::now();
        reg.handle_mouse_event_at(&click(1, 1), t0);
        reg.handle_mouse_event_at(&click(1, 1), t0 + Duration::from_millis(301));
        reg.handle_mouse_event_at(&click(2, 1), t0 + Duration::from_millis(302));
        assert_eq!(take(&log), vec!["a:Click"; 3]);
    }

    #[test]
    fn clicks_on_different_elements_do_not_pair() {
        let log = log();
        let mut reg = HitRegistry::new();
        reg.register(ElementId(1), Rect::new(0, 0, 5, 5), logging_handlers("a", &log), []);
        let t0 = Instant::now();
        reg.handle_mouse_event_at(&click(1, 1), t0);
        reg.reset();
        reg.register(ElementId(2), Rect::new(0, 0, 5, 5), logging_handlers("b", &log), []);
        reg.handle_mouse_event_at(&click(1, 1), t0 + Duration::from_millis(10));
        assert_eq!(take(&log), vec!["a:Click", "b:Click"]);
    }

    #[test]
    fn middle_click_never_pairs() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        let t0 = Instant::now();
        let middle = ev(1, 1, MouseButton::Middle, MouseAction::Click);
        reg.handle_mouse_event_at(&middle, t0);
        reg.handle_mouse_event_at(&middle, t0);
        reg.handle_mouse_event_at(&click(1, 1), t0);
        assert_eq!(take(&log), vec!["a:Click"; 3]);
    }

    #[test]
    fn configured_window_is_respected() {
        let log = log();
        let mut reg = HitRegistry::with_config(
            DispatchConfig::default().double_click_window(Duration::from_millis(50)),
        );
        reg.register(ElementId(1), Rect::new(0, 0, 5, 5), logging_handlers("a", &log), []);
        let t0 = Instant::now();
        reg.handle_mouse_event_at(&click(1, 1), t0);
        reg.handle_mouse_event_at(&click(1, 1), t0 + Duration::from_millis(100));
        assert_eq!(take(&log), vec!["a:Click", "a:Click"]);
    }

    // ── Hover ──────────────────────────────────────────────────────

    #[test]
    fn enter_and_leave_fire_once() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        reg.handle_mouse_event(&hover(10, 10));
        reg.handle_mouse_event(&hover(1, 1));
        reg.handle_mouse_event(&hover(2, 1));
        reg.handle_mouse_event(&hover(3, 3));
        reg.handle_mouse_event(&hover(10, 10));
        reg.handle_mouse_event(&hover(11, 10));
        assert_eq!(
            take(&log),
            vec![
                "a:MouseEnter",
                "a:MouseMove",
                "a:MouseMove",
                "a:MouseMove",
                "a:MouseLeave",
            ]
        );
        assert_eq!(reg.hovered(), None);
    }

    #[test]
    fn hover_moves_between_overlapping_elements() {
        let log = log();
        let mut reg = HitRegistry::new();
        reg.register(ElementId(1), Rect::new(0, 0, 10, 10), logging_handlers("a", &log), []);
        reg.register(ElementId(2), Rect::new(5, 5, 5, 5), logging_handlers("b", &log), []);
        reg.handle_mouse_event(&hover(1, 1));
        reg.handle_mouse_event(&hover(6, 6));
        assert_eq!(
            take(&log),
            vec!["a:MouseEnter", "a:MouseMove", "a:MouseLeave", "b:MouseEnter", "b:MouseMove"]
        );
        assert_eq!(reg.hovered(), Some(ElementId(2)));
    }

    #[test]
    fn drag_tracks_hover_like_move() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        reg.handle_mouse_event(&ev(1, 1, MouseButton::Left, MouseAction::Drag));
        assert_eq!(take(&log), vec!["a:MouseEnter", "a:MouseMove"]);
    }

    #[test]
    fn hover_survives_frame_rebuild() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        reg.handle_mouse_event(&hover(1, 1));
        reg.reset();
        reg.register_from_layout(
            &LayoutNode::new(ElementId(1), Rect::new(0, 0, 5, 5))
                .handlers(logging_handlers("a", &log)),
        );
        reg.handle_mouse_event(&hover(2, 2));
        assert_eq!(take(&log), vec!["a:MouseEnter", "a:MouseMove", "a:MouseMove"]);
    }

    #[test]
    fn teardown_forgets_hover() {
        let log = log();
        let mut reg = single(&log, Rect::new(0, 0, 5, 5));
        reg.handle_mouse_event(&hover(1, 1));
        reg.teardown();
        assert_eq!(reg.hovered(), None);
        assert!(reg.is_empty());
    }

    // ── Bubbling ───────────────────────────────────────────────────

    fn nested(log: &Log, stop_in_child: bool) -> HitRegistry {
        let child_log = Rc::clone(log);
        let child = Handlers::new().on_click(move |ev| {
            child_log.borrow_mut().push(format!("child@{},{}", ev.x, ev.y));
            if stop_in_child {
                ev.stop_propagation();
            }
        });
        let tree = LayoutNode::new(ElementId(1), Rect::new(0, 0, 20, 20))
            .handlers(logging_handlers("root", log))
            .child(
                LayoutNode::new(ElementId(2), Rect::new(2, 2, 10, 10))
                    .child(LayoutNode::new(ElementId(3), Rect::new(4, 4, 4, 4)).handlers(child)),
            );
        let mut reg = HitRegistry::new();
        reg.register_from_layout(&tree);
        reg
    }

    #[test]
    fn click_bubbles_to_ancestors() {
        let log = log();
        let mut reg = nested(&log, false);
        reg.handle_mouse_event(&click(5, 6));
        assert_eq!(take(&log), vec!["child@1,2", "root:Click"]);
    }

    #[test]
    fn stop_propagation_blocks_ancestors() {
        let log = log();
        let mut reg = nested(&log, true);
        reg.handle_mouse_event(&click(5, 6));
        assert_eq!(take(&log), vec!["child@1,2"]);
    }

    #[test]
    fn kinds_without_target_handler_still_bubble() {
        let log = log();
        let mut reg = nested(&log, true);
        reg.handle_mouse_event(&ev(5, 6, MouseButton::Right, MouseAction::Click));
        assert_eq!(take(&log), vec!["root:ContextMenu"]);
    }

    #[test]
    fn enter_leave_do_not_bubble() {
        let log = log();
        let mut reg = nested(&log, false);
        reg.handle_mouse_event(&hover(5, 6));
        // The child declares only on_click: enter is not forwarded to the
        // root, but the move bubbles.
        assert_eq!(take(&log), vec!["root:MouseMove"]);
    }

    #[test]
    fn duplicate_ids_dispatch_to_the_entry_hit() {
        let log = log();
        let record = |name: &'static str| {
            let log = Rc::clone(&log);
            Handlers::new().on_click(move |ev| {
                log.borrow_mut().push(format!("{name}@{},{}", ev.x, ev.y));
            })
        };
        let mut reg = HitRegistry::new();
        reg.register(ElementId(7), Rect::new(0, 0, 5, 5), record("first"), []);
        reg.register(ElementId(7), Rect::new(20, 20, 5, 5), record("second"), []);

        reg.handle_mouse_event(&click(2, 2));
        reg.handle_mouse_event(&click(21, 23));
        assert_eq!(take(&log), vec!["first@2,2", "second@1,3"]);
    }

    #[test]
    fn removed_ancestor_is_skipped() {
        let log = log();
        let mut reg = nested(&log, false);
        assert!(reg.remove(ElementId(1)));
        reg.handle_mouse_event(&click(5, 6));
        assert_eq!(take(&log), vec!["child@1,2"]);
    }
}
