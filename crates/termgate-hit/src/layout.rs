//! Layout tree input and handler tables.
//!
//! The layout engine is external; it hands the registry a tree of
//! [`LayoutNode`]s with absolute bounds. Nodes that declare at least one
//! handler become hit-test entries.

use std::fmt;
use std::rc::Rc;

use termgate_core::Rect;

use crate::pointer::{KIND_COUNT, PointerEvent, PointerEventKind};

/// Caller-supplied element identity.
///
/// Ids must stay stable across frames for the same logical element; hover
/// tracking and double-click pairing compare them between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl From<u64> for ElementId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pointer handler.
pub type Handler = Rc<dyn Fn(&mut PointerEvent)>;

/// Handler table, one optional slot per [`PointerEventKind`].
#[derive(Clone, Default)]
pub struct Handlers {
    slots: [Option<Handler>; KIND_COUNT],
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

macro_rules! handler_setters {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(self, handler: impl Fn(&mut PointerEvent) + 'static) -> Self {
                self.on(PointerEventKind::$kind, handler)
            }
        )*
    };
}

impl Handlers {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for `kind`, replacing any previous one.
    #[must_use]
    pub fn on(
        mut self,
        kind: PointerEventKind,
        handler: impl Fn(&mut PointerEvent) + 'static,
    ) -> Self {
        self.slots[kind.index()] = Some(Rc::new(handler));
        self
    }

    handler_setters! {
        /// Left (or middle) click that did not complete a double click.
        on_click => Click;
        /// Second left click at the same cell within the double-click window.
        on_double_click => DoubleClick;
        on_mouse_down => MouseDown;
        on_mouse_up => MouseUp;
        /// Pointer motion over the element (plain move or drag).
        on_mouse_move => MouseMove;
        /// Pointer entered the element. Not bubbled.
        on_mouse_enter => MouseEnter;
        /// Pointer left the element. Not bubbled.
        on_mouse_leave => MouseLeave;
        /// Right click.
        on_context_menu => ContextMenu;
        /// One wheel notch; the direction is in `PointerEvent::button`.
        on_scroll => Scroll;
    }

    /// The handler for `kind`, if declared.
    #[must_use]
    pub fn get(&self, kind: PointerEventKind) -> Option<&Handler> {
        self.slots[kind.index()].as_ref()
    }

    #[must_use]
    pub fn has(&self, kind: PointerEventKind) -> bool {
        self.get(kind).is_some()
    }

    /// True when no handler is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Declared kinds, in [`PointerEventKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = PointerEventKind> + '_ {
        PointerEventKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
    }
}

/// One node of the computed layout tree.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: ElementId,
    /// Absolute screen bounds.
    pub bounds: Rect,
    pub handlers: Handlers,
    /// Children in paint order (later paints on top).
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// A node without handlers or children.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            handlers: Handlers::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    #[must_use]
    pub fn child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = LayoutNode>) -> Self {
        self.children.extend(children);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handlers() {
        let h = Handlers::new();
        assert!(h.is_empty());
        assert_eq!(h.kinds().count(), 0);
    }

    #[test]
    fn builder_sets_slots() {
        let h = Handlers::new().on_click(|_| {}).on_scroll(|_| {});
        assert!(!h.is_empty());
        assert!(h.has(PointerEventKind::Click));
        assert!(!h.has(PointerEventKind::DoubleClick));
        assert_eq!(
            h.kinds().collect::<Vec<_>>(),
            vec![PointerEventKind::Click, PointerEventKind::Scroll]
        );
        assert_eq!(format!("{h:?}"), "{Click, Scroll}");
    }

    #[test]
    fn layout_builder_nests() {
        let tree = LayoutNode::new(ElementId(1), Rect::new(0, 0, 10, 10))
            .child(LayoutNode::new(ElementId(2), Rect::new(1, 1, 2, 2)))
            .children([LayoutNode::new(ElementId(3), Rect::new(3, 3, 2, 2))]);
        assert_eq!(tree.id, ElementId(1));
        let ids: Vec<_> = tree.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ElementId(2), ElementId(3)]);
    }

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId(42).to_string(), "#42");
    }
}
