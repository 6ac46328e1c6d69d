//! Events delivered to element handlers.

use termgate_core::{Modifiers, MouseButton};

use crate::layout::ElementId;

/// The nine handler kinds an element can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Click,
    DoubleClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseEnter,
    MouseLeave,
    ContextMenu,
    Scroll,
}

/// Number of [`PointerEventKind`] variants.
pub(crate) const KIND_COUNT: usize = 9;

impl PointerEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; KIND_COUNT] = [
        Self::Click,
        Self::DoubleClick,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::MouseEnter,
        Self::MouseLeave,
        Self::ContextMenu,
        Self::Scroll,
    ];

    /// Slot index into a handler table.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Whether the event walks up the ancestor chain after the target.
    ///
    /// Enter and leave concern the target alone.
    #[must_use]
    pub const fn bubbles(self) -> bool {
        !matches!(self, Self::MouseEnter | Self::MouseLeave)
    }
}

/// A pointer event as seen by one handler.
///
/// The same value is handed to each handler along the bubble path; only
/// `x`/`y` and `current` change between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Column relative to the current element's bounds.
    pub x: u16,
    /// Row relative to the current element's bounds.
    pub y: u16,
    /// Screen column.
    pub absolute_x: u16,
    /// Screen row.
    pub absolute_y: u16,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    /// Element the pointer is over (where bubbling started).
    pub target: ElementId,
    /// Element whose handler is running.
    pub current: ElementId,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub(crate) fn new(
        kind: PointerEventKind,
        (absolute_x, absolute_y): (u16, u16),
        button: MouseButton,
        modifiers: Modifiers,
        target: ElementId,
    ) -> Self {
        Self {
            kind,
            x: 0,
            y: 0,
            absolute_x,
            absolute_y,
            button,
            modifiers,
            target,
            current: target,
            propagation_stopped: false,
        }
    }

    /// Keep ancestors from seeing this event. Future events are unaffected.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
