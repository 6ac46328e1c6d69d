#![forbid(unsafe_code)]

//! Hit testing and pointer-event dispatch.
//!
//! A [`HitRegistry`] is rebuilt once per frame from the layout tree
//! ([`LayoutNode`]); it maps screen cells to the topmost element carrying
//! pointer handlers. The same registry owns the dispatch state (hover target
//! and double-click pairing) so that [`HitRegistry::handle_mouse_event`] can
//! turn normalized [`MouseEvent`](termgate_core::MouseEvent)s into handler
//! calls with enter/leave, double-click and bubbling semantics.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use termgate_core::{MouseAction, MouseButton, MouseEvent, Rect};
//! use termgate_hit::{ElementId, Handlers, HitRegistry, LayoutNode};
//!
//! let clicks = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&clicks);
//! let root = LayoutNode::new(ElementId(1), Rect::new(0, 0, 20, 5))
//!     .handlers(Handlers::new().on_click(move |_| counter.set(counter.get() + 1)));
//!
//! let mut registry = HitRegistry::new();
//! registry.reset();
//! registry.register_from_layout(&root);
//!
//! let click = MouseEvent::new(5, 2, MouseButton::Left, MouseAction::Click);
//! assert!(registry.handle_mouse_event(&click));
//! assert_eq!(clicks.get(), 1);
//! ```

pub mod config;
mod dispatch;
pub mod layout;
pub mod pointer;
pub mod registry;

pub use config::DispatchConfig;
pub use layout::{ElementId, Handler, Handlers, LayoutNode};
pub use pointer::{PointerEvent, PointerEventKind};
pub use registry::{HitEntry, HitRegistry};
