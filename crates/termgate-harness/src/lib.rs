#![forbid(unsafe_code)]

//! Scripted input for termgate.
//!
//! - [`GestureSimulator`] turns gestures (click, drag, scroll, typing) into
//!   raw key and mouse events.
//! - [`InputSink`] is where those events go: a [`Terminal`] (which encodes
//!   them to wire bytes), a [`DispatchSink`] (which dispatches them straight
//!   into a [`HitRegistry`]), or a [`Loopback`] (which does both, decoding
//!   the terminal's bytes back into events before dispatch).
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use termgate_core::Rect;
//! use termgate_harness::{DispatchSink, GestureSimulator};
//! use termgate_hit::{ElementId, Handlers, HitRegistry, LayoutNode};
//!
//! let doubles = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&doubles);
//! let mut registry = HitRegistry::new();
//! registry.register_from_layout(
//!     &LayoutNode::new(ElementId(7), Rect::new(0, 0, 10, 3))
//!         .handlers(Handlers::new().on_double_click(move |_| counter.set(counter.get() + 1))),
//! );
//!
//! let mut sim = GestureSimulator::new(DispatchSink::new(registry));
//! sim.double_click(4, 1);
//! assert_eq!(doubles.get(), 1);
//! assert_eq!(sim.position(), (4, 1));
//! ```
//!
//! [`Terminal`]: termgate_vt::Terminal
//! [`HitRegistry`]: termgate_hit::HitRegistry

pub mod gesture;
pub mod loopback;
pub mod sink;

pub use gesture::{GestureConfig, GestureSimulator, ScrollDirection};
pub use loopback::Loopback;
pub use sink::{DispatchSink, InputSink};
