#![forbid(unsafe_code)]

//! Headless terminal state machine.
//!
//! `termgate-vt` models what a terminal does with the bytes an application
//! writes to it (cursor motion, erase, modes, title) and synthesizes the
//! bytes a terminal would send back for keyboard, mouse and paste input.
//!
//! # Primary responsibilities
//!
//! - **Grid**: 2D cell matrix for the visible screen.
//! - **Cell**: character content + SGR attributes.
//! - **Parser**: byte-driven VT state machine (Ground / Esc / Csi / Osc).
//! - **Cursor**: position and visibility, clamped to the grid.
//! - **Modes**: mouse tracking, bracketed paste and alternate screen.
//! - **Terminal**: ties the above together and notifies listeners of
//!   outbound data and resizes.
//!
//! # Design principles
//!
//! - **No I/O**: the host supplies bytes and consumes listener callbacks.
//! - **Deterministic**: identical byte sequences always produce identical state.
//! - **Never fails**: malformed or unsupported sequences are discarded.

pub mod cell;
pub mod config;
pub mod cursor;
pub mod grid;
pub mod modes;
pub mod parser;
pub mod terminal;

pub use cell::{Cell, Color, SgrAttrs, SgrFlags};
pub use config::TerminalConfig;
pub use cursor::{Cursor, SavedCursor};
pub use grid::Grid;
pub use modes::{DecMode, Modes};
pub use parser::{Action, Parser};
pub use terminal::{ListenerId, Terminal, TerminalEvent};
