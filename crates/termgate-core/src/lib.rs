#![forbid(unsafe_code)]

//! Core of the termgate terminal I/O layer: geometry, the normalized event
//! model, the mouse/key wire codecs, and inbound input decoding.
//!
//! Everything here is pure and synchronous. The terminal emulator
//! (`termgate-vt`) and the hit-test dispatcher (`termgate-hit`) both build on
//! these types so that synthesized and decoded input agree bit-exactly.

pub mod config;
pub mod event;
pub mod geometry;
pub mod input_parser;
pub mod key_codec;
pub mod logging;
pub mod mouse_codec;
pub mod normalize;

pub use config::ConfigError;
pub use event::{
    Event, KeyCode, KeyEvent, KeySpecError, Modifiers, MouseAction, MouseButton, MouseEvent,
    PasteEvent, parse_key_spec,
};
pub use geometry::Rect;
pub use input_parser::InputParser;
pub use key_codec::{encode_key, encode_paste};
pub use mouse_codec::{MouseFormat, encode_mouse, encode_sgr, encode_x10};
pub use normalize::MouseNormalizer;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
