#![forbid(unsafe_code)]

//! termgate public facade.
//!
//! Re-exports the terminal state machine, codecs, hit-test registry and
//! gesture simulator, plus a prelude for tests and tools.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use termgate_core::config::ConfigParse;
pub use termgate_core::{
    ConfigError, Event, InputParser, KeyCode, KeyEvent, KeySpecError, Modifiers, MouseAction,
    MouseButton, MouseEvent, MouseFormat, MouseNormalizer, PasteEvent, Rect, encode_key,
    encode_mouse, encode_paste, encode_sgr, encode_x10, parse_key_spec,
};

// --- Terminal re-exports ---------------------------------------------------

pub use termgate_vt::{ListenerId, Modes, Terminal, TerminalConfig, TerminalEvent};

// --- Hit-test re-exports ---------------------------------------------------

pub use termgate_hit::{
    DispatchConfig, ElementId, Handlers, HitEntry, HitRegistry, LayoutNode, PointerEvent,
    PointerEventKind,
};

// --- Harness re-exports ----------------------------------------------------

#[cfg(feature = "harness")]
pub use termgate_harness::{
    DispatchSink, GestureConfig, GestureSimulator, InputSink, Loopback, ScrollDirection,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for termgate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A key spec such as `"ctrl+c"` could not be parsed.
    KeySpec(KeySpecError),
    /// An environment value was rejected.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeySpec(err) => write!(f, "invalid key spec: {err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeySpec(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<KeySpecError> for Error {
    fn from(err: KeySpecError) -> Self {
        Self::KeySpec(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for termgate APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Accept a parsed config only if every value was valid.
///
/// The first rejected value becomes the error; use the
/// [`ConfigParse`] directly to keep defaults and report all diagnostics.
pub fn strict<T>(parsed: ConfigParse<T>) -> Result<T> {
    match parsed.errors.into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(parsed.config),
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ElementId, Error, Event, Handlers, HitRegistry, KeyCode, KeyEvent, LayoutNode, Modifiers,
        MouseAction, MouseButton, MouseEvent, MouseFormat, PointerEvent, Rect, Result, Terminal,
    };

    #[cfg(feature = "harness")]
    pub use crate::{DispatchSink, GestureSimulator, Loopback, ScrollDirection};

    pub use crate::{core, hit, vt};
}

pub use termgate_core as core;
#[cfg(feature = "harness")]
pub use termgate_harness as harness;
pub use termgate_hit as hit;
pub use termgate_vt as vt;
