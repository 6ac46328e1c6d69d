//! Terminal construction parameters.
//!
//! # Environment Variables
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `TERMGATE_COLS` | `u16` | `80` |
//! | `TERMGATE_ROWS` | `u16` | `24` |
//! | `TERMGATE_MOUSE_FORMAT` | `sgr` \| `x10` | `sgr` |

use termgate_core::MouseFormat;
use termgate_core::config::{ConfigError, ConfigParse, parse_u16, read_env};

/// Environment variable for the initial column count.
pub const ENV_COLS: &str = "TERMGATE_COLS";
/// Environment variable for the initial row count.
pub const ENV_ROWS: &str = "TERMGATE_ROWS";
/// Environment variable selecting the mouse report format.
pub const ENV_MOUSE_FORMAT: &str = "TERMGATE_MOUSE_FORMAT";

/// Initial geometry and input-synthesis preferences for a [`Terminal`](crate::Terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalConfig {
    pub cols: u16,
    pub rows: u16,
    /// Format used by `send_mouse`.
    pub mouse_format: MouseFormat,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            mouse_format: MouseFormat::Sgr,
        }
    }
}

impl TerminalConfig {
    /// Config with the given size and default preferences.
    #[must_use]
    pub fn with_size(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mouse_format(mut self, format: MouseFormat) -> Self {
        self.mouse_format = format;
        self
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> ConfigParse<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through `get` (testable without touching the process
    /// environment).
    #[must_use]
    pub fn from_env_with<F>(mut get: F) -> ConfigParse<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors: Vec<ConfigError> = Vec::new();

        if let Some(cols) = read_env(&mut get, ENV_COLS, "column count (u16)", parse_u16, &mut errors) {
            config.cols = cols;
        }
        if let Some(rows) = read_env(&mut get, ENV_ROWS, "row count (u16)", parse_u16, &mut errors) {
            config.rows = rows;
        }
        if let Some(format) = read_env(
            &mut get,
            ENV_MOUSE_FORMAT,
            "`sgr` or `x10`",
            MouseFormat::parse,
            &mut errors,
        ) {
            config.mouse_format = format;
        }

        ConfigParse { config, errors }
    }
}
