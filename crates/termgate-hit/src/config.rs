//! Dispatcher tuning.
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `TERMGATE_DOUBLE_CLICK_MS` | milliseconds (`u64`) | `300` |

use std::time::Duration;

use termgate_core::config::{ConfigError, ConfigParse, parse_u64, read_env};

/// Environment variable for the double-click window.
pub const ENV_DOUBLE_CLICK_MS: &str = "TERMGATE_DOUBLE_CLICK_MS";

/// Default double-click window.
pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum gap between two left clicks on the same cell and element for
    /// the second to count as a double click (inclusive).
    pub double_click_window: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
        }
    }
}

impl DispatchConfig {
    #[must_use]
    pub fn double_click_window(mut self, window: Duration) -> Self {
        self.double_click_window = window;
        self
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> ConfigParse<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through `get`.
    #[must_use]
    pub fn from_env_with<F>(mut get: F) -> ConfigParse<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors: Vec<ConfigError> = Vec::new();
        if let Some(ms) = read_env(
            &mut get,
            ENV_DOUBLE_CLICK_MS,
            "milliseconds (u64)",
            parse_u64,
            &mut errors,
        ) {
            config.double_click_window = Duration::from_millis(ms);
        }
        ConfigParse { config, errors }
    }
}
