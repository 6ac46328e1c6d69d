#![forbid(unsafe_code)]

//! Shared pieces for environment-driven configuration.
//!
//! Each termgate config struct has a `Default` and a `from_env_with(get)`
//! constructor. Invalid values never abort construction: the field keeps its
//! default and a [`ConfigError`] is recorded in the returned [`ConfigParse`].

use std::fmt;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable the value came from.
    pub key: &'static str,
    /// The raw value as read.
    pub value: String,
    /// What was expected instead.
    pub message: String,
}

impl ConfigError {
    /// Create a new configuration error.
    pub fn new(key: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.key, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// A parsed config together with the diagnostics collected while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParse<T> {
    pub config: T,
    pub errors: Vec<ConfigError>,
}

impl<T> ConfigParse<T> {
    /// True when every value was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Read `key` through `get` and parse it with `parse`.
///
/// Unset keys yield `None` silently; unparsable values yield `None` and push
/// a [`ConfigError`] carrying `expected`.
pub fn read_env<F, T>(
    get: &mut F,
    key: &'static str,
    expected: &str,
    parse: impl Fn(&str) -> Option<T>,
    errors: &mut Vec<ConfigError>,
) -> Option<T>
where
    F: FnMut(&str) -> Option<String>,
{
    let value = get(key)?;
    match parse(value.trim()) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(ConfigError::new(key, value, expected));
            None
        }
    }
}

/// Parse an unsigned 16-bit integer.
#[inline]
pub fn parse_u16(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok()
}

/// Parse an unsigned 64-bit integer.
#[inline]
pub fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
