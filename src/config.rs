//! Configuration for guard diagnostics.
//!
//! Guards themselves have nothing to configure; what varies between
//! deployments is which observers are installed. Settings come from the
//! environment or, with the `serde` feature, from a JSON document.

use std::env;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::observer::{self, LoggingObserver};
use crate::{GuardError, GuardResult};

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "INSTANCE_GUARD";

/// Observer settings.
///
/// # Examples
///
/// ```
/// use instance_guard::GuardConfig;
///
/// let config = GuardConfig::from_source("APP", |key| match key {
///     "APP_LOG" => Some("true".to_string()),
///     "APP_LOG_PREFIX" => Some("[app]".to_string()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert!(config.log_events);
/// assert_eq!(config.log_prefix, "[app]");
/// assert!(!config.trace_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GuardConfig {
    /// Install a [`LoggingObserver`]
    pub log_events: bool,
    /// Prefix for the logging observer's lines
    pub log_prefix: String,
    /// Install a `TracingObserver` (ignored without the `tracing` feature)
    pub trace_events: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            log_events: false,
            log_prefix: "[instance-guard]".to_string(),
            trace_events: false,
        }
    }
}

impl GuardConfig {
    /// Reads `INSTANCE_GUARD_LOG`, `INSTANCE_GUARD_LOG_PREFIX` and
    /// `INSTANCE_GUARD_TRACE`. Unset variables keep their defaults.
    pub fn from_env() -> GuardResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> GuardResult<Self> {
        Self::from_source(prefix, |key| env::var(key).ok())
    }

    /// Builds a config from any key lookup using the environment naming
    /// scheme (`{PREFIX}_LOG`, `{PREFIX}_LOG_PREFIX`, `{PREFIX}_TRACE`).
    pub fn from_source<L>(prefix: &str, lookup: L) -> GuardResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let prefix = prefix.to_uppercase();
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name));

        let mut config = Self::default();
        if let Some(value) = var("LOG") {
            config.log_events = parse_flag(&format!("{}_LOG", prefix), &value)?;
        }
        if let Some(value) = var("LOG_PREFIX") {
            config.log_prefix = value;
        }
        if let Some(value) = var("TRACE") {
            config.trace_events = parse_flag(&format!("{}_TRACE", prefix), &value)?;
        }
        Ok(config)
    }

    /// Parses a JSON document. Missing fields keep their defaults.
    ///
    /// ```
    /// use instance_guard::GuardConfig;
    ///
    /// let config = GuardConfig::from_json(r#"{ "log_events": true }"#).unwrap();
    /// assert!(config.log_events);
    /// assert_eq!(config.log_prefix, "[instance-guard]");
    ///
    /// assert!(GuardConfig::from_json("{ oops").is_err());
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> GuardResult<Self> {
        serde_json::from_str(json).map_err(|e| GuardError::InvalidConfig(e.to_string()))
    }

    /// Registers the configured observers. Returns how many were added.
    pub fn install(&self) -> usize {
        let mut installed = 0;
        if self.log_events {
            observer::add_observer(Arc::new(LoggingObserver::with_prefix(self.log_prefix.clone())));
            installed += 1;
        }
        #[cfg(feature = "tracing")]
        if self.trace_events {
            observer::add_observer(Arc::new(observer::TracingObserver));
            installed += 1;
        }
        installed
    }
}

fn parse_flag(key: &str, value: &str) -> GuardResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(GuardError::InvalidConfig(format!(
            "{} expects a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = GuardConfig::from_source("EMPTY", lookup(&[])).unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn flags_accept_common_spellings() {
        for (raw, expected) in [("1", true), ("ON", true), ("yes", true), ("0", false), ("off", false)] {
            let config = GuardConfig::from_source("X", lookup(&[("X_TRACE", raw)])).unwrap();
            assert_eq!(config.trace_events, expected, "value {}", raw);
        }
    }

    #[test]
    fn bad_flag_is_invalid_config() {
        let err = GuardConfig::from_source("x", lookup(&[("X_LOG", "maybe")])).unwrap_err();
        assert_eq!(
            err,
            GuardError::InvalidConfig("X_LOG expects a boolean, got 'maybe'".to_string())
        );
    }

    #[test]
    fn nothing_installed_by_default() {
        assert_eq!(GuardConfig::default().install(), 0);
    }
}
