//! Configuration management for the helpdesk.
//!
//! Loads configuration from environment variables with sensible defaults.

use helpdesk_core::document_store::DEFAULT_COLLECTION;
use helpdesk_core::format::{InvalidFormat, TimestampFormat, DEFAULT_PATTERN};
use helpdesk_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the ticket collection
    pub collection: String,
    /// `strftime` pattern for every displayed timestamp
    pub date_format: String,
    /// Offset applied before formatting, in minutes east of UTC
    pub utc_offset_minutes: i32,
    /// Close update timeout in seconds
    pub close_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
    /// Capacity of each screen's action broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            date_format: DEFAULT_PATTERN.to_string(),
            utc_offset_minutes: 0,
            close_timeout_secs: 10,
            shutdown_timeout_secs: 5,
            broadcast_capacity: 16,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (variable name to value).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            collection: lookup("HELPDESK_COLLECTION")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.collection),
            date_format: lookup("HELPDESK_DATE_FORMAT").unwrap_or(defaults.date_format),
            utc_offset_minutes: lookup("HELPDESK_UTC_OFFSET_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.utc_offset_minutes),
            close_timeout_secs: lookup("HELPDESK_CLOSE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.close_timeout_secs),
            shutdown_timeout_secs: lookup("HELPDESK_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.shutdown_timeout_secs),
            broadcast_capacity: lookup("HELPDESK_BROADCAST_CAPACITY")
                .and_then(|s| s.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.broadcast_capacity),
        }
    }

    /// The formatting rule shared by the list and detail projections
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFormat`] if the pattern or offset is invalid.
    pub fn timestamp_format(&self) -> Result<TimestampFormat, InvalidFormat> {
        TimestampFormat::new(self.date_format.clone(), self.utc_offset_minutes)
    }

    /// Close update timeout
    #[must_use]
    pub const fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Runtime configuration for every screen store
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.broadcast_capacity, self.shutdown_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.collection, "orders");
        assert_eq!(config.close_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn overrides_from_variables() {
        let config = Config::from_lookup(lookup(&[
            ("HELPDESK_COLLECTION", "tickets"),
            ("HELPDESK_UTC_OFFSET_MINUTES", "-180"),
            ("HELPDESK_CLOSE_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.collection, "tickets");
        assert_eq!(config.utc_offset_minutes, -180);
        assert_eq!(config.close_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("HELPDESK_CLOSE_TIMEOUT_SECS", "soon"),
            ("HELPDESK_BROADCAST_CAPACITY", "0"),
        ]));
        assert_eq!(config.close_timeout_secs, 10);
        assert_eq!(config.broadcast_capacity, 16);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let config = Config {
            date_format: "%Q".to_string(),
            ..Config::default()
        };
        assert!(config.timestamp_format().is_err());
    }
}
