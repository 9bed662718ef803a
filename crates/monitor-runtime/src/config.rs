//! # Monitor Configuration
//!
//! Unified configuration for the subscription bus and broadcast coordinator.
//!
//! All values have sane defaults. A TOML document may override any subset,
//! and a few values can be overridden again from the environment:
//!
//! | Variable                           | Field                            |
//! |------------------------------------|----------------------------------|
//! | `BITSWAP_MONITOR_SEND_TIMEOUT_MS`  | `broadcast.send_timeout_ms`      |
//! | `BITSWAP_MONITOR_QUEUE_CAPACITY`   | `subscriptions.queue_capacity`   |
//! | `BITSWAP_MONITOR_ADDRESSES`        | `monitoring_addresses` (a,b,c)   |

use bitswap_broadcast::BroadcastConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const ENV_SEND_TIMEOUT_MS: &str = "BITSWAP_MONITOR_SEND_TIMEOUT_MS";
pub const ENV_QUEUE_CAPACITY: &str = "BITSWAP_MONITOR_QUEUE_CAPACITY";
pub const ENV_ADDRESSES: &str = "BITSWAP_MONITOR_ADDRESSES";

/// Complete monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub broadcast: BroadcastSection,
    pub subscriptions: SubscriptionSection,
    /// Addresses remote clients connect to for the push stream.
    pub monitoring_addresses: Vec<String>,
}

/// Broadcast coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastSection {
    /// Upper bound for a single send to a single peer.
    pub send_timeout_ms: u64,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            send_timeout_ms: 30_000,
        }
    }
}

/// Subscription bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionSection {
    /// Events buffered per subscriber before it is dropped as stalled.
    pub queue_capacity: usize,
    /// Events buffered per push-stream client.
    pub push_buffer: usize,
}

impl Default for SubscriptionSection {
    fn default() -> Self {
        Self {
            queue_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            push_buffer: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl MonitorConfig {
    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup, then validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SEND_TIMEOUT_MS) {
            self.broadcast.send_timeout_ms = parse_number(ENV_SEND_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_QUEUE_CAPACITY) {
            self.subscriptions.queue_capacity = parse_number(ENV_QUEUE_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_ADDRESSES) {
            self.monitoring_addresses = value
                .split(',')
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(str::to_owned)
                .collect();
        }
        self.validate()
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "broadcast.send_timeout_ms",
                reason: "must be greater than 0".into(),
            });
        }
        if self.subscriptions.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subscriptions.queue_capacity",
                reason: "must be greater than 0".into(),
            });
        }
        if self.subscriptions.push_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subscriptions.push_buffer",
                reason: "must be greater than 0".into(),
            });
        }
        if self.monitoring_addresses.is_empty() {
            warn!("No monitoring addresses configured; push clients cannot discover the stream");
        }
        Ok(())
    }

    /// Coordinator settings derived from this configuration.
    pub fn broadcast_config(&self) -> BroadcastConfig {
        BroadcastConfig::with_send_timeout(Duration::from_millis(self.broadcast.send_timeout_ms))
    }
}

fn parse_number<N: std::str::FromStr>(field: &'static str, value: &str) -> Result<N, ConfigError>
where
    N::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: N::Err| ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        })
}
