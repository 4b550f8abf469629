//! # Configuration Structures
//!
//! This module defines all configuration structures for the sync-record
//! registry.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Include M-CANONICAL-DOCS

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Main configuration structure for the sync-record registry.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates the registry behaviour switches and the telemetry settings.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Initial capacity: {}", config.registry.initial_capacity);
/// ```
///
/// ## Fields
/// - `registry`: Identity index behaviour
/// - `observability`: Metrics emission
///
/// ## Validation
/// All nested configurations must pass their own validation rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    /// Identity index behaviour
    #[serde(default)]
    #[validate(nested)]
    pub registry: RegistryConfig,

    /// Metrics emission
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// What happens to a record's fingerprint entry once the record is bound to a
/// remote id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FingerprintRetention {
    /// Keep the entry as a permanent last-resort key.
    #[default]
    Retain,
    /// Drop the entry as soon as the record has a remote id.
    EvictOnRemoteBind
}

/// Registry configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Controls how the identity index treats fallback keys and category checks.
///
/// ## Fields
/// - `fingerprint_retention`: Fate of fingerprint entries after a remote bind
///   (default: "retain")
/// - `verify_categories`: Reject lookup hits whose category differs from the
///   item being resolved (default: true)
/// - `initial_capacity`: Pre-sizing of each index map (default: 1024, range:
///   0-1000000)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RegistryConfig {
    /// Fate of fingerprint entries after a remote bind
    #[serde(default)]
    pub fingerprint_retention: FingerprintRetention,

    /// Reject lookup hits of the wrong category
    #[serde(default = "default_verify_categories")]
    pub verify_categories: bool,

    /// Pre-sizing of each index map
    #[serde(default = "default_initial_capacity")]
    #[validate(range(min = 0, max = 1_000_000))]
    pub initial_capacity: usize
}

fn default_verify_categories() -> bool {
    true
}

fn default_initial_capacity() -> usize {
    1024
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fingerprint_retention: FingerprintRetention::default(),
            verify_categories: default_verify_categories(),
            initial_capacity: default_initial_capacity()
        }
    }
}

/// Observability configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Manages emission of registry metrics through the `metrics` facade.
///
/// ## Fields
/// - `metrics_enabled`: Emit registry counters (default: true)
/// - `metrics_prefix`: Prefix for every metric name (default: "identity")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    /// Emit registry counters
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Prefix for every metric name
    #[serde(default = "default_metrics_prefix")]
    #[validate(length(min = 1, max = 64))]
    #[validate(custom(function = "validate_metrics_prefix"))]
    pub metrics_prefix: String
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_prefix() -> String {
    "identity".to_string()
}

fn validate_metrics_prefix(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("Invalid metrics prefix"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_metrics_enabled(),
            metrics_prefix: default_metrics_prefix()
        }
    }
}
