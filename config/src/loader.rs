//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `IR_*`: Identity registry settings

use crate::config::{Config, FingerprintRetention, ObservabilityConfig, RegistryConfig};
use std::env;

/// Load configuration from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads configuration from environment variables. Unset variables fall back
/// to defaults; set but unparsable variables are reported as errors instead
/// of being silently ignored.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Retention: {}", config.registry.fingerprint_retention);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// - `IR_FINGERPRINT_RETENTION`: retain/evict_on_remote_bind (default: retain)
/// - `IR_VERIFY_CATEGORIES`: true/false (default: true)
/// - `IR_INITIAL_CAPACITY`: index pre-sizing (default: 1024)
/// - `IR_METRICS_ENABLED`: true/false (default: true)
/// - `IR_METRICS_PREFIX`: metric name prefix (default: "identity")
pub fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config {
        registry: load_registry_from_env()?,
        observability: load_observability_from_env()?
    };

    Ok(config)
}

fn load_registry_from_env() -> Result<RegistryConfig, Box<dyn std::error::Error>> {
    let defaults = RegistryConfig::default();
    Ok(RegistryConfig {
        fingerprint_retention: parse_env_or::<FingerprintRetention>(
            "IR_FINGERPRINT_RETENTION",
            defaults.fingerprint_retention
        )?,
        verify_categories: parse_env_or("IR_VERIFY_CATEGORIES", defaults.verify_categories)?,
        initial_capacity: parse_env_or("IR_INITIAL_CAPACITY", defaults.initial_capacity)?
    })
}

fn load_observability_from_env() -> Result<ObservabilityConfig, Box<dyn std::error::Error>> {
    let defaults = ObservabilityConfig::default();
    Ok(ObservabilityConfig {
        metrics_enabled: parse_env_or("IR_METRICS_ENABLED", defaults.metrics_enabled)?,
        metrics_prefix: env::var("IR_METRICS_PREFIX").unwrap_or(defaults.metrics_prefix)
    })
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    match env::var(key) {
        Ok(s) => s
            .trim()
            .parse::<T>()
            .map_err(|e| format!("{key}: {e}").into()),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>)
    }
}
