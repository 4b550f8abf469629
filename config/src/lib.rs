//! # Configuration System
//!
//! Configuration for the sync-record registry.
//!
//! This crate provides:
//! - Configuration structures for the registry and its telemetry
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Configuration validation
//!
//! # Best Practices
//!
//! - Uses `validator` crate for input validation
//! - Follows 12-factor app configuration principles
//! - Provides clear error messages for invalid configuration

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod validation;

pub use config::{Config, FingerprintRetention, ObservabilityConfig, RegistryConfig};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::load_from_env;
pub use validation::validate;
