//! Configuration module.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{ApiConfig, Config, MediaConfig, OutputConfig};
pub use validation::{validate_config, validate_token};
