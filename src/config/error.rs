//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Interval must be greater than zero: {0}")]
    ZeroInterval(&'static str),

    #[error("At least one non-empty sub-protocol is required")]
    InvalidProtocols,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
