//! Configuration Error Types
//!
//! Errors raised while loading and validating dispatcher configuration. Every
//! one of them is raised at construction time so misconfiguration fails fast
//! instead of degrading the dispatcher at runtime.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Invalid YAML syntax in configuration source
    #[error("Invalid YAML in configuration source '{source_name}': {error}")]
    InvalidYaml { source_name: String, error: String },

    /// Configuration dictionary does not match the expected structure
    #[error("Invalid configuration structure in {context}: {error}")]
    InvalidStructure { context: String, error: String },

    /// File I/O errors during configuration loading
    #[error("Failed to read configuration file '{file_path}': {error}")]
    FileReadError { file_path: String, error: String },

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Retry strategy name not present in the strategy registry
    #[error("Unknown dispatcher strategy '{name}'")]
    UnknownStrategy { name: String },

    /// Cache policy name not recognized
    #[error("Unknown cache eviction policy '{name}'")]
    UnknownCachePolicy { name: String },

    /// Environment variable override could not be applied
    #[error("Environment override error for key {key}: {reason}")]
    EnvironmentOverrideError { key: String, reason: String },
}

impl ConfigurationError {
    /// Create an invalid YAML error
    pub fn invalid_yaml<S: Into<String>, E: std::fmt::Display>(source_name: S, error: E) -> Self {
        Self::InvalidYaml {
            source_name: source_name.into(),
            error: error.to_string(),
        }
    }

    /// Create an invalid structure error
    pub fn invalid_structure<C: Into<String>, E: std::fmt::Display>(context: C, error: E) -> Self {
        Self::InvalidStructure {
            context: context.into(),
            error: error.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read_error<P: Into<String>, E: std::fmt::Display>(file_path: P, error: E) -> Self {
        Self::FileReadError {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    /// Create a missing required field error
    pub fn missing_required_field<F: Into<String>, C: Into<String>>(field: F, context: C) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create an environment override error
    pub fn environment_override_error<K: Into<String>, R: std::fmt::Display>(
        key: K,
        reason: R,
    ) -> Self {
        Self::EnvironmentOverrideError {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
