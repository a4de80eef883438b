// src/error.rs
use std::fmt;

/// Error types for the mc-varred library
///
/// Only construction and configuration boundaries can fail. The estimation
/// core (statistics, samplers, engine, beta calibration) is infallible and
/// lets non-finite values propagate into its results.
#[derive(Debug, Clone, PartialEq)]
pub enum McError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    InvalidConfiguration { field: String, reason: String },

    /// Numerical instability in a derived quantity
    NumericalInstability { method: String, reason: String },

    /// Failure writing a report file
    Io { path: String, reason: String },
}

impl fmt::Display for McError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            McError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            McError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
            McError::Io { path, reason } => {
                write!(f, "I/O error on '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for McError {}

/// Result type alias for mc-varred operations
pub type McResult<T> = Result<T, McError>;

/// Validation utilities
pub mod validation {
    use super::{McError, McResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> McResult<()> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0) and finite".to_string(),
            })
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> McResult<()> {
        if !value.is_finite() {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a value lying strictly inside (0, 1)
    pub fn validate_probability(name: &str, value: f64) -> McResult<()> {
        if value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must lie in the open interval (0, 1)".to_string(),
            })
        }
    }

    /// Validate paths count
    pub fn validate_paths(field: &str, paths: usize) -> McResult<()> {
        if paths == 0 {
            Err(McError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > 1_000_000_000 {
            Err(McError::InvalidConfiguration {
                field: field.to_string(),
                reason: "exceeds maximum allowed (1 billion)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
