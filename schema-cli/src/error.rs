//! Error types shared across the schema-to-parser pipeline
//!
//! Each stage owns a narrow error enum; the orchestrator carries them inside
//! `anyhow::Error` and hands them to the exception handler, which downcasts
//! to [`FailedExecution`] (and `std::io::Error`) to pick an exit code.

use thiserror::Error;

/// Severity levels for error classification
///
/// - **Warning**: something was tolerated and the invocation continues.
/// - **Error**: the invocation fails, typically because of user input.
/// - **Critical**: the model or its CLI configuration is broken; no input can
///   succeed until the application author fixes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Potential issue but the invocation can proceed
    Warning,
    /// The invocation failed
    Error,
    /// The application's schema or configuration is unusable
    Critical,
}

/// Trait for error types that have severity levels
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Malformed CLI configuration detected while building a parser
///
/// These are raised before any argv is parsed and always indicate a problem in
/// the application's model or companion configuration, never in user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unsupported custom flag spec for field '{field}': expected 1 or 2 flags, got {count}")]
    InvalidArity { field: String, count: usize },

    #[error("Invalid flag '{token}' for field '{field}': {reason}")]
    InvalidFlag {
        field: String,
        token: String,
        reason: String,
    },

    #[error("Invalid boolean flag prefixes ('{enable}', '{disable}'): {reason}")]
    InvalidBoolPrefix {
        enable: String,
        disable: String,
        reason: String,
    },

    #[error("Flag '{flag}' is registered more than once (by '{first}' and '{second}')")]
    DuplicateFlag {
        flag: String,
        first: String,
        second: String,
    },

    #[error("Custom flags declared for unknown field '{field}'")]
    UnknownField { field: String },

    #[error("Failed to resolve CLI configuration: {message}")]
    Resolution { message: String },
}

impl Severity for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}

/// One offending field reported by model validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON pointer to the offending value, empty for the model itself
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Model construction or validation failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation failed for {model} ({}):\n{}", count_errors(.errors), format_field_errors(.errors))]
pub struct ValidationError {
    /// Schema title of the model being validated
    pub model: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    /// Single-message convenience for errors that have no field path
    pub fn message(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            model,
            vec![FieldError {
                path: String::new(),
                message: message.into(),
            }],
        )
    }
}

impl Severity for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

fn count_errors(errors: &[FieldError]) -> String {
    match errors.len() {
        1 => "1 error".to_string(),
        n => format!("{n} errors"),
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Structured failure that carries the exit code the process should return
///
/// Handlers return this (through `anyhow`) when a specific exit code matters;
/// the built-in exception handlers propagate `exit_code` verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FailedExecution {
    pub exit_code: i32,
    pub message: String,
}

impl FailedExecution {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }
}

impl Severity for FailedExecution {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}
