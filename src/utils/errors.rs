//! Error handling for template-intl
//!
//! This module defines the error type shared by every helper operation
//! and groups its variants into the categories template authors see.

use thiserror::Error;

/// Main error type for template-intl
#[derive(Error, Debug)]
pub enum IntlError {
    /// The primary helper argument failed type or finiteness validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A dotted-path lookup (preset or message) did not resolve
    #[error("Could not find Intl object: {path}")]
    ReferenceNotFound { path: String },

    /// The formatting engine rejected a locale tag or option combination
    #[error("Could not construct {kind} formatter: {reason}")]
    FormatterConstruction { kind: String, reason: String },

    /// A constructed formatter failed while producing output
    #[error("Message formatting error: {0}")]
    MessageFormat(String),

    /// No rendering frame (and no configured default) supplied locales
    #[error("No locales available to {{{{{helper}}}}}; provide `intl.locales` in a parent scope")]
    MissingLocales { helper: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for template-intl operations
pub type Result<T> = std::result::Result<T, IntlError>;

impl IntlError {
    /// Shorthand for building an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        IntlError::InvalidArgument(message.into())
    }

    /// Shorthand for building a reference-not-found error
    pub fn reference_not_found(path: impl Into<String>) -> Self {
        IntlError::ReferenceNotFound { path: path.into() }
    }

    /// Shorthand for building a formatter-construction error
    pub fn construction(kind: impl ToString, reason: impl Into<String>) -> Self {
        IntlError::FormatterConstruction {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntlError::InvalidArgument(_) => ErrorCategory::InvalidArgument,
            IntlError::ReferenceNotFound { .. } => ErrorCategory::ReferenceNotFound,
            IntlError::FormatterConstruction { .. } => ErrorCategory::Construction,
            IntlError::MessageFormat(_) => ErrorCategory::Formatting,
            IntlError::MissingLocales { .. } => ErrorCategory::Environment,
            IntlError::Config(_) => ErrorCategory::Environment,
            IntlError::Serialization(_) => ErrorCategory::Environment,
            IntlError::Io(_) => ErrorCategory::Environment,
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidArgument,
    ReferenceNotFound,
    Construction,
    Formatting,
    Environment,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCategory::ReferenceNotFound => write!(f, "REFERENCE_NOT_FOUND"),
            ErrorCategory::Construction => write!(f, "CONSTRUCTION"),
            ErrorCategory::Formatting => write!(f, "FORMATTING"),
            ErrorCategory::Environment => write!(f, "ENVIRONMENT"),
        }
    }
}
