//! Error types for the payroll engine.
//!
//! Every fallible operation returns [`EngineError`]. The variants follow the
//! engine's error taxonomy: malformed input, missing records, conflicts with
//! existing records, invalid state transitions, and collaborator failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::NotFound {
///     entity: "employee".to_string(),
///     id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: emp_404");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input was malformed (inverted date ranges, missing mandatory fields).
    #[error("Validation error: {message}")]
    Validation {
        /// A description of what was invalid.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up (e.g. "employee").
        entity: String,
        /// The identifier that was not found.
        id: String,
    },

    /// The operation conflicts with an existing record.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflict.
        message: String,
    },

    /// The operation is not allowed in the record's current state.
    #[error("Invalid state: {message}")]
    State {
        /// A description of the rejected transition.
        message: String,
    },

    /// A storage collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the collaborator failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`EngineError::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::State`] error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Storage`] error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::State { .. } => ErrorKind::State,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => ErrorKind::Config,
        }
    }
}

/// Closed set of error categories, for exhaustive handling at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Missing employee, pay period, time entry or record.
    NotFound,
    /// Overlapping pay period or duplicate time entry.
    Conflict,
    /// Invalid state transition.
    State,
    /// Collaborator (storage) failure.
    Storage,
    /// Configuration could not be loaded.
    Config,
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
