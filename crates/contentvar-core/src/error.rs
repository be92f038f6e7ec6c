use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::message::MessageKind;
use crate::model::{ContentVariable, VariableType};

/// Message-content errors raised by the validator, defaulter and cleaner.
///
/// Every variant describes a payload that is permanently malformed relative
/// to its schema; retrying the same payload reproduces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A schema field is absent from the message.
    #[error("missing field: {0}")]
    MissingField(String),
    /// The message carries a field the schema does not declare.
    #[error("unexpected field: {0}")]
    UnexpectedField(String),
    /// A message segment has the wrong shape for its variable.
    #[error("unexpected type for '{name}': expected {expected}, got {actual}")]
    UnexpectedType {
        name: String,
        expected: VariableType,
        actual: MessageKind,
    },
    /// The schema itself cannot be applied.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl ValidationError {
    pub(crate) fn unexpected_type(variable: &ContentVariable, actual: &Value) -> Self {
        ValidationError::UnexpectedType {
            name: variable.name.clone(),
            expected: variable.variable_type,
            actual: MessageKind::of(actual),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::UnexpectedField(_) => "unexpected_field",
            ValidationError::UnexpectedType { .. } => "unexpected_type",
            ValidationError::InvalidSchema(_) => "invalid_schema",
        }
    }

    /// Always false: callers should drop or report the payload instead of retrying it.
    pub fn is_retryable(&self) -> bool {
        match self {
            ValidationError::MissingField(_)
            | ValidationError::UnexpectedField(_)
            | ValidationError::UnexpectedType { .. }
            | ValidationError::InvalidSchema(_) => false,
        }
    }
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Structured validation issue with its location in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: String,
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn from_error(path: impl Into<String>, error: &ValidationError) -> Self {
        Self::new(error.code(), path, error.to_string())
    }
}

/// Every issue found in one message, in traversal order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no issues.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    /// The issue a fail-fast validation would have stopped at.
    pub fn first(&self) -> Option<&ValidationIssue> {
        self.issues.first()
    }
}
