//! Domain error types.

use thiserror::Error;

/// Errors produced by the attribute domain model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A label failed to parse into an expression list.
    #[error("label syntax error at position {position}: {message}")]
    LabelSyntax { position: usize, message: String },

    /// An attribute assignment string was malformed.
    #[error("invalid attribute value: '{value}'")]
    InvalidAttributeValue { value: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
