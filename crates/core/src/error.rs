//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a stock rule or item field check refused a value.
///
/// Only deterministic, business-level failures live here; storage and
/// transport failures have their own error types further out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed item fields, such as a blank name or an unknown report kind.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stock rule refused the change, e.g. a delta that would leave the
    /// quantity below zero.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An item id could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// The message carried by the error, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::InvalidOperation(msg) | Self::InvalidId(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_prefix_but_detail_does_not() {
        let err = DomainError::invalid_operation("quantity cannot go below zero");
        assert_eq!(err.to_string(), "invalid operation: quantity cannot go below zero");
        assert_eq!(err.detail(), "quantity cannot go below zero");
        assert_eq!(DomainError::invalid_id("ItemId: empty").detail(), "ItemId: empty");
    }
}
