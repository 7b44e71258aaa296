//! Error types for the domain layer.
//!
//! The domain raises a small closed set of tagged errors. The tool-dispatch
//! boundary in `movies_mcp` is the only place they map to JSON-RPC codes.

use thiserror::Error;

/// Domain operation result type.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Domain errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input failed validation (out-of-range value, empty required string,
    /// unparseable decade, schema mismatch).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An entity, link, or context was not found.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind, e.g. "movie" or "actor".
        entity: &'static str,
        /// The key that failed to resolve.
        key: String,
    },

    /// A uniqueness invariant was violated (duplicate link, duplicate genre).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed or is unreachable.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a store-unavailable error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// The wire-level category tag carried in JSON-RPC `data.kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(DomainError::validation("x").kind(), "validation");
        assert_eq!(DomainError::not_found("movie", "42").kind(), "not_found");
        assert_eq!(DomainError::conflict("dup").kind(), "conflict");
        assert_eq!(DomainError::store("down").kind(), "store_unavailable");
    }

    #[test]
    fn test_not_found_display() {
        let err = DomainError::not_found("movie", "42");
        assert_eq!(err.to_string(), "movie not found: 42");
    }
}
