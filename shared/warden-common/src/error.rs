//! Common Error Types

use thiserror::Error;

/// Errors raised while parsing shared types from their wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Entity kind string is not one of the known kinds.
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    /// Session scope string is not one of the known scopes.
    #[error("Unknown session scope: {0}")]
    UnknownSessionScope(String),

    /// Target kind and target id must be both present or both absent.
    #[error("Target kind and target id must be set together")]
    PartialTarget,
}

/// Result type for common operations.
pub type Result<T> = std::result::Result<T, Error>;
