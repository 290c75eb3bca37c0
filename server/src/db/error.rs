//! Store Error Types

use thiserror::Error;

/// Failure of a backing store.
///
/// Always fatal to the current operation; callers never translate it into a
/// denial.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store did not answer in time (pool acquire or statement timeout).
    #[error("Store operation timed out")]
    Timeout,

    /// The database reported an error.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A persisted row could not be mapped back into a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::Timeout,
            other => Self::Database(other),
        }
    }
}

impl From<warden_common::Error> for StoreError {
    fn from(err: warden_common::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Timeout
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    #[test]
    fn test_common_parse_error_is_corrupt() {
        let err = StoreError::from(warden_common::Error::UnknownEntityKind("Guild".into()));
        assert!(err.to_string().contains("Guild"));
    }
}
