//! Permission Evaluation Errors

use thiserror::Error;

use crate::db::StoreError;

/// Failures while evaluating a permission. Distinct from a denial.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The action requires a role the catalog does not define.
    #[error("Action '{action}' requires unknown role '{role}'")]
    Misconfigured {
        action: &'static str,
        role: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
