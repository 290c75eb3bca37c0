//! Authorization Boundary Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use warden_common::EntityKind;

use crate::db::StoreError;
use crate::permissions::AuthzError;
use crate::roles::RoleError;
use crate::session::SessionError;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid session credential.
    #[error("Invalid or expired session")]
    Unauthorized,

    /// Authenticated, but not allowed.
    #[error("Insufficient permissions")]
    Forbidden,

    /// The request lacks or garbles something the boundary needs.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Role not defined for this owner kind.
    #[error("Unknown role '{role}' for owner kind {owner_kind}")]
    UnknownRole {
        role: String,
        owner_kind: EntityKind,
    },

    /// Backing store failure.
    #[error("Internal server error")]
    StoreFault(#[from] StoreError),

    /// Server-side misconfiguration.
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(_) => Self::Unauthorized,
            SessionError::Store(e) => Self::StoreFault(e),
        }
    }
}

impl From<AuthzError> for AuthError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Store(e) => Self::StoreFault(e),
            misconfigured @ AuthzError::Misconfigured { .. } => {
                Self::Internal(misconfigured.to_string())
            }
        }
    }
}

impl From<RoleError> for AuthError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::UnknownRole { role, owner_kind } => Self::UnknownRole { role, owner_kind },
            refused @ (RoleError::NoRole | RoleError::Hierarchy { .. }) => {
                debug!(reason = %refused, "Role change refused");
                Self::Forbidden
            }
            RoleError::Store(e) => Self::StoreFault(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::UnknownRole { .. } => (StatusCode::BAD_REQUEST, "UNKNOWN_ROLE"),
            Self::StoreFault(e) => {
                error!(error = %e, "Store fault while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::Internal(detail) => {
                error!(detail = %detail, "Internal error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for boundary operations.
pub type AuthResult<T> = Result<T, AuthError>;
