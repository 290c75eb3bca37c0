//! Request Authorization
//!
//! Credential extraction, session validation and the role check that guards
//! organization routes.

pub mod boundary;
mod error;
mod middleware;

pub use boundary::{authenticate, authorize, AuthPrincipal, ORGANIZATION_HEADER};
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{require_authorization, require_session, with_action, RouteAction};
