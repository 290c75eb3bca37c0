//! Request authorization boundary.
//!
//! Pulls the credential and target organization out of a request, validates
//! the session and, unless the session scope bypasses it, runs the permission
//! evaluator for the route's action.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
use warden_common::EntityRef;

use super::error::{AuthError, AuthResult};
use crate::permissions::{Action, Decision, PermissionEvaluator};
use crate::session::{Credential, SessionPrincipal, SessionValidator};

/// Header naming the target organization.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

const ORGANIZATIONS_SEGMENT: &str = "organizations";

/// An authenticated (and, where required, authorized) caller.
///
/// Inserted into request extensions by the boundary middleware.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPrincipal {
    pub session: SessionPrincipal,
    /// Organization the request was authorized against, if any.
    pub organization_id: Option<Uuid>,
}

impl AuthPrincipal {
    #[must_use]
    pub const fn identity(&self) -> &EntityRef {
        &self.session.identity
    }
}

/// Find the session credential: bearer header first, then the session cookie.
#[must_use]
pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<Credential> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(Credential::bearer(token));
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .map(Credential::cookie)
}

/// Find the target organization: the header first, then the path segment
/// following `/organizations/`.
pub fn target_organization(headers: &HeaderMap, path: &str) -> AuthResult<Option<Uuid>> {
    let raw = match headers.get(ORGANIZATION_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::BadRequest("Invalid organization id".into()))?,
        ),
        None => {
            let mut segments = path.split('/').filter(|s| !s.is_empty());
            segments
                .by_ref()
                .find(|s| *s == ORGANIZATIONS_SEGMENT)
                .and_then(|_| segments.next())
        }
    };

    raw.map(|id| {
        Uuid::parse_str(id.trim())
            .map_err(|_| AuthError::BadRequest("Invalid organization id".into()))
    })
    .transpose()
}

/// Validate the session behind `credential`.
pub async fn authenticate(
    validator: &SessionValidator,
    credential: Option<&Credential>,
) -> AuthResult<SessionPrincipal> {
    let credential = credential.ok_or_else(|| {
        debug!("No session credential presented");
        AuthError::Unauthorized
    })?;

    Ok(validator.validate(credential).await?)
}

/// Authenticate and authorize one request.
///
/// `system` and `admin` sessions skip the membership and role check entirely.
/// Every other session needs a target organization and enough elevation on it
/// for `action`.
#[tracing::instrument(skip_all, fields(action = action.name()))]
pub async fn authorize(
    validator: &SessionValidator,
    evaluator: &PermissionEvaluator,
    credential: Option<&Credential>,
    organization_id: Option<Uuid>,
    action: &dyn Action,
) -> AuthResult<AuthPrincipal> {
    let session = authenticate(validator, credential).await?;

    if session.scope.bypasses_membership() {
        debug!(identity = %session.identity, scope = %session.scope, "Scope bypasses role check");
        return Ok(AuthPrincipal {
            session,
            organization_id,
        });
    }

    let organization_id = organization_id
        .ok_or_else(|| AuthError::BadRequest("Missing organization id".into()))?;
    let organization = EntityRef::organization(organization_id);

    match evaluator
        .permissible(&session.identity, action, Some(&organization))
        .await?
    {
        Decision::Allowed => Ok(AuthPrincipal {
            session,
            organization_id: Some(organization_id),
        }),
        Decision::Denied(reason) => {
            debug!(
                identity = %session.identity,
                organization = %organization_id,
                reason = reason.as_deref().unwrap_or("unspecified"),
                "Permission denied"
            );
            Err(AuthError::Forbidden)
        }
    }
}
