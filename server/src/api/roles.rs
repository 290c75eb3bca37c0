//! Member role handlers.
//!
//! All routes live under `/api/organizations/{organization_id}/members/{user_id}/roles`
//! and act on the member's grants scoped to that organization.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_common::EntityRef;

use super::AppState;
use crate::auth::{AuthError, AuthPrincipal, AuthResult};
use crate::roles::{can_assign, RoleGrant};

/// A role grant as returned to clients.
#[derive(Debug, Serialize)]
pub struct RoleGrantResponse {
    pub id: Uuid,
    pub role: String,
    /// `None` when the catalog has no label for this combination.
    pub display_name: Option<&'static str>,
    pub created_at: DateTime<Utc>,
}

impl From<RoleGrant> for RoleGrantResponse {
    fn from(grant: RoleGrant) -> Self {
        Self {
            id: grant.id,
            display_name: grant.display_name(),
            role: grant.role_name,
            created_at: grant.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRoleQuery {
    /// Revoke only this role; all roles on the organization when absent.
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevokeRoleResponse {
    pub removed: u64,
}

/// Refuse role changes at or above the caller's own elevation.
///
/// Sessions whose scope bypasses membership are not ranked.
async fn ensure_can_assign(
    state: &AppState,
    principal: &AuthPrincipal,
    member: &EntityRef,
    organization: &EntityRef,
    role: &str,
) -> AuthResult<()> {
    if principal.session.scope.bypasses_membership() {
        return Ok(());
    }

    let held = state
        .evaluator
        .effective_roles(principal.identity(), Some(organization))
        .await?;
    let target_kinds = state.evaluator.policy().elevation.target_kinds(Some(organization));

    can_assign(&held, role, &[member.kind], &target_kinds)?;
    Ok(())
}

/// Reject members that do not exist.
async fn resolve_member(state: &AppState, user_id: Uuid) -> AuthResult<EntityRef> {
    let member = EntityRef::user(user_id);
    if state.entities.find(&member).await?.is_none() {
        return Err(AuthError::BadRequest(format!("Unknown user {user_id}")));
    }
    Ok(member)
}

/// List a member's roles in the organization.
#[tracing::instrument(skip(state))]
pub async fn list_roles(
    State(state): State<AppState>,
    Path((organization_id, user_id)): Path<(Uuid, Uuid)>,
) -> AuthResult<Json<Vec<RoleGrantResponse>>> {
    let organization = EntityRef::organization(organization_id);
    let grants = state
        .grants
        .grants_for(&EntityRef::user(user_id), Some(&organization))
        .await?;

    Ok(Json(grants.into_iter().map(RoleGrantResponse::from).collect()))
}

/// Grant a role to a member. A primary role replaces the member's current one.
#[tracing::instrument(skip(state, principal, body))]
pub async fn grant_role(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path((organization_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<GrantRoleRequest>,
) -> AuthResult<(StatusCode, Json<RoleGrantResponse>)> {
    let organization = EntityRef::organization(organization_id);
    let member = resolve_member(&state, user_id).await?;

    ensure_can_assign(&state, &principal, &member, &organization, &body.role).await?;

    let grant = state
        .grants
        .create_for(&member, &body.role, Some(&organization))
        .await?;

    Ok((StatusCode::CREATED, Json(grant.into())))
}

/// Revoke one or all of a member's roles in the organization.
#[tracing::instrument(skip(state, principal))]
pub async fn revoke_roles(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path((organization_id, user_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<RevokeRoleQuery>,
) -> AuthResult<Json<RevokeRoleResponse>> {
    let organization = EntityRef::organization(organization_id);
    let member = EntityRef::user(user_id);

    // Revoking everything requires outranking every role the member holds
    let affected = match &query.role {
        Some(role) => vec![role.clone()],
        None => state.grants.role_names_for(&member, Some(&organization)).await?,
    };
    for role in &affected {
        ensure_can_assign(&state, &principal, &member, &organization, role).await?;
    }

    // Delete only what was checked, never a role granted since
    let removed = state
        .grants
        .revoke_listed(&member, Some(&organization), &affected)
        .await?;

    Ok(Json(RevokeRoleResponse { removed }))
}
