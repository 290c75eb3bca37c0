//! Organization tag handlers.
//!
//! Tags are sourced by the organization and target one of its members, or
//! apply to the organization as a whole when no member is given.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_common::EntityRef;

use super::AppState;
use crate::auth::AuthResult;

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    /// Member the tags are about.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AddTagsResponse {
    /// Names newly attached by this request.
    pub added: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveTagsResponse {
    /// Names still attached after removal.
    pub remaining: Vec<String>,
}

/// Add tags. Names already present are skipped.
#[tracing::instrument(skip(state))]
pub async fn add_tags(
    State(state): State<AppState>,
    Path(organization_id): Path<Uuid>,
    Json(body): Json<TagsRequest>,
) -> AuthResult<Json<AddTagsResponse>> {
    let source = EntityRef::organization(organization_id);
    let target = body.user_id.map(EntityRef::user);

    let added = state.tags.add(&source, target.as_ref(), &body.names).await?;
    Ok(Json(AddTagsResponse { added }))
}

/// Remove tags. Unknown names are ignored.
#[tracing::instrument(skip(state))]
pub async fn remove_tags(
    State(state): State<AppState>,
    Path(organization_id): Path<Uuid>,
    Json(body): Json<TagsRequest>,
) -> AuthResult<Json<RemoveTagsResponse>> {
    let source = EntityRef::organization(organization_id);
    let target = body.user_id.map(EntityRef::user);

    let remaining = state
        .tags
        .remove(&source, target.as_ref(), &body.names)
        .await?;
    Ok(Json(RemoveTagsResponse { remaining }))
}
