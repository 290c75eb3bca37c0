//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod actions;
pub mod roles;
pub mod tags;

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use chrono::Duration;
use serde::Serialize;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

pub use actions::OrganizationAction;

use crate::{
    auth::{self, AuthPrincipal},
    config::Config,
    entities::{EntityStore, MemoryDirectory, MembershipStore, PgDirectory},
    permissions::PermissionEvaluator,
    roles::{MemoryRoleGrantStore, PgRoleGrantStore, RoleGrantStore, RoleGrants},
    session::{Clock, JwtCredentialCodec, SessionValidator, SystemClock},
    tags::{MemoryTagStore, PgTagStore, TagStore, Tags},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Entity registry
    pub entities: Arc<dyn EntityStore>,
    /// Session credential validation
    pub validator: SessionValidator,
    /// Role checks for organization routes
    pub evaluator: PermissionEvaluator,
    /// Role grant operations
    pub grants: RoleGrants,
    /// Tag operations
    pub tags: Tags,
}

/// Backing stores for [`AppState::from_stores`].
pub struct Stores {
    pub entities: Arc<dyn EntityStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub grants: Arc<dyn RoleGrantStore>,
    pub tags: Arc<dyn TagStore>,
}

impl AppState {
    /// Wire application state over arbitrary stores and a clock.
    #[must_use]
    pub fn from_stores(config: Config, stores: Stores, clock: Arc<dyn Clock>) -> Self {
        let codec = Arc::new(JwtCredentialCodec::new(
            config.jwt_secret.as_bytes(),
            config.jwt_issuer.clone(),
        ));
        let validator = SessionValidator::new(
            codec,
            Arc::clone(&stores.entities),
            clock,
            Duration::seconds(config.session_leeway),
        );
        let evaluator = PermissionEvaluator::new(
            Arc::clone(&stores.grants),
            stores.memberships,
            config.evaluation_policy(),
        );

        Self {
            grants: RoleGrants::new(stores.grants, Arc::clone(&stores.entities)),
            tags: Tags::new(stores.tags),
            entities: stores.entities,
            validator,
            evaluator,
            config: Arc::new(config),
        }
    }

    /// State backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(db: PgPool, config: Config) -> Self {
        let directory = Arc::new(PgDirectory::new(db.clone()));
        let stores = Stores {
            entities: directory.clone(),
            memberships: directory,
            grants: Arc::new(PgRoleGrantStore::new(db.clone())),
            tags: Arc::new(PgTagStore::new(db)),
        };
        Self::from_stores(config, stores, Arc::new(SystemClock))
    }

    /// State backed by in-memory stores sharing `directory`.
    #[must_use]
    pub fn in_memory(
        config: Config,
        directory: Arc<MemoryDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stores = Stores {
            entities: directory.clone(),
            memberships: directory,
            grants: Arc::new(MemoryRoleGrantStore::new()),
            tags: Arc::new(MemoryTagStore::new()),
        };
        Self::from_stores(config, stores, clock)
    }

    /// Lifetime to pass to [`SessionValidator::issue`].
    ///
    /// The server has no login route; library callers and tests issue sessions.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.config.session_ttl)
    }
}

/// Guard a route with the authorization boundary for `action`.
fn guarded(
    state: &AppState,
    action: OrganizationAction,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    // Layers run outermost-first: attach the action, then authorize against it
    route
        .route_layer(from_fn_with_state(state.clone(), auth::require_authorization))
        .route_layer(from_fn(auth::with_action(action)))
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    const MEMBER_ROLES: &str = "/api/organizations/{organization_id}/members/{user_id}/roles";
    const ORGANIZATION_TAGS: &str = "/api/organizations/{organization_id}/tags";

    let organization_routes = Router::new()
        .route(
            MEMBER_ROLES,
            guarded(&state, OrganizationAction::ViewRoles, get(roles::list_roles)),
        )
        .route(
            MEMBER_ROLES,
            guarded(
                &state,
                OrganizationAction::ManageRoles,
                post(roles::grant_role).delete(roles::revoke_roles),
            ),
        )
        .route(
            ORGANIZATION_TAGS,
            guarded(
                &state,
                OrganizationAction::ManageTags,
                post(tags::add_tags).delete(tags::remove_tags),
            ),
        );

    let session_routes = Router::new()
        .route("/api/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), auth::require_session));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(session_routes)
        .merge(organization_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Echo the caller's session.
async fn me(principal: AuthPrincipal) -> Json<AuthPrincipal> {
    Json(principal)
}
