//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router over in-memory stores, plus utilities for seeding entities and
//! minting session credentials.
//!
//! ## Database-backed tests
//!
//! Use [`create_test_pool()`] in `#[ignore]` tests that need `PostgreSQL`.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, header, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use warden_common::{EntityRef, SessionScope};
use warden_server::api::{create_router, AppState};
use warden_server::config::Config;
use warden_server::entities::{Entity, MemoryDirectory};
use warden_server::session::FixedClock;

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router over in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub directory: Arc<MemoryDirectory>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    /// Create a new test app with the default test configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let state = AppState::in_memory(config, directory.clone(), clock.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            directory,
            clock,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Register an active user and return its reference.
    pub fn create_user(&self, name: &str) -> EntityRef {
        let user = EntityRef::user(Uuid::now_v7());
        self.directory.insert(Entity::new(user, name));
        user
    }

    /// Register an organization and return its reference.
    pub fn create_organization(&self, name: &str) -> EntityRef {
        let organization = EntityRef::organization(Uuid::now_v7());
        self.directory.insert(Entity::new(organization, name));
        organization
    }

    /// Register a user as a member of `organization`.
    pub fn create_member(&self, name: &str, organization: &EntityRef) -> EntityRef {
        let user = self.create_user(name);
        self.directory.add_member(user.id, organization.id);
        user
    }

    /// Grant `role` to `owner` directly, bypassing the HTTP layer.
    pub async fn grant(&self, owner: &EntityRef, role: &str, target: Option<&EntityRef>) {
        self.state
            .grants
            .create_for(owner, role, target)
            .await
            .expect("Failed to grant role");
    }

    /// Mint a session credential for `identity` at the current test clock.
    pub fn token(&self, identity: &EntityRef, scope: SessionScope) -> String {
        self.state
            .validator
            .issue(identity, scope, self.state.session_ttl(), Map::new())
            .expect("Failed to issue session")
    }

    /// Mint a user-scoped session credential.
    pub fn user_token(&self, identity: &EntityRef) -> String {
        self.token(identity, SessionScope::User)
    }

    /// Move the test clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

/// Roles route for a member of an organization.
pub fn roles_uri(organization: &EntityRef, member: &EntityRef) -> String {
    format!(
        "/api/organizations/{}/members/{}/roles",
        organization.id, member.id
    )
}

/// Tags route for an organization.
pub fn tags_uri(organization: &EntityRef) -> String {
    format!("/api/organizations/{}/tags", organization.id)
}

/// Add a bearer token to a request builder.
pub fn bearer(builder: http::request::Builder, token: &str) -> http::request::Builder {
    builder.header(header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Build a JSON request body.
pub fn json_body(builder: http::request::Builder, value: &Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .expect("Failed to build request")
}

/// Build a request without a body.
pub fn empty(builder: http::request::Builder) -> Request<Body> {
    builder.body(Body::empty()).expect("Failed to build request")
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

/// Assert a status and return the JSON body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_to_json(response).await
}

// ============================================================================
// Database helpers
// ============================================================================

/// Helper to create a test database pool with migrations applied.
pub async fn create_test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/warden_test".into());

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    warden_server::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}
