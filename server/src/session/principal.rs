//! Authenticated session principal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;
use warden_common::{EntityRef, SessionScope};

/// The identity a validated credential speaks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPrincipal {
    pub identity: EntityRef,
    pub scope: SessionScope,
    /// Claims beyond the registered ones, passed through untouched.
    pub claims: Map<String, Value>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub session_id: Uuid,
}
