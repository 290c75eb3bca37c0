//! Entity Registry
//!
//! Lazy resolution of polymorphic `(kind, id)` references and organization
//! membership lookups. Both are read-only collaborators of the authorization
//! core; writes happen elsewhere.

mod memory;
mod queries;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use warden_common::EntityRef;

use crate::db::StoreResult;

pub use memory::MemoryDirectory;
pub use queries::PgDirectory;

/// A resolved entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// The reference this entity was resolved from.
    pub reference: EntityRef,
    /// Human-readable name.
    pub name: String,
    /// Deactivated entities still resolve but cannot authenticate.
    pub active: bool,
}

impl Entity {
    #[must_use]
    pub fn new(reference: EntityRef, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            active: true,
        }
    }
}

/// Lookup of entities by polymorphic reference.
///
/// This is the single resolution path for owners and targets: callers never
/// branch on the kind themselves.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Resolve a reference. `Ok(None)` when the entity does not exist.
    async fn find(&self, entity: &EntityRef) -> StoreResult<Option<Entity>>;
}

/// Organization membership lookup.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Whether `user_id` belongs to `organization_id`.
    async fn is_member(&self, user_id: Uuid, organization_id: Uuid) -> StoreResult<bool>;
}
