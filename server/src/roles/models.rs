//! Role grant model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use warden_common::EntityRef;

use super::catalog;

/// A role held by an owner, scoped to a target or global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleGrant {
    pub id: Uuid,
    pub owner: EntityRef,
    /// `None` means the grant applies globally.
    pub target: Option<EntityRef>,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

impl RoleGrant {
    /// Build a new, not yet persisted grant.
    #[must_use]
    pub fn new(owner: EntityRef, target: Option<EntityRef>, role_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner,
            target,
            role_name: role_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this grant belongs to exactly this (owner, target) pair.
    #[must_use]
    pub fn is_for(&self, owner: &EntityRef, target: Option<&EntityRef>) -> bool {
        self.owner == *owner && self.target.as_ref() == target
    }

    /// Whether `entity` is this grant's owner or target.
    #[must_use]
    pub fn references(&self, entity: &EntityRef) -> bool {
        self.owner == *entity || self.target.as_ref() == Some(entity)
    }

    /// Display label for this grant, if the catalog defines one.
    #[must_use]
    pub fn display_name(&self) -> Option<&'static str> {
        catalog::display_name(
            &self.role_name,
            self.owner.kind,
            self.target.map(|t| t.kind),
        )
    }
}
