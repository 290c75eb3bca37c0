//! Tag model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use warden_common::EntityRef;

/// A free-form label attached by a source to a target (or globally).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub source: EntityRef,
    /// `None` means the tag applies globally.
    pub target: Option<EntityRef>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    #[must_use]
    pub fn new(source: EntityRef, target: Option<EntityRef>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            source,
            target,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this tag belongs to exactly this (source, target) pair.
    #[must_use]
    pub fn is_for(&self, source: &EntityRef, target: Option<&EntityRef>) -> bool {
        self.source == *source && self.target.as_ref() == target
    }

    #[must_use]
    pub fn references(&self, entity: &EntityRef) -> bool {
        self.source == *entity || self.target.as_ref() == Some(entity)
    }
}
