//! Role Error Types

use thiserror::Error;
use warden_common::EntityKind;

use crate::db::StoreError;

/// Errors raised by the role catalog and grant protocol.
#[derive(Debug, Error)]
pub enum RoleError {
    /// No catalog definition for this role applies to the owner.
    #[error("Unknown role '{role}' for owner kind {owner_kind}")]
    UnknownRole {
        role: String,
        owner_kind: EntityKind,
    },

    /// The actor holds no role visible in this scope.
    #[error("No applicable role held")]
    NoRole,

    /// Attempted to assign a role at or above the actor's own elevation.
    #[error("Cannot assign role '{role}' (your highest role: '{actor_role}')")]
    Hierarchy {
        actor_role: &'static str,
        role: &'static str,
    },

    /// Backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
