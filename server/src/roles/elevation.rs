//! Elevation algorithms over the role catalog.
//!
//! All roles share one global ranking by priority (lower number = more
//! elevated). The owner/target kinds passed in only decide which roles are
//! visible; they never change the order.

use std::fmt;
use std::str::FromStr;

use warden_common::{EntityKind, EntityRef, TargetKind};

use super::catalog::{visible, RoleDefinition, CATALOG};
use super::error::RoleError;

/// Which part of the catalog is consulted when ranking an actor's roles
/// against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationMode {
    /// Every catalog role counts, whatever its target kinds.
    FullCatalog,
    /// Only roles applicable to `Global` or to the target's own kind count.
    #[default]
    ScopeRestricted,
}

impl ElevationMode {
    /// Target kinds visible when evaluating against `target`.
    #[must_use]
    pub fn target_kinds(&self, target: Option<&EntityRef>) -> Vec<TargetKind> {
        match self {
            Self::FullCatalog => TargetKind::all().to_vec(),
            Self::ScopeRestricted => match target {
                Some(t) => vec![TargetKind::Global, TargetKind::Entity(t.kind)],
                None => vec![TargetKind::Global],
            },
        }
    }
}

impl FromStr for ElevationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::FullCatalog),
            "scoped" => Ok(Self::ScopeRestricted),
            other => Err(format!("unknown elevation mode '{other}' (expected 'full' or 'scoped')")),
        }
    }
}

impl fmt::Display for ElevationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullCatalog => f.write_str("full"),
            Self::ScopeRestricted => f.write_str("scoped"),
        }
    }
}

/// Most elevated role among `names`.
///
/// Names without a visible definition are ignored. Ties go to the role
/// declared first, so the result does not depend on the order of `names`.
#[must_use]
pub fn highest_elevated<S: AsRef<str>>(
    names: &[S],
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Option<&'static RoleDefinition> {
    highest_in(CATALOG, names, owner_kinds, target_kinds)
}

/// Every visible role strictly more elevated than `name`, most elevated first.
///
/// Empty when `name` is unknown or not visible.
#[must_use]
pub fn more_elevated_than(
    name: &str,
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Vec<&'static RoleDefinition> {
    let Some(pivot) = visible(CATALOG, owner_kinds, target_kinds).find(|d| d.name == name) else {
        return Vec::new();
    };

    let mut roles: Vec<_> = visible(CATALOG, owner_kinds, target_kinds)
        .filter(|d| d.priority < pivot.priority)
        .collect();
    roles.sort_by_key(|d| d.priority);
    roles
}

/// Every visible role strictly less elevated than `name`, nearest first.
///
/// Empty when `name` is unknown or not visible.
#[must_use]
pub fn less_elevated_than(
    name: &str,
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Vec<&'static RoleDefinition> {
    let Some(pivot) = visible(CATALOG, owner_kinds, target_kinds).find(|d| d.name == name) else {
        return Vec::new();
    };

    let mut roles: Vec<_> = visible(CATALOG, owner_kinds, target_kinds)
        .filter(|d| d.priority > pivot.priority)
        .collect();
    roles.sort_by_key(|d| d.priority);
    roles
}

/// Check that an actor holding `actor_roles` may grant or revoke `role_name`.
///
/// Rules:
/// 1. The role must exist in scope
/// 2. The actor must hold at least one visible role
/// 3. Cannot assign roles at or above your own elevation
pub fn can_assign<S: AsRef<str>>(
    actor_roles: &[S],
    role_name: &str,
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Result<(), RoleError> {
    let target = visible(CATALOG, owner_kinds, target_kinds)
        .find(|d| d.name == role_name)
        .ok_or_else(|| RoleError::UnknownRole {
            role: role_name.to_string(),
            owner_kind: owner_kinds.first().copied().unwrap_or(EntityKind::User),
        })?;

    let actor = highest_elevated(actor_roles, owner_kinds, target_kinds).ok_or(RoleError::NoRole)?;

    if !actor.is_more_elevated_than(target) {
        return Err(RoleError::Hierarchy {
            actor_role: actor.name,
            role: target.name,
        });
    }

    Ok(())
}

fn highest_in<S: AsRef<str>>(
    catalog: &'static [RoleDefinition],
    names: &[S],
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Option<&'static RoleDefinition> {
    // Walk the catalog rather than `names` so input order cannot matter;
    // `min_by_key` keeps the first of equal minima.
    visible(catalog, owner_kinds, target_kinds)
        .filter(|d| names.iter().any(|n| n.as_ref() == d.name))
        .min_by_key(|d| d.priority)
}
