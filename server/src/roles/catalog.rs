//! Compiled-in role catalog.
//!
//! The catalog is a static, read-only table. Declaration order matters: it is
//! the order every listing returns and the tie-breaker for equal priorities.

use warden_common::{EntityKind, TargetKind};

/// Role names shipped in the catalog.
pub mod names {
    pub const MASTERADMIN: &str = "masteradmin";
    pub const SUPPORT: &str = "support";
    pub const SUPERADMIN: &str = "superadmin";
    pub const ADMIN: &str = "admin";
    pub const MEMBER: &str = "member";
    pub const INVITE_TO_ORGANIZATION: &str = "invite-to-organization";
}

/// Display label for one (owner kind, target kind) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleLabel {
    pub owner_kind: EntityKind,
    pub target_kind: TargetKind,
    pub text: &'static str,
}

/// A role definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Unique role name.
    pub name: &'static str,
    /// Entity kinds allowed to hold this role.
    pub owner_kinds: &'static [EntityKind],
    /// Target kinds this role may be scoped to.
    pub target_kinds: &'static [TargetKind],
    /// Elevation rank, lower number = more elevated.
    pub priority: i32,
    /// Primary roles are mutually exclusive per (owner, target) pair.
    pub is_primary: bool,
    /// Display labels. Combinations without a label have no display name.
    pub labels: &'static [RoleLabel],
}

impl RoleDefinition {
    /// Whether this definition is visible for the given owner and target kinds.
    #[must_use]
    pub fn applies_to(&self, owner_kinds: &[EntityKind], target_kinds: &[TargetKind]) -> bool {
        self.owner_kinds.iter().any(|k| owner_kinds.contains(k))
            && self.target_kinds.iter().any(|k| target_kinds.contains(k))
    }

    /// Label for exactly this (owner kind, target kind) pair.
    #[must_use]
    pub fn label_for(
        &self,
        owner_kind: EntityKind,
        target_kind: TargetKind,
    ) -> Option<&'static str> {
        self.labels
            .iter()
            .find(|l| l.owner_kind == owner_kind && l.target_kind == target_kind)
            .map(|l| l.text)
    }

    /// Whether `self` outranks `other`.
    #[must_use]
    pub const fn is_more_elevated_than(&self, other: &Self) -> bool {
        self.priority < other.priority
    }
}

const USER: &[EntityKind] = &[EntityKind::User];
const GLOBAL: TargetKind = TargetKind::Global;
const ORGANIZATION: TargetKind = TargetKind::Entity(EntityKind::Organization);
const TEAM: TargetKind = TargetKind::Entity(EntityKind::Team);

const fn label(target_kind: TargetKind, text: &'static str) -> RoleLabel {
    RoleLabel {
        owner_kind: EntityKind::User,
        target_kind,
        text,
    }
}

/// The role catalog, in declaration order.
pub static CATALOG: &[RoleDefinition] = &[
    RoleDefinition {
        name: names::MASTERADMIN,
        owner_kinds: USER,
        target_kinds: &[GLOBAL],
        priority: 0,
        is_primary: true,
        labels: &[label(GLOBAL, "Master Administrator")],
    },
    RoleDefinition {
        name: names::SUPPORT,
        owner_kinds: USER,
        target_kinds: &[GLOBAL],
        priority: 1,
        is_primary: true,
        labels: &[label(GLOBAL, "Support")],
    },
    RoleDefinition {
        name: names::SUPERADMIN,
        owner_kinds: USER,
        target_kinds: &[GLOBAL, ORGANIZATION],
        priority: 2,
        is_primary: true,
        // No label for the global target: an unscoped superadmin has no display name.
        labels: &[label(ORGANIZATION, "Owner")],
    },
    RoleDefinition {
        name: names::ADMIN,
        owner_kinds: USER,
        target_kinds: &[ORGANIZATION],
        priority: 3,
        is_primary: true,
        labels: &[label(ORGANIZATION, "Administrator")],
    },
    RoleDefinition {
        name: names::MEMBER,
        owner_kinds: USER,
        target_kinds: &[ORGANIZATION, TEAM],
        priority: 4,
        is_primary: true,
        labels: &[label(ORGANIZATION, "Member"), label(TEAM, "Team Member")],
    },
    RoleDefinition {
        name: names::INVITE_TO_ORGANIZATION,
        owner_kinds: USER,
        target_kinds: &[ORGANIZATION],
        priority: 5,
        is_primary: false,
        labels: &[label(ORGANIZATION, "Can Invite Members")],
    },
];

/// Look up a definition by name in the full catalog, ignoring scope.
#[must_use]
pub fn definition_named(name: &str) -> Option<&'static RoleDefinition> {
    CATALOG.iter().find(|d| d.name == name)
}

/// Definitions visible for the given scopes, in declaration order.
#[must_use]
pub fn definitions_for(
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Vec<&'static RoleDefinition> {
    visible(CATALOG, owner_kinds, target_kinds).collect()
}

/// Primary definitions visible for the given scopes, in declaration order.
#[must_use]
pub fn primary_definitions_for(
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Vec<&'static RoleDefinition> {
    visible(CATALOG, owner_kinds, target_kinds)
        .filter(|d| d.is_primary)
        .collect()
}

/// Definition named `name`, if it is visible for the given scopes.
#[must_use]
pub fn definition_by_name(
    name: &str,
    owner_kinds: &[EntityKind],
    target_kinds: &[TargetKind],
) -> Option<&'static RoleDefinition> {
    visible(CATALOG, owner_kinds, target_kinds).find(|d| d.name == name)
}

/// Display name for a role held by `owner_kind` on `target_kind`.
///
/// `None` means the combination has no label. Callers show no label rather
/// than inventing one.
#[must_use]
pub fn display_name(
    name: &str,
    owner_kind: EntityKind,
    target_kind: Option<EntityKind>,
) -> Option<&'static str> {
    definition_named(name)?.label_for(owner_kind, TargetKind::from(target_kind))
}

pub(crate) fn visible<'a>(
    catalog: &'static [RoleDefinition],
    owner_kinds: &'a [EntityKind],
    target_kinds: &'a [TargetKind],
) -> impl Iterator<Item = &'static RoleDefinition> + 'a {
    catalog
        .iter()
        .filter(move |d| d.applies_to(owner_kinds, target_kinds))
}
