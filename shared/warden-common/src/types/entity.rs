//! Entity Types
//!
//! Every owner or target in the system is addressed by a `(kind, id)` pair.
//! A missing target means "global".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Kind of entity that can own or be targeted by a grant or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A person (or service account) that can authenticate.
    User,
    /// A tenant grouping users.
    Organization,
    /// A sub-group inside an organization.
    Team,
}

impl EntityKind {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Organization => "Organization",
            Self::Team => "Team",
        }
    }

    /// Every entity kind, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Organization, Self::Team]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownEntityKind(s.to_string()))
    }
}

/// Kind of target a role or tag may be scoped to.
///
/// `Global` stands for "no specific target".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Applies across all targets.
    Global,
    /// Scoped to a specific entity of this kind.
    Entity(EntityKind),
}

impl TargetKind {
    /// Target kind of an optional target reference.
    #[must_use]
    pub fn of(target: Option<&EntityRef>) -> Self {
        target.map_or(Self::Global, |t| Self::Entity(t.kind))
    }

    /// Every target kind: `Global` followed by each entity kind.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Global,
            Self::Entity(EntityKind::User),
            Self::Entity(EntityKind::Organization),
            Self::Entity(EntityKind::Team),
        ]
    }
}

impl From<Option<EntityKind>> for TargetKind {
    fn from(kind: Option<EntityKind>) -> Self {
        kind.map_or(Self::Global, Self::Entity)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("Global"),
            Self::Entity(kind) => kind.fmt(f),
        }
    }
}

/// Polymorphic reference to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity ID.
    pub id: Uuid,
}

impl EntityRef {
    #[must_use]
    pub const fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    #[must_use]
    pub const fn user(id: Uuid) -> Self {
        Self::new(EntityKind::User, id)
    }

    #[must_use]
    pub const fn organization(id: Uuid) -> Self {
        Self::new(EntityKind::Organization, id)
    }

    #[must_use]
    pub const fn team(id: Uuid) -> Self {
        Self::new(EntityKind::Team, id)
    }

    /// Rebuild an optional target from its nullable column pair.
    ///
    /// Both halves must be present or both absent.
    pub fn from_parts(kind: Option<EntityKind>, id: Option<Uuid>) -> Result<Option<Self>> {
        match (kind, id) {
            (Some(kind), Some(id)) => Ok(Some(Self::new(kind, id))),
            (None, None) => Ok(None),
            _ => Err(Error::PartialTarget),
        }
    }

    /// Split an optional target into its nullable column pair.
    #[must_use]
    pub fn into_parts(target: Option<&Self>) -> (Option<EntityKind>, Option<Uuid>) {
        (target.map(|t| t.kind), target.map(|t| t.id))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
