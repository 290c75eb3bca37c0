//! `PostgreSQL` entity registry.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use warden_common::{EntityKind, EntityRef};

use super::{Entity, EntityStore, MembershipStore};
use crate::db::StoreResult;

/// Entity registry backed by the `users`, `organizations` and `teams` tables.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EntityRow {
    name: String,
    active: bool,
}

/// Lookup statement for each entity kind.
const fn select_by_id(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "SELECT name, active FROM users WHERE id = $1",
        EntityKind::Organization => "SELECT name, active FROM organizations WHERE id = $1",
        EntityKind::Team => "SELECT name, active FROM teams WHERE id = $1",
    }
}

#[async_trait]
impl EntityStore for PgDirectory {
    #[tracing::instrument(skip(self))]
    async fn find(&self, entity: &EntityRef) -> StoreResult<Option<Entity>> {
        let row: Option<EntityRow> = sqlx::query_as(select_by_id(entity.kind))
            .bind(entity.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Entity {
            reference: *entity,
            name: row.name,
            active: row.active,
        }))
    }
}

#[async_trait]
impl MembershipStore for PgDirectory {
    #[tracing::instrument(skip(self))]
    async fn is_member(&self, user_id: Uuid, organization_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM organization_members WHERE organization_id = $1 AND user_id = $2)",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
