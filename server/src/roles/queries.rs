//! `PostgreSQL` role grant store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use warden_common::{EntityKind, EntityRef};

use super::models::RoleGrant;
use super::store::RoleGrantStore;
use crate::db::{StoreError, StoreResult};

const GRANT_COLUMNS: &str =
    "id, owner_kind, owner_id, target_kind, target_id, role_name, created_at";

/// Role grant store backed by the `role_grants` table.
#[derive(Debug, Clone)]
pub struct PgRoleGrantStore {
    pool: PgPool,
}

impl PgRoleGrantStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    id: Uuid,
    owner_kind: String,
    owner_id: Uuid,
    target_kind: Option<String>,
    target_id: Option<Uuid>,
    role_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleGrantRow> for RoleGrant {
    type Error = StoreError;

    fn try_from(row: RoleGrantRow) -> Result<Self, Self::Error> {
        let owner_kind: EntityKind = row.owner_kind.parse()?;
        let target_kind = row
            .target_kind
            .as_deref()
            .map(str::parse::<EntityKind>)
            .transpose()?;

        Ok(Self {
            id: row.id,
            owner: EntityRef::new(owner_kind, row.owner_id),
            target: EntityRef::from_parts(target_kind, row.target_id)?,
            role_name: row.role_name,
            created_at: row.created_at,
        })
    }
}

fn into_grants(rows: Vec<RoleGrantRow>) -> StoreResult<Vec<RoleGrant>> {
    rows.into_iter().map(RoleGrant::try_from).collect()
}

/// Advisory lock key for one (owner, target) pair.
fn pair_lock_key(owner: &EntityRef, target: Option<&EntityRef>) -> String {
    match target {
        Some(target) => format!("{owner}|{target}"),
        None => format!("{owner}|global"),
    }
}

async fn insert_grant(
    tx: &mut Transaction<'_, Postgres>,
    grant: &RoleGrant,
) -> StoreResult<RoleGrant> {
    let (target_kind, target_id) = EntityRef::into_parts(grant.target.as_ref());

    let row: RoleGrantRow = sqlx::query_as(&format!(
        "INSERT INTO role_grants (id, owner_kind, owner_id, target_kind, target_id, role_name, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {GRANT_COLUMNS}"
    ))
    .bind(grant.id)
    .bind(grant.owner.kind.as_str())
    .bind(grant.owner.id)
    .bind(target_kind.map(|k| k.as_str()))
    .bind(target_id)
    .bind(&grant.role_name)
    .bind(grant.created_at)
    .fetch_one(&mut **tx)
    .await?;

    row.try_into()
}

#[async_trait]
impl RoleGrantStore for PgRoleGrantStore {
    #[tracing::instrument(skip(self))]
    async fn grants_for(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<RoleGrant>> {
        let (target_kind, target_id) = EntityRef::into_parts(target);

        let rows: Vec<RoleGrantRow> = sqlx::query_as(&format!(
            "SELECT {GRANT_COLUMNS} FROM role_grants
             WHERE owner_kind = $1 AND owner_id = $2
               AND target_kind IS NOT DISTINCT FROM $3
               AND target_id IS NOT DISTINCT FROM $4
             ORDER BY created_at, id"
        ))
        .bind(owner.kind.as_str())
        .bind(owner.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        into_grants(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn find(&self, id: Uuid) -> StoreResult<Option<RoleGrant>> {
        let row: Option<RoleGrantRow> =
            sqlx::query_as(&format!("SELECT {GRANT_COLUMNS} FROM role_grants WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(RoleGrant::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, grant: RoleGrant) -> StoreResult<RoleGrant> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_grant(&mut tx, &grant).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_and_insert(
        &self,
        grant: RoleGrant,
        exclusive: &[&str],
    ) -> StoreResult<RoleGrant> {
        let (target_kind, target_id) = EntityRef::into_parts(grant.target.as_ref());
        let exclusive: Vec<String> = exclusive.iter().map(ToString::to_string).collect();

        let mut tx = self.pool.begin().await?;

        // Serialize replacement per (owner, target) pair so two concurrent
        // grants cannot both delete-then-insert against the same snapshot.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 61))")
            .bind(pair_lock_key(&grant.owner, grant.target.as_ref()))
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM role_grants
             WHERE owner_kind = $1 AND owner_id = $2
               AND target_kind IS NOT DISTINCT FROM $3
               AND target_id IS NOT DISTINCT FROM $4
               AND role_name = ANY($5)",
        )
        .bind(grant.owner.kind.as_str())
        .bind(grant.owner.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .bind(&exclusive)
        .execute(&mut *tx)
        .await?;

        let inserted = insert_grant(&mut tx, &grant).await?;

        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(skip(self))]
    async fn revoke(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
        role: Option<&str>,
    ) -> StoreResult<u64> {
        let (target_kind, target_id) = EntityRef::into_parts(target);

        let result = sqlx::query(
            "DELETE FROM role_grants
             WHERE owner_kind = $1 AND owner_id = $2
               AND target_kind IS NOT DISTINCT FROM $3
               AND target_id IS NOT DISTINCT FROM $4
               AND ($5::text IS NULL OR role_name = $5)",
        )
        .bind(owner.kind.as_str())
        .bind(owner.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self))]
    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64> {
        let result = sqlx::query(
            "DELETE FROM role_grants
             WHERE (owner_kind = $1 AND owner_id = $2)
                OR (target_kind = $1 AND target_id = $2)",
        )
        .bind(entity.kind.as_str())
        .bind(entity.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
