//! `PostgreSQL` tag store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use warden_common::{EntityKind, EntityRef};

use super::models::Tag;
use super::store::TagStore;
use crate::db::{StoreError, StoreResult};

/// Tag store backed by the `tags` table.
#[derive(Debug, Clone)]
pub struct PgTagStore {
    pool: PgPool,
}

impl PgTagStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TagRow {
    id: Uuid,
    source_kind: String,
    source_id: Uuid,
    target_kind: Option<String>,
    target_id: Option<Uuid>,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TagRow> for Tag {
    type Error = StoreError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        let source_kind: EntityKind = row.source_kind.parse()?;
        let target_kind = row
            .target_kind
            .as_deref()
            .map(str::parse::<EntityKind>)
            .transpose()?;

        Ok(Self {
            id: row.id,
            source: EntityRef::new(source_kind, row.source_id),
            target: EntityRef::from_parts(target_kind, row.target_id)?,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TagStore for PgTagStore {
    #[tracing::instrument(skip(self))]
    async fn tags_for(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<Tag>> {
        let (target_kind, target_id) = EntityRef::into_parts(target);

        let rows: Vec<TagRow> = sqlx::query_as(
            "SELECT id, source_kind, source_id, target_kind, target_id, name, created_at
             FROM tags
             WHERE source_kind = $1 AND source_id = $2
               AND target_kind IS NOT DISTINCT FROM $3
               AND target_id IS NOT DISTINCT FROM $4
             ORDER BY created_at, id",
        )
        .bind(source.kind.as_str())
        .bind(source.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tag::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn insert_missing(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let (target_kind, target_id) = EntityRef::into_parts(target);
        let ids: Vec<Uuid> = names.iter().map(|_| Uuid::now_v7()).collect();

        // The unique index on (source, target, name) turns duplicates into no-ops;
        // RETURNING only reports rows that were really inserted.
        let added: Vec<String> = sqlx::query_scalar(
            "INSERT INTO tags (id, source_kind, source_id, target_kind, target_id, name)
             SELECT candidate.id, $1, $2, $3::text, $4::uuid, candidate.name
             FROM UNNEST($5::uuid[], $6::text[]) AS candidate(id, name)
             ON CONFLICT DO NOTHING
             RETURNING name",
        )
        .bind(source.kind.as_str())
        .bind(source.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .bind(&ids)
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(added)
    }

    #[tracing::instrument(skip(self))]
    async fn remove(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<u64> {
        let (target_kind, target_id) = EntityRef::into_parts(target);

        let result = sqlx::query(
            "DELETE FROM tags
             WHERE source_kind = $1 AND source_id = $2
               AND target_kind IS NOT DISTINCT FROM $3
               AND target_id IS NOT DISTINCT FROM $4
               AND name = ANY($5)",
        )
        .bind(source.kind.as_str())
        .bind(source.id)
        .bind(target_kind.map(|k| k.as_str()))
        .bind(target_id)
        .bind(names)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self))]
    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64> {
        let result = sqlx::query(
            "DELETE FROM tags
             WHERE (source_kind = $1 AND source_id = $2)
                OR (target_kind = $1 AND target_id = $2)",
        )
        .bind(entity.kind.as_str())
        .bind(entity.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
