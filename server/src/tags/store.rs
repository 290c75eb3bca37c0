//! Tag persistence.

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_common::EntityRef;

use super::models::Tag;
use crate::db::StoreResult;

/// Storage for tags.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Tags on exactly this (source, target) pair, oldest first.
    async fn tags_for(&self, source: &EntityRef, target: Option<&EntityRef>)
        -> StoreResult<Vec<Tag>>;

    /// Insert every name not already present on the pair.
    ///
    /// Returns only the names that were actually inserted.
    async fn insert_missing(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<Vec<String>>;

    /// Delete the named tags from the pair. Returns the number removed.
    async fn remove(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<u64>;

    /// Delete every tag whose source or target is `entity`.
    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64>;
}

/// In-memory tag store.
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    tags: RwLock<Vec<Tag>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn tags_for(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<Tag>> {
        let tags = self.tags.read().await;
        Ok(tags
            .iter()
            .filter(|t| t.is_for(source, target))
            .cloned()
            .collect())
    }

    async fn insert_missing(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<Vec<String>> {
        let mut tags = self.tags.write().await;
        let mut added = Vec::new();
        for name in names {
            let exists = tags
                .iter()
                .any(|t| t.is_for(source, target) && t.name == *name);
            if !exists {
                tags.push(Tag::new(*source, target.copied(), name.clone()));
                added.push(name.clone());
            }
        }
        Ok(added)
    }

    async fn remove(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[String],
    ) -> StoreResult<u64> {
        let mut tags = self.tags.write().await;
        let before = tags.len();
        tags.retain(|t| !(t.is_for(source, target) && names.contains(&t.name)));
        Ok((before - tags.len()) as u64)
    }

    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64> {
        let mut tags = self.tags.write().await;
        let before = tags.len();
        tags.retain(|t| !t.references(entity));
        Ok((before - tags.len()) as u64)
    }
}
