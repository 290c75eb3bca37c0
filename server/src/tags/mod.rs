//! Free-form tags on polymorphic (source, target) pairs.
//!
//! Same reference shape as role grants, without elevation semantics. Adding a
//! tag is idempotent: a name already on the pair is silently skipped.

mod models;
pub mod name;
mod queries;
mod store;

use std::sync::Arc;

use tracing::debug;
use warden_common::EntityRef;

use crate::db::StoreResult;

pub use models::Tag;
pub use queries::PgTagStore;
pub use store::{MemoryTagStore, TagStore};

/// Tag operations with name normalization.
#[derive(Clone)]
pub struct Tags {
    store: Arc<dyn TagStore>,
}

impl Tags {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Add `names` to the pair.
    ///
    /// Names are normalized first; empties and duplicates are dropped. Returns
    /// the names that were newly added, excluding those already present.
    #[tracing::instrument(skip(self))]
    pub async fn add<S: AsRef<str> + std::fmt::Debug + Sync>(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[S],
    ) -> StoreResult<Vec<String>> {
        let names = name::normalize_all(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let added = self.store.insert_missing(source, target, &names).await?;
        debug!(source = %source, target = ?target, added = ?added, "Tags added");
        Ok(added)
    }

    /// Remove `names` from the pair.
    ///
    /// Unknown names are ignored. Returns the names still on the pair afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn remove<S: AsRef<str> + std::fmt::Debug + Sync>(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
        names: &[S],
    ) -> StoreResult<Vec<String>> {
        let names = name::normalize_all(names);
        if !names.is_empty() {
            let removed = self.store.remove(source, target, &names).await?;
            debug!(source = %source, target = ?target, removed, "Tags removed");
        }
        self.names_for(source, target).await
    }

    /// Tag names on the pair, oldest first.
    pub async fn names_for(
        &self,
        source: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<String>> {
        Ok(self
            .store
            .tags_for(source, target)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }

    /// Drop every tag whose source or target is `entity`.
    pub async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64> {
        self.store.purge_entity(entity).await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn tags() -> Tags {
        Tags::new(Arc::new(MemoryTagStore::new()))
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let tags = tags();
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());

        let added = tags.add(&alice, Some(&acme), &["vip", "beta"]).await.unwrap();
        assert_eq!(added, vec!["vip", "beta"]);

        // Second add reports nothing new and stores nothing twice
        let added = tags.add(&alice, Some(&acme), &["vip"]).await.unwrap();
        assert!(added.is_empty());
        assert_eq!(
            tags.names_for(&alice, Some(&acme)).await.unwrap(),
            vec!["vip", "beta"]
        );
    }

    #[tokio::test]
    async fn test_add_reports_only_new_names() {
        let tags = tags();
        let alice = EntityRef::user(Uuid::now_v7());

        tags.add(&alice, None, &["vip"]).await.unwrap();
        let added = tags.add(&alice, None, &["v!ip", "new one", "???"]).await.unwrap();
        assert_eq!(added, vec!["newone"]);
    }

    #[tokio::test]
    async fn test_global_and_scoped_tags_are_separate() {
        let tags = tags();
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());

        tags.add(&alice, None, &["vip"]).await.unwrap();
        let added = tags.add(&alice, Some(&acme), &["vip"]).await.unwrap();
        assert_eq!(added, vec!["vip"]);
    }

    #[tokio::test]
    async fn test_remove_returns_remaining_and_ignores_unknown() {
        let tags = tags();
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());

        tags.add(&alice, Some(&acme), &["vip", "beta", "churn-risk"]).await.unwrap();
        let remaining = tags
            .remove(&alice, Some(&acme), &["beta", "missing", "!!"])
            .await
            .unwrap();
        assert_eq!(remaining, vec!["vip", "churn-risk"]);
    }

    #[tokio::test]
    async fn test_purge_entity_drops_source_and_target_tags() {
        let tags = tags();
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());

        tags.add(&alice, Some(&acme), &["vip"]).await.unwrap();
        tags.add(&acme, None, &["enterprise"]).await.unwrap();
        tags.add(&alice, None, &["staff"]).await.unwrap();

        assert_eq!(tags.purge_entity(&acme).await.unwrap(), 2);
        assert_eq!(tags.names_for(&alice, None).await.unwrap(), vec!["staff"]);
    }
}
