//! In-memory entity registry.
//!
//! Backs tests and local development. Uses `DashMap` so lookups never block
//! concurrent writers.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;
use warden_common::EntityRef;

use super::{Entity, EntityStore, MembershipStore};
use crate::db::StoreResult;

/// Thread-safe in-memory directory of entities and memberships.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entities: DashMap<EntityRef, Entity>,
    /// (`organization_id`, `user_id`) pairs.
    memberships: DashSet<(Uuid, Uuid)>,
}

impl MemoryDirectory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub fn insert(&self, entity: Entity) {
        self.entities.insert(entity.reference, entity);
    }

    /// Delete an entity. Memberships involving it are dropped as well.
    ///
    /// Grants and tags referencing the entity are left alone; purging them is
    /// the owning store's job.
    pub fn delete(&self, entity: &EntityRef) -> bool {
        self.memberships
            .retain(|(org, user)| *org != entity.id && *user != entity.id);
        self.entities.remove(entity).is_some()
    }

    /// Mark an entity inactive.
    pub fn deactivate(&self, entity: &EntityRef) {
        if let Some(mut found) = self.entities.get_mut(entity) {
            found.active = false;
        }
    }

    pub fn add_member(&self, user_id: Uuid, organization_id: Uuid) {
        self.memberships.insert((organization_id, user_id));
    }

    /// Drop a membership, returning whether it existed.
    pub fn remove_member(&self, user_id: Uuid, organization_id: Uuid) -> bool {
        self.memberships.remove(&(organization_id, user_id)).is_some()
    }
}

#[async_trait]
impl EntityStore for MemoryDirectory {
    async fn find(&self, entity: &EntityRef) -> StoreResult<Option<Entity>> {
        Ok(self.entities.get(entity).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl MembershipStore for MemoryDirectory {
    async fn is_member(&self, user_id: Uuid, organization_id: Uuid) -> StoreResult<bool> {
        Ok(self.memberships.contains(&(organization_id, user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_resolves_by_kind_and_id() {
        let directory = MemoryDirectory::new();
        let id = Uuid::now_v7();
        directory.insert(Entity::new(EntityRef::organization(id), "Acme"));

        let found = directory.find(&EntityRef::organization(id)).await.unwrap();
        assert_eq!(found.map(|e| e.name), Some("Acme".to_string()));

        // Same id under another kind is a different entity
        let other = directory.find(&EntityRef::team(id)).await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_delete_drops_memberships() {
        let directory = MemoryDirectory::new();
        let user = EntityRef::user(Uuid::now_v7());
        let org = EntityRef::organization(Uuid::now_v7());
        directory.insert(Entity::new(user, "alice"));
        directory.insert(Entity::new(org, "Acme"));
        directory.add_member(user.id, org.id);

        assert!(directory.is_member(user.id, org.id).await.unwrap());
        assert!(directory.delete(&org));
        assert!(!directory.is_member(user.id, org.id).await.unwrap());
        assert!(directory.find(&org).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_keeps_entity_resolvable() {
        let directory = MemoryDirectory::new();
        let user = EntityRef::user(Uuid::now_v7());
        directory.insert(Entity::new(user, "bob"));

        directory.deactivate(&user);

        let found = directory.find(&user).await.unwrap().unwrap();
        assert!(!found.active);
    }
}
