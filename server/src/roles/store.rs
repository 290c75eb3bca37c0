//! Role grant persistence.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_common::EntityRef;

use super::models::RoleGrant;
use crate::db::StoreResult;

/// Storage for role grants.
#[async_trait]
pub trait RoleGrantStore: Send + Sync {
    /// Grants for exactly this (owner, target) pair, oldest first.
    ///
    /// `target = None` returns only global grants.
    async fn grants_for(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<RoleGrant>>;

    /// Fetch a single grant.
    async fn find(&self, id: Uuid) -> StoreResult<Option<RoleGrant>>;

    /// Insert a grant as-is.
    async fn insert(&self, grant: RoleGrant) -> StoreResult<RoleGrant>;

    /// Delete every grant on the new grant's (owner, target) pair whose role is
    /// in `exclusive`, then insert the new grant.
    ///
    /// Must be one atomic unit: no reader sees both the old and new grant, and
    /// concurrent calls on the same pair leave exactly one of them behind.
    async fn replace_and_insert(
        &self,
        grant: RoleGrant,
        exclusive: &[&str],
    ) -> StoreResult<RoleGrant>;

    /// Delete grants on the pair; `role = None` deletes all of them.
    ///
    /// Returns the number of grants removed.
    async fn revoke(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
        role: Option<&str>,
    ) -> StoreResult<u64>;

    /// Delete every grant owned by or targeting `entity`.
    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64>;
}

/// In-memory role grant store.
///
/// A single `RwLock` guards the whole table, so replace-then-insert runs under
/// one write guard and readers only ever see committed states.
#[derive(Debug, Default)]
pub struct MemoryRoleGrantStore {
    grants: RwLock<Vec<RoleGrant>>,
}

impl MemoryRoleGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored grant, in insertion order.
    pub async fn all(&self) -> Vec<RoleGrant> {
        self.grants.read().await.clone()
    }
}

#[async_trait]
impl RoleGrantStore for MemoryRoleGrantStore {
    async fn grants_for(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
    ) -> StoreResult<Vec<RoleGrant>> {
        let grants = self.grants.read().await;
        Ok(grants
            .iter()
            .filter(|g| g.is_for(owner, target))
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<RoleGrant>> {
        let grants = self.grants.read().await;
        Ok(grants.iter().find(|g| g.id == id).cloned())
    }

    async fn insert(&self, grant: RoleGrant) -> StoreResult<RoleGrant> {
        self.grants.write().await.push(grant.clone());
        Ok(grant)
    }

    async fn replace_and_insert(
        &self,
        grant: RoleGrant,
        exclusive: &[&str],
    ) -> StoreResult<RoleGrant> {
        let mut grants = self.grants.write().await;
        grants.retain(|g| {
            !(g.is_for(&grant.owner, grant.target.as_ref())
                && exclusive.contains(&g.role_name.as_str()))
        });
        grants.push(grant.clone());
        Ok(grant)
    }

    async fn revoke(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
        role: Option<&str>,
    ) -> StoreResult<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|g| !(g.is_for(owner, target) && role.is_none_or(|r| g.role_name == r)));
        Ok((before - grants.len()) as u64)
    }

    async fn purge_entity(&self, entity: &EntityRef) -> StoreResult<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|g| !g.references(entity));
        Ok((before - grants.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_and_insert_only_touches_listed_roles_on_pair() {
        let store = MemoryRoleGrantStore::new();
        let owner = EntityRef::user(Uuid::now_v7());
        let org = EntityRef::organization(Uuid::now_v7());

        store.insert(RoleGrant::new(owner, Some(org), "admin")).await.unwrap();
        store
            .insert(RoleGrant::new(owner, Some(org), "invite-to-organization"))
            .await
            .unwrap();
        store.insert(RoleGrant::new(owner, None, "support")).await.unwrap();

        store
            .replace_and_insert(RoleGrant::new(owner, Some(org), "member"), &["admin", "member"])
            .await
            .unwrap();

        let mut scoped: Vec<_> = store
            .grants_for(&owner, Some(&org))
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.role_name)
            .collect();
        scoped.sort();
        assert_eq!(scoped, vec!["invite-to-organization", "member"]);

        // The global grant is a different pair and must survive
        assert_eq!(store.grants_for(&owner, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_single_role_or_all() {
        let store = MemoryRoleGrantStore::new();
        let owner = EntityRef::user(Uuid::now_v7());
        let org = EntityRef::organization(Uuid::now_v7());

        store.insert(RoleGrant::new(owner, Some(org), "member")).await.unwrap();
        store
            .insert(RoleGrant::new(owner, Some(org), "invite-to-organization"))
            .await
            .unwrap();

        assert_eq!(store.revoke(&owner, Some(&org), Some("member")).await.unwrap(), 1);
        assert_eq!(store.revoke(&owner, Some(&org), Some("member")).await.unwrap(), 0);
        assert_eq!(store.revoke(&owner, Some(&org), None).await.unwrap(), 1);
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_purge_entity_removes_owner_and_target_references() {
        let store = MemoryRoleGrantStore::new();
        let alice = EntityRef::user(Uuid::now_v7());
        let bob = EntityRef::user(Uuid::now_v7());
        let org = EntityRef::organization(Uuid::now_v7());

        store.insert(RoleGrant::new(alice, Some(org), "admin")).await.unwrap();
        store.insert(RoleGrant::new(bob, Some(org), "member")).await.unwrap();
        store.insert(RoleGrant::new(bob, None, "support")).await.unwrap();

        assert_eq!(store.purge_entity(&org).await.unwrap(), 2);
        let remaining = store.all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].role_name, "support");
    }
}
