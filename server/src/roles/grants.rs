//! Role grant service.
//!
//! Owns the mutation protocol that keeps at most one primary role per
//! (owner, target) pair, and the lazy resolution of grant references.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use warden_common::{EntityRef, TargetKind};

use super::catalog::{definition_by_name, primary_definitions_for};
use super::error::RoleError;
use super::models::RoleGrant;
use super::store::RoleGrantStore;
use crate::entities::{Entity, EntityStore};

/// Role grant operations over a grant store and the entity registry.
#[derive(Clone)]
pub struct RoleGrants {
    store: Arc<dyn RoleGrantStore>,
    entities: Arc<dyn EntityStore>,
}

impl RoleGrants {
    pub fn new(store: Arc<dyn RoleGrantStore>, entities: Arc<dyn EntityStore>) -> Self {
        Self { store, entities }
    }

    /// Grant `role_name` to `owner` on `target` (or globally).
    ///
    /// Granting a primary role replaces any other primary role the owner holds
    /// on the same target in one atomic step. Non-primary roles are appended,
    /// duplicates included.
    #[tracing::instrument(skip(self))]
    pub async fn create_for(
        &self,
        owner: &EntityRef,
        role_name: &str,
        target: Option<&EntityRef>,
    ) -> Result<RoleGrant, RoleError> {
        let owner_kinds = [owner.kind];
        let definition = definition_by_name(role_name, &owner_kinds, &[TargetKind::of(target)])
            .ok_or_else(|| RoleError::UnknownRole {
                role: role_name.to_string(),
                owner_kind: owner.kind,
            })?;

        let grant = RoleGrant::new(*owner, target.copied(), definition.name);

        let grant = if definition.is_primary {
            let exclusive: Vec<&str> = primary_definitions_for(&owner_kinds, TargetKind::all())
                .iter()
                .map(|d| d.name)
                .collect();
            self.store.replace_and_insert(grant, &exclusive).await?
        } else {
            self.store.insert(grant).await?
        };

        info!(
            grant_id = %grant.id,
            owner = %owner,
            role = definition.name,
            target = ?target,
            "Role granted"
        );

        Ok(grant)
    }

    /// Revoke `role` (or every role when `None`) held by `owner` on `target`.
    #[tracing::instrument(skip(self))]
    pub async fn revoke(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
        role: Option<&str>,
    ) -> Result<u64, RoleError> {
        let removed = self.store.revoke(owner, target, role).await?;
        info!(owner = %owner, target = ?target, role = ?role, removed, "Roles revoked");
        Ok(removed)
    }

    /// Revoke exactly the listed roles held by `owner` on `target`.
    ///
    /// Roles granted after `roles` was read are left in place.
    #[tracing::instrument(skip(self))]
    pub async fn revoke_listed(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
        roles: &[String],
    ) -> Result<u64, RoleError> {
        let mut distinct: Vec<&str> = roles.iter().map(String::as_str).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let mut removed = 0;
        for role in distinct {
            removed += self.store.revoke(owner, target, Some(role)).await?;
        }
        info!(owner = %owner, target = ?target, removed, "Listed roles revoked");
        Ok(removed)
    }

    /// Grants held by `owner` on exactly `target`.
    pub async fn grants_for(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
    ) -> Result<Vec<RoleGrant>, RoleError> {
        Ok(self.store.grants_for(owner, target).await?)
    }

    /// Role names held by `owner` on exactly `target`.
    pub async fn role_names_for(
        &self,
        owner: &EntityRef,
        target: Option<&EntityRef>,
    ) -> Result<Vec<String>, RoleError> {
        Ok(self
            .grants_for(owner, target)
            .await?
            .into_iter()
            .map(|g| g.role_name)
            .collect())
    }

    /// Fetch a single grant.
    pub async fn find(&self, id: Uuid) -> Result<Option<RoleGrant>, RoleError> {
        Ok(self.store.find(id).await?)
    }

    /// Resolve the grant's owner. `None` when it no longer exists.
    pub async fn resolve_owner(&self, grant: &RoleGrant) -> Result<Option<Entity>, RoleError> {
        self.resolve(&grant.owner).await
    }

    /// Resolve the grant's target. `None` for global grants or a vanished target.
    pub async fn resolve_target(&self, grant: &RoleGrant) -> Result<Option<Entity>, RoleError> {
        match &grant.target {
            Some(target) => self.resolve(target).await,
            None => Ok(None),
        }
    }

    /// Drop every grant owned by or targeting `entity`.
    #[tracing::instrument(skip(self))]
    pub async fn purge_entity(&self, entity: &EntityRef) -> Result<u64, RoleError> {
        let removed = self.store.purge_entity(entity).await?;
        info!(entity = %entity, removed, "Purged role grants");
        Ok(removed)
    }

    async fn resolve(&self, reference: &EntityRef) -> Result<Option<Entity>, RoleError> {
        let entity = self.entities.find(reference).await?;
        if entity.is_none() {
            // Referential cleanup has not caught up yet
            debug!(reference = %reference, "Grant reference no longer resolves");
        }
        Ok(entity)
    }
}
