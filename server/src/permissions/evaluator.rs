//! Permission evaluation.
//!
//! Resolution order:
//! 1. Look up the action's required role in the catalog
//! 2. Collect the actor's grants on the target plus its global grants
//! 3. Add the default member role when the actor belongs to the target organization
//! 4. Compare the most elevated candidate against the required role

use std::sync::Arc;

use tracing::debug;
use warden_common::{EntityKind, EntityRef};

use super::action::Action;
use super::decision::Decision;
use super::error::AuthzError;
use crate::entities::MembershipStore;
use crate::roles::catalog::{self, names};
use crate::roles::elevation::{highest_elevated, ElevationMode};
use crate::roles::store::RoleGrantStore;

/// Tunables for permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPolicy {
    /// Which catalog subset ranks the actor's roles.
    pub elevation: ElevationMode,
    /// Role implied by organization membership. `None` disables the implication.
    pub member_default_role: Option<String>,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            elevation: ElevationMode::default(),
            member_default_role: Some(names::MEMBER.to_string()),
        }
    }
}

/// Decides whether an actor may perform an action on a target.
#[derive(Clone)]
pub struct PermissionEvaluator {
    grants: Arc<dyn RoleGrantStore>,
    memberships: Arc<dyn MembershipStore>,
    policy: EvaluationPolicy,
}

impl PermissionEvaluator {
    pub fn new(
        grants: Arc<dyn RoleGrantStore>,
        memberships: Arc<dyn MembershipStore>,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            grants,
            memberships,
            policy,
        }
    }

    pub const fn policy(&self) -> &EvaluationPolicy {
        &self.policy
    }

    /// Decide whether `actor` may perform `action` on `target`.
    ///
    /// Store failures and misconfigured actions are errors, never denials.
    #[tracing::instrument(skip(self, action), fields(action = action.name()))]
    pub async fn permissible(
        &self,
        actor: &EntityRef,
        action: &dyn Action,
        target: Option<&EntityRef>,
    ) -> Result<Decision, AuthzError> {
        let required = catalog::definition_named(action.minimum_role()).ok_or(
            AuthzError::Misconfigured {
                action: action.name(),
                role: action.minimum_role(),
            },
        )?;

        let candidates = self.effective_roles(actor, target).await?;
        let target_kinds = self.policy.elevation.target_kinds(target);

        let Some(held) = highest_elevated(&candidates, &[actor.kind], &target_kinds) else {
            debug!(actor = %actor, target = ?target, "No applicable role");
            return Ok(Decision::denied("no applicable role"));
        };

        if held.priority <= required.priority {
            Ok(Decision::Allowed)
        } else {
            debug!(
                actor = %actor,
                target = ?target,
                held = held.name,
                required = required.name,
                "Insufficient role"
            );
            Ok(Decision::denied(format!(
                "role '{}' is below required '{}'",
                held.name, required.name
            )))
        }
    }

    /// Role names the actor holds on `target`, globally, and through membership.
    pub async fn effective_roles(
        &self,
        actor: &EntityRef,
        target: Option<&EntityRef>,
    ) -> Result<Vec<String>, AuthzError> {
        let mut roles: Vec<String> = self
            .grants
            .grants_for(actor, target)
            .await?
            .into_iter()
            .map(|g| g.role_name)
            .collect();

        if let Some(target) = target {
            roles.extend(
                self.grants
                    .grants_for(actor, None)
                    .await?
                    .into_iter()
                    .map(|g| g.role_name),
            );

            if let Some(default_role) = &self.policy.member_default_role {
                if actor.kind == EntityKind::User
                    && target.kind == EntityKind::Organization
                    && self.memberships.is_member(actor.id, target.id).await?
                {
                    roles.push(default_role.clone());
                }
            }
        }

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::db::{StoreError, StoreResult};
    use crate::entities::MemoryDirectory;
    use crate::roles::models::RoleGrant;
    use crate::roles::store::MemoryRoleGrantStore;

    #[derive(Debug)]
    struct Requires(&'static str);

    impl Action for Requires {
        fn name(&self) -> &'static str {
            "test_action"
        }

        fn minimum_role(&self) -> &'static str {
            self.0
        }
    }

    struct Fixture {
        evaluator: PermissionEvaluator,
        grants: Arc<MemoryRoleGrantStore>,
        directory: Arc<MemoryDirectory>,
    }

    fn fixture(policy: EvaluationPolicy) -> Fixture {
        let grants = Arc::new(MemoryRoleGrantStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        Fixture {
            evaluator: PermissionEvaluator::new(grants.clone(), directory.clone(), policy),
            grants,
            directory,
        }
    }

    async fn grant(
        store: &MemoryRoleGrantStore,
        owner: EntityRef,
        target: Option<EntityRef>,
        role: &str,
    ) {
        store.insert(RoleGrant::new(owner, target, role)).await.unwrap();
    }

    #[tokio::test]
    async fn test_scoped_grant_allows_at_or_below() {
        let f = fixture(EvaluationPolicy::default());
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());
        grant(&f.grants, alice, Some(acme), "admin").await;

        let allowed = f
            .evaluator
            .permissible(&alice, &Requires("member"), Some(&acme))
            .await
            .unwrap();
        assert_eq!(allowed, Decision::Allowed);

        let exact = f
            .evaluator
            .permissible(&alice, &Requires("admin"), Some(&acme))
            .await
            .unwrap();
        assert!(exact.is_allowed());

        let above = f
            .evaluator
            .permissible(&alice, &Requires("superadmin"), Some(&acme))
            .await
            .unwrap();
        assert!(matches!(above, Decision::Denied(Some(_))));
    }

    #[tokio::test]
    async fn test_grant_on_other_target_does_not_apply() {
        let f = fixture(EvaluationPolicy::default());
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());
        let globex = EntityRef::organization(Uuid::now_v7());
        grant(&f.grants, alice, Some(globex), "superadmin").await;

        let decision = f
            .evaluator
            .permissible(&alice, &Requires("member"), Some(&acme))
            .await
            .unwrap();
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn test_global_grant_applies_to_every_target() {
        let f = fixture(EvaluationPolicy::default());
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());
        grant(&f.grants, alice, None, "support").await;

        let decision = f
            .evaluator
            .permissible(&alice, &Requires("superadmin"), Some(&acme))
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_membership_implies_default_role() {
        let f = fixture(EvaluationPolicy::default());
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());

        let before = f
            .evaluator
            .permissible(&alice, &Requires("member"), Some(&acme))
            .await
            .unwrap();
        assert!(!before.is_allowed(), "non-members get no default permission");

        f.directory.add_member(alice.id, acme.id);
        let after = f
            .evaluator
            .permissible(&alice, &Requires("member"), Some(&acme))
            .await
            .unwrap();
        assert!(after.is_allowed());

        let admin_only = f
            .evaluator
            .permissible(&alice, &Requires("admin"), Some(&acme))
            .await
            .unwrap();
        assert!(!admin_only.is_allowed());
    }

    #[tokio::test]
    async fn test_membership_default_can_be_disabled() {
        let f = fixture(EvaluationPolicy {
            member_default_role: None,
            ..EvaluationPolicy::default()
        });
        let alice = EntityRef::user(Uuid::now_v7());
        let acme = EntityRef::organization(Uuid::now_v7());
        f.directory.add_member(alice.id, acme.id);

        let decision = f
            .evaluator
            .permissible(&alice, &Requires("member"), Some(&acme))
            .await
            .unwrap();
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn test_unknown_required_role_is_misconfiguration() {
        let f = fixture(EvaluationPolicy::default());
        let alice = EntityRef::user(Uuid::now_v7());
        grant(&f.grants, alice, None, "masteradmin").await;

        let result = f.evaluator.permissible(&alice, &Requires("owner"), None).await;
        assert!(matches!(
            result,
            Err(AuthzError::Misconfigured { role: "owner", .. })
        ));
    }

    #[tokio::test]
    async fn test_elevation_mode_controls_visibility() {
        // Assumption under test: a stray global "admin" grant (admin is only
        // defined for organizations) counts in full mode and is ignored when
        // ranking is restricted to the target's scope.
        let alice = EntityRef::user(Uuid::now_v7());

        let full = fixture(EvaluationPolicy {
            elevation: ElevationMode::FullCatalog,
            ..EvaluationPolicy::default()
        });
        grant(&full.grants, alice, None, "admin").await;
        let decision = full
            .evaluator
            .permissible(&alice, &Requires("member"), None)
            .await
            .unwrap();
        assert!(decision.is_allowed());

        let scoped = fixture(EvaluationPolicy::default());
        grant(&scoped.grants, alice, None, "admin").await;
        let decision = scoped
            .evaluator
            .permissible(&alice, &Requires("member"), None)
            .await
            .unwrap();
        assert_eq!(decision, Decision::denied("no applicable role"));
    }

    struct FailingGrants;

    #[async_trait]
    impl RoleGrantStore for FailingGrants {
        async fn grants_for(
            &self,
            _: &EntityRef,
            _: Option<&EntityRef>,
        ) -> StoreResult<Vec<RoleGrant>> {
            Err(StoreError::Timeout)
        }

        async fn find(&self, _: Uuid) -> StoreResult<Option<RoleGrant>> {
            Err(StoreError::Timeout)
        }

        async fn insert(&self, _: RoleGrant) -> StoreResult<RoleGrant> {
            Err(StoreError::Timeout)
        }

        async fn replace_and_insert(&self, _: RoleGrant, _: &[&str]) -> StoreResult<RoleGrant> {
            Err(StoreError::Timeout)
        }

        async fn revoke(
            &self,
            _: &EntityRef,
            _: Option<&EntityRef>,
            _: Option<&str>,
        ) -> StoreResult<u64> {
            Err(StoreError::Timeout)
        }

        async fn purge_entity(&self, _: &EntityRef) -> StoreResult<u64> {
            Err(StoreError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_store_fault_is_not_a_denial() {
        let evaluator = PermissionEvaluator::new(
            Arc::new(FailingGrants),
            Arc::new(MemoryDirectory::new()),
            EvaluationPolicy::default(),
        );
        let alice = EntityRef::user(Uuid::now_v7());

        let result = evaluator.permissible(&alice, &Requires("member"), None).await;
        assert!(matches!(result, Err(AuthzError::Store(StoreError::Timeout))));
    }
}
