//! Actions exposed by the organization routes.

use crate::permissions::Action;
use crate::roles::catalog::names;

/// Organization-scoped actions and the least elevated role allowed to perform each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationAction {
    /// List a member's roles.
    ViewRoles,
    /// Grant or revoke a member's roles.
    ManageRoles,
    /// Add or remove organization tags.
    ManageTags,
}

impl Action for OrganizationAction {
    fn name(&self) -> &'static str {
        match self {
            Self::ViewRoles => "view_roles",
            Self::ManageRoles => "manage_roles",
            Self::ManageTags => "manage_tags",
        }
    }

    fn minimum_role(&self) -> &'static str {
        match self {
            Self::ViewRoles => names::MEMBER,
            Self::ManageRoles | Self::ManageTags => names::ADMIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::catalog::definition_named;

    #[test]
    fn test_every_action_requires_a_catalog_role() {
        for action in [
            OrganizationAction::ViewRoles,
            OrganizationAction::ManageRoles,
            OrganizationAction::ManageTags,
        ] {
            assert!(
                definition_named(action.minimum_role()).is_some(),
                "{} requires an unknown role",
                action.name()
            );
        }
    }
}
