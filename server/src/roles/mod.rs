//! Role hierarchy and role grants.
//!
//! - Catalog: compiled-in role definitions and their display labels
//! - Elevation: total ordering and delegation checks over the catalog
//! - Grants: persisted (owner, target, role) triples with primary-role exclusivity

pub mod catalog;
pub mod elevation;
pub mod error;
pub mod grants;
pub mod models;
pub mod queries;
pub mod store;

pub use catalog::{
    definition_by_name, definitions_for, display_name, primary_definitions_for, RoleDefinition,
    RoleLabel, CATALOG,
};
pub use elevation::{
    can_assign, highest_elevated, less_elevated_than, more_elevated_than, ElevationMode,
};
pub use error::RoleError;
pub use grants::RoleGrants;
pub use models::RoleGrant;
pub use queries::PgRoleGrantStore;
pub use store::{MemoryRoleGrantStore, RoleGrantStore};
