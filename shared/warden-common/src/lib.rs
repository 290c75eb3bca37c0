//! Warden Common Library
//!
//! Shared types used by the authorization server and its callers: polymorphic
//! entity references, target scopes and session scopes.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
