//! Permission evaluation.
//!
//! Maps an (actor, action, target) triple to an allow/deny decision using the
//! role hierarchy plus organization membership.

mod action;
mod decision;
mod error;
mod evaluator;

pub use action::Action;
pub use decision::Decision;
pub use error::AuthzError;
pub use evaluator::{EvaluationPolicy, PermissionEvaluator};
