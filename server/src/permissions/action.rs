//! Actions guarded by the permission evaluator.

use std::fmt;

/// Something an actor may attempt against a target.
///
/// Each action owns its mapping to the least elevated role allowed to perform
/// it. The evaluator never hard-codes that mapping.
pub trait Action: fmt::Debug + Send + Sync {
    /// Stable name for logs.
    fn name(&self) -> &'static str;

    /// Catalog name of the least elevated role that may perform this action.
    fn minimum_role(&self) -> &'static str;
}
