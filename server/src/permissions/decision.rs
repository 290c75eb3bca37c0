//! Authorization decision.

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Denied, with an internal reason for logs. Never shown to the caller.
    Denied(Option<String>),
}

impl Decision {
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied(Some(reason.into()))
    }

    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}
