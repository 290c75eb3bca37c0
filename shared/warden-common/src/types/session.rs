//! Session Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Authorization scope carried by a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    /// Internal service-to-service calls.
    System,
    /// Platform operators.
    Admin,
    /// Regular end users.
    User,
}

impl SessionScope {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Whether this scope skips organization membership and role checks.
    #[must_use]
    pub const fn bypasses_membership(&self) -> bool {
        matches!(self, Self::System | Self::Admin)
    }
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(Self::System),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(Error::UnknownSessionScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_system_and_admin_bypass_membership() {
        assert!(SessionScope::System.bypasses_membership());
        assert!(SessionScope::Admin.bypasses_membership());
        assert!(!SessionScope::User.bypasses_membership());
    }

    #[test]
    fn test_scope_parses_lowercase_names() {
        assert_eq!("admin".parse::<SessionScope>().unwrap(), SessionScope::Admin);
        assert!("Admin".parse::<SessionScope>().is_err());
    }
}
