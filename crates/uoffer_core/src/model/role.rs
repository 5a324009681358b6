//! Caller role passed explicitly through every role-aware operation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Resolved caller role.
///
/// The authorization collaborator resolves credentials into one of these
/// values; the core never inspects credentials itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Privileged administrator.
    Admin,
    /// Regular authenticated reader.
    User,
}

impl Role {
    /// Stable string id used by role claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses a resolved role claim; unknown claims yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("USER"), Some(Role::User));
    }

    #[test]
    fn parse_rejects_unknown_claims() {
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("moderator"), None);
    }
}
