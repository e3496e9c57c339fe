use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User role. Declaration order is the privilege order: viewer < creator < admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Creator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Creator => "creator",
            Self::Admin => "admin",
        }
    }

    /// Creators and admins may write articles.
    pub fn is_creator(&self) -> bool {
        matches!(self, Self::Creator | Self::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Viewer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "creator" => Ok(Self::Creator),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Whether `actual` grants at least the privileges of `required`.
pub fn has_role(actual: Role, required: Role) -> bool {
    actual >= required
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Number of published articles authored
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(has_role(Role::Admin, Role::Creator));
        assert!(has_role(Role::Creator, Role::Creator));
        assert!(has_role(Role::Creator, Role::Viewer));
        assert!(!has_role(Role::Viewer, Role::Creator));
        assert!(!has_role(Role::Creator, Role::Admin));
    }

    #[test]
    fn test_role_helpers() {
        assert!(Role::Admin.is_creator());
        assert!(Role::Creator.is_creator());
        assert!(!Role::Viewer.is_creator());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Creator.is_admin());
    }

    #[test]
    fn test_role_parse_and_serde() {
        assert_eq!("creator".parse::<Role>().unwrap(), Role::Creator);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
