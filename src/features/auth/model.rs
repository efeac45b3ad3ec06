use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

/// Application role matching the `app_role` database enum.
///
/// Ordered from least to most privileged; each role includes the
/// permissions of the roles below it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Type,
    ToSchema,
)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    #[default]
    Reader,
    Writer,
    Manager,
    Admin,
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppRole::Reader => write!(f, "reader"),
            AppRole::Writer => write!(f, "writer"),
            AppRole::Manager => write!(f, "manager"),
            AppRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity provider subject; also the profile id
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: AppRole,
}

impl AuthenticatedUser {
    /// Check if user has at least the given role
    pub fn has_role(&self, role: AppRole) -> bool {
        self.role >= role
    }

    pub fn is_admin(&self) -> bool {
        self.role == AppRole::Admin
    }

    /// Managers and admins review and publish content
    pub fn is_reviewer(&self) -> bool {
        self.has_role(AppRole::Manager)
    }

    pub fn is_writer(&self) -> bool {
        self.has_role(AppRole::Writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_role_hierarchy() {
        let admin = create_user(AppRole::Admin);
        assert!(admin.is_admin());
        assert!(admin.is_reviewer());
        assert!(admin.is_writer());

        let manager = create_user(AppRole::Manager);
        assert!(!manager.is_admin());
        assert!(manager.is_reviewer());
        assert!(manager.is_writer());

        let writer = create_user(AppRole::Writer);
        assert!(!writer.is_reviewer());
        assert!(writer.is_writer());

        let reader = create_user(AppRole::Reader);
        assert!(!reader.is_writer());
        assert!(reader.has_role(AppRole::Reader));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&AppRole::Manager).unwrap(),
            "\"manager\""
        );
        let role: AppRole = serde_json::from_str("\"writer\"").unwrap();
        assert_eq!(role, AppRole::Writer);
    }
}
