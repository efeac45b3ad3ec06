use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::admin::models::AdminUserRow;
use crate::features::auth::model::AppRole;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};

/// Minimum password length accepted by the identity provider
pub const MIN_PASSWORD_LENGTH: u64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub role: AppRole,
    pub blog_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUserDto {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            level: row.level,
            role: row.role,
            blog_count: row.blog_count,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminUserQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub role: Option<AppRole>,
}

impl AdminUserQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

/// Provision an account: identity, profile and role
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = 128,
        message = "Password must be 8-128 characters"
    ))]
    pub password: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 64))]
    pub level: Option<String>,

    #[serde(default)]
    pub role: AppRole,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRoleDto {
    pub role: AppRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponseDto {
    pub id: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::{Password, SafeEmail};
    use fake::Fake;
    use serde_json::json;

    #[test]
    fn test_create_user_defaults_to_reader() {
        let dto: CreateUserDto = serde_json::from_value(json!({
            "email": SafeEmail().fake::<String>(),
            "password": Password(8..20).fake::<String>(),
        }))
        .unwrap();

        assert_eq!(dto.role, AppRole::Reader);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_user_rejects_short_password() {
        let dto: CreateUserDto = serde_json::from_value(json!({
            "email": "member@example.org",
            "password": "short",
            "role": "writer"
        }))
        .unwrap();

        assert_eq!(dto.role, AppRole::Writer);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_search_pattern_ignores_blank() {
        let params = AdminUserQueryParams {
            page: 1,
            page_size: 10,
            search: Some("  ".to_string()),
            role: None,
        };
        assert!(params.search_pattern().is_none());
    }
}
