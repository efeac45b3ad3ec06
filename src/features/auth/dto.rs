use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{AppRole, AuthenticatedUser};

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: AppRole,
    pub capabilities: CapabilitiesDto,
}

/// What the session may do; clients use this to show role-gated actions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CapabilitiesDto {
    pub can_write: bool,
    pub can_review: bool,
    pub can_manage_events: bool,
    pub can_manage_users: bool,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        let capabilities = CapabilitiesDto {
            can_write: user.is_writer(),
            can_review: user.is_reviewer(),
            can_manage_events: user.is_reviewer(),
            can_manage_users: user.is_admin(),
        };

        Self {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            role: user.role,
            capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_capabilities_follow_role() {
        let me = MeResponseDto::from(create_user(AppRole::Writer));
        assert!(me.capabilities.can_write);
        assert!(!me.capabilities.can_review);
        assert!(!me.capabilities.can_manage_users);

        let me = MeResponseDto::from(create_user(AppRole::Manager));
        assert!(me.capabilities.can_review);
        assert!(me.capabilities.can_manage_events);
        assert!(!me.capabilities.can_manage_users);

        let me = MeResponseDto::from(create_user(AppRole::Reader));
        assert!(!me.capabilities.can_write);
    }
}
