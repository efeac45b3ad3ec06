use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::logto::LogtoTokenManager;

/// Account to create at the identity provider
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Identity provider user administration
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Create an account and return its subject id
    async fn create_user(&self, identity: &NewIdentity) -> Result<String>;

    /// Delete an account; deleting a missing account succeeds
    async fn delete_user(&self, user_id: &str) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    primary_email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Logto user from Management API
#[derive(Debug, Deserialize)]
struct LogtoUser {
    id: String,
}

/// Client for Logto User Management API
pub struct LogtoUserClient {
    token_manager: Arc<LogtoTokenManager>,
    http_client: reqwest::Client,
}

impl LogtoUserClient {
    pub fn new(token_manager: Arc<LogtoTokenManager>) -> Self {
        Self {
            token_manager,
            http_client: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> Result<String> {
        self.token_manager
            .get_access_token()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Failed to get access token: {}", e)))
    }
}

#[async_trait]
impl IdentityDirectory for LogtoUserClient {
    async fn create_user(&self, identity: &NewIdentity) -> Result<String> {
        let token = self.access_token().await?;
        let url = format!("{}/api/users", self.token_manager.api_base_url());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&CreateUserRequest {
                primary_email: &identity.email,
                password: &identity.password,
                name: identity.name.as_deref(),
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to create user: {}", e);
                AppError::ExternalServiceError(format!("Failed to create user in Logto: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Logto API error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Logto API error: HTTP {}",
                status
            )));
        }

        let user = response.json::<LogtoUser>().await.map_err(|e| {
            tracing::error!("Failed to parse user response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse user response: {}", e))
        })?;

        tracing::info!("Created identity {}", user.id);
        Ok(user.id)
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/api/users/{}",
            self.token_manager.api_base_url(),
            urlencoding::encode(user_id)
        );

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {}", e);
                AppError::ExternalServiceError(format!("Failed to delete user in Logto: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!("Identity {} already absent", user_id);
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Logto API error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Logto API error: HTTP {}",
                status
            )));
        }

        tracing::info!("Deleted identity {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_management_api_field_names() {
        let body = serde_json::to_value(CreateUserRequest {
            primary_email: "a@example.org",
            password: "secret-pass",
            name: None,
        })
        .unwrap();

        assert_eq!(body["primaryEmail"], "a@example.org");
        assert!(body.get("name").is_none());
    }
}
