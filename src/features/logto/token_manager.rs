use crate::core::config::IdentityM2MConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Response from the identity provider token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

struct TokenCache {
    token: TokenResponse,
    fetched_at: Instant,
}

/// Client-credentials access tokens for the Logto Management API, cached
/// until shortly before they expire.
pub struct LogtoTokenManager {
    config: IdentityM2MConfig,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<TokenCache>>>,
    /// Refresh token this many seconds before expiration
    refresh_margin: Duration,
}

impl TokenCache {
    fn is_fresh(&self, margin: Duration) -> bool {
        self.fetched_at.elapsed() + margin < Duration::from_secs(self.token.expires_in)
    }
}

impl LogtoTokenManager {
    pub fn new(config: IdentityM2MConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            refresh_margin: Duration::from_secs(60),
        }
    }

    pub async fn get_access_token(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh(self.refresh_margin)) {
                return Ok(cached.token.access_token.clone());
            }
        }

        self.fetch_token().await
    }

    async fn fetch_token(&self) -> Result<String, TokenError> {
        tracing::debug!("Fetching management API token from {}", self.config.token_url);

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("scope", &self.config.scope),
                ("resource", &self.config.resource),
            ])
            .send()
            .await
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::FetchError(format!(
                "Token request failed: HTTP {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        tracing::info!(
            "Fetched management API token, expires in {} seconds",
            token.expires_in
        );

        let access_token = token.access_token.clone();
        let mut cache = self.cache.write().await;
        *cache = Some(TokenCache {
            token,
            fetched_at: Instant::now(),
        });

        Ok(access_token)
    }

    /// Base URL of the Management API (`{base}/api/users/...`)
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to fetch token: {0}")]
    FetchError(String),

    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_refreshes_inside_margin() {
        let cache = TokenCache {
            token: TokenResponse {
                access_token: "t".to_string(),
                expires_in: 3600,
            },
            fetched_at: Instant::now(),
        };
        assert!(cache.is_fresh(Duration::from_secs(60)));
        assert!(!cache.is_fresh(Duration::from_secs(3600)));
    }
}
