use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// RSA (`n`, `e`) or EC (`crv`, `x`, `y`) public key
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

/// A verification key together with the only algorithm it may verify
#[derive(Clone)]
pub struct VerificationKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

struct JwksCache {
    keys: HashMap<String, VerificationKey>,
    last_fetched: Instant,
}

pub struct JwksClient {
    issuer_url: String,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<JwksCache>>>,
    cache_ttl: Duration,
}

impl Jwk {
    fn into_verification_key(self) -> Result<Option<(String, VerificationKey)>, JwksError> {
        let missing = |field: &str| JwksError::KeyConversionError(format!("JWK missing '{}'", field));

        let verification_key = match self.kty.as_str() {
            "RSA" => {
                let n = self.n.as_deref().ok_or_else(|| missing("n"))?;
                let e = self.e.as_deref().ok_or_else(|| missing("e"))?;
                VerificationKey {
                    key: DecodingKey::from_rsa_components(n, e)
                        .map_err(|e| JwksError::KeyConversionError(e.to_string()))?,
                    algorithm: Algorithm::RS256,
                }
            }
            "EC" => {
                let algorithm = match self.crv.as_deref() {
                    Some("P-256") => Algorithm::ES256,
                    Some("P-384") => Algorithm::ES384,
                    other => {
                        tracing::debug!("Skipping EC key {} with curve {:?}", self.kid, other);
                        return Ok(None);
                    }
                };
                let x = self.x.as_deref().ok_or_else(|| missing("x"))?;
                let y = self.y.as_deref().ok_or_else(|| missing("y"))?;
                VerificationKey {
                    key: DecodingKey::from_ec_components(x, y)
                        .map_err(|e| JwksError::KeyConversionError(e.to_string()))?,
                    algorithm,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some((self.kid, verification_key)))
    }
}

impl JwksClient {
    pub fn new(issuer_url: &str, cache_ttl: Duration) -> Self {
        Self {
            issuer_url: issuer_url.to_string(),
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<VerificationKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.last_fetched.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        // Cache miss, expired, or rotated keys
        self.fetch_jwks().await?;

        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or(JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_jwks(&self) -> Result<(), JwksError> {
        let jwks_url = format!("{}/jwks", self.issuer_url);

        let response = self
            .client
            .get(&jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "Failed to fetch JWKS: HTTP {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            if let Some((kid, key)) = jwk.into_verification_key()? {
                keys.insert(kid, key);
            }
        }

        tracing::debug!("Fetched {} signing keys from {}", keys.len(), jwks_url);

        let mut cache = self.cache.write().await;
        *cache = Some(JwksCache {
            keys,
            last_fetched: Instant::now(),
        });

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_types_are_skipped() {
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kid": "k1",
            "kty": "oct",
        }))
        .unwrap();
        assert!(jwk.into_verification_key().unwrap().is_none());
    }

    #[test]
    fn test_rsa_key_requires_components() {
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kid": "k1",
            "kty": "RSA",
            "e": "AQAB",
        }))
        .unwrap();
        assert!(matches!(
            jwk.into_verification_key(),
            Err(JwksError::KeyConversionError(_))
        ));
    }

    #[test]
    fn test_unsupported_curve_is_skipped() {
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kid": "k1",
            "kty": "EC",
            "crv": "P-521",
            "x": "AA",
            "y": "AA",
        }))
        .unwrap();
        assert!(jwk.into_verification_key().unwrap().is_none());
    }
}
