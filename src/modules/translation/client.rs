use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::TranslationConfig;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(String),

    #[error("Translation service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (ISO 639-1 codes)
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let mut request = self.client.post(&self.url).json(&TranslateRequest {
            text,
            source,
            target,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Upstream { status, body });
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        match (body.translated_text, body.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(TranslationError::InvalidResponse(error)),
            (None, None) => Err(TranslationError::InvalidResponse(
                "missing translatedText".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_blank_text_skips_request() {
        let translator = HttpTranslator::new(&TranslationConfig {
            url: "http://127.0.0.1:9/unreachable".to_string(),
            api_key: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let result = translator.translate("   ", "en", "ta").await.unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_response_uses_camel_case() {
        let body: TranslateResponse =
            serde_json::from_str(r#"{"translatedText":"வணக்கம்"}"#).unwrap();
        assert_eq!(body.translated_text.as_deref(), Some("வணக்கம்"));
    }
}
