use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::blogs::dtos::TranslationDirection;
use crate::features::blogs::models::{DraftFields, RichTextDocument};
use crate::modules::translation::Translator;

/// Fills one language's fields from the other through the translator
pub struct TranslationService {
    translator: Arc<dyn Translator>,
}

/// Refuse to destroy existing target content unless the caller confirmed
pub fn ensure_overwrite_confirmed(
    fields: &DraftFields,
    direction: TranslationDirection,
    overwrite: bool,
) -> Result<()> {
    let (title, content) = target_of(fields, direction);
    let has_content = !title.trim().is_empty() || content.has_text();

    if has_content && !overwrite {
        let language = match direction {
            TranslationDirection::EnToTa => "Tamil",
            TranslationDirection::TaToEn => "English",
        };
        return Err(AppError::Conflict(format!(
            "{} content already exists; confirm overwrite to replace it",
            language
        )));
    }
    Ok(())
}

fn source_of(fields: &DraftFields, direction: TranslationDirection) -> (&str, &RichTextDocument) {
    match direction {
        TranslationDirection::EnToTa => (fields.title.as_str(), &fields.content),
        TranslationDirection::TaToEn => (fields.title_tamil.as_str(), &fields.content_tamil),
    }
}

fn target_of(fields: &DraftFields, direction: TranslationDirection) -> (&str, &RichTextDocument) {
    source_of(
        fields,
        match direction {
            TranslationDirection::EnToTa => TranslationDirection::TaToEn,
            TranslationDirection::TaToEn => TranslationDirection::EnToTa,
        },
    )
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    pub async fn translate_text(&self, text: &str, direction: TranslationDirection) -> Result<String> {
        self.translator
            .translate(text, direction.source(), direction.target())
            .await
            .map_err(|e| {
                tracing::error!("Translation failed: {}", e);
                AppError::ExternalServiceError("Translation service unavailable".to_string())
            })
    }

    /// Translate title and content plain text into the opposite language.
    /// Returns the updated fields; `fields` is untouched on any error.
    pub async fn translate_fields(
        &self,
        fields: &DraftFields,
        direction: TranslationDirection,
        overwrite: bool,
    ) -> Result<DraftFields> {
        ensure_overwrite_confirmed(fields, direction, overwrite)?;

        let (title, content) = source_of(fields, direction);
        if title.trim().is_empty() && !content.has_text() {
            return Err(AppError::Validation("Nothing to translate".to_string()));
        }

        let plain = content.plain_text();
        let (title, body) = tokio::try_join!(
            self.translate_text(title, direction),
            self.translate_text(&plain, direction)
        )?;

        let mut translated = fields.clone();
        let content = RichTextDocument::from_plain_text(&body);
        match direction {
            TranslationDirection::EnToTa => {
                translated.title_tamil = title;
                translated.content_tamil = content;
            }
            TranslationDirection::TaToEn => {
                translated.title = title;
                translated.content = content;
            }
        }

        tracing::info!(
            "Translated blog fields {} -> {}",
            direction.source(),
            direction.target()
        );
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::translation::TranslationError;
    use async_trait::async_trait;

    /// Prefixes text with the target language
    struct TaggingTranslator;

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> std::result::Result<String, TranslationError> {
            if text.is_empty() {
                return Ok(String::new());
            }
            Ok(format!("[{}] {}", target, text))
        }
    }

    struct DownTranslator;

    #[async_trait]
    impl Translator for DownTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> std::result::Result<String, TranslationError> {
            Err(TranslationError::Request("connection refused".to_string()))
        }
    }

    fn english_only() -> DraftFields {
        DraftFields {
            title: "Rain".to_string(),
            content: RichTextDocument::from_plain_text("drops\npuddles"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_translates_into_empty_target() {
        let service = TranslationService::new(Arc::new(TaggingTranslator));

        let result = service
            .translate_fields(&english_only(), TranslationDirection::EnToTa, false)
            .await
            .unwrap();

        assert_eq!(result.title_tamil, "[ta] Rain");
        assert_eq!(result.content_tamil.blocks.len(), 2);
        assert_eq!(result.content_tamil.plain_text(), "[ta] drops\npuddles");
        assert_eq!(result.title, "Rain");
    }

    #[tokio::test]
    async fn test_existing_target_requires_confirmation() {
        let service = TranslationService::new(Arc::new(TaggingTranslator));
        let mut fields = english_only();
        fields.title_tamil = "மழை".to_string();

        let err = service
            .translate_fields(&fields, TranslationDirection::EnToTa, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(fields.title_tamil, "மழை");

        let result = service
            .translate_fields(&fields, TranslationDirection::EnToTa, true)
            .await
            .unwrap();
        assert_eq!(result.title_tamil, "[ta] Rain");
    }

    #[tokio::test]
    async fn test_reverse_direction_checks_english_fields() {
        let service = TranslationService::new(Arc::new(TaggingTranslator));
        let fields = DraftFields {
            title_tamil: "மழை".to_string(),
            ..english_only()
        };

        let err = service
            .translate_fields(&fields, TranslationDirection::TaToEn, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.starts_with("English")));
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected() {
        let service = TranslationService::new(Arc::new(TaggingTranslator));
        let err = service
            .translate_fields(&DraftFields::default(), TranslationDirection::EnToTa, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_translator_failure_maps_to_bad_gateway() {
        let service = TranslationService::new(Arc::new(DownTranslator));
        let err = service
            .translate_text("hello", TranslationDirection::EnToTa)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
