use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::constants::{LANG_ENGLISH, LANG_TAMIL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    EnToTa,
    TaToEn,
}

impl TranslationDirection {
    pub fn source(self) -> &'static str {
        match self {
            TranslationDirection::EnToTa => LANG_ENGLISH,
            TranslationDirection::TaToEn => LANG_TAMIL,
        }
    }

    pub fn target(self) -> &'static str {
        match self {
            TranslationDirection::EnToTa => LANG_TAMIL,
            TranslationDirection::TaToEn => LANG_ENGLISH,
        }
    }
}

/// Translate a blog's fields into the other language
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TranslateBlogDto {
    pub direction: TranslationDirection,
    /// Confirms replacing existing content in the target language
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TranslateTextDto {
    #[validate(length(min = 1, max = 20000, message = "Text must be 1-20000 characters"))]
    pub text: String,
    pub direction: TranslationDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslateTextResponseDto {
    pub translated_text: String,
}
