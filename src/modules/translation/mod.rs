//! Machine translation between English and Tamil
//!
//! `POST {TRANSLATE_URL}` with `{"text","source","target"}` returning
//! `{"translatedText"}`.

mod client;

pub use client::{HttpTranslator, TranslationError, Translator};
