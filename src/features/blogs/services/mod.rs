pub mod autosave_service;
pub mod blog_service;
pub mod translation_service;

pub use autosave_service::{AutosaveService, DraftStore};
pub use blog_service::{BlogListFilter, BlogService};
pub use translation_service::TranslationService;
