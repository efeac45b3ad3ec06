/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// LANGUAGES
// =============================================================================

/// ISO 639-1 code for English content fields
pub const LANG_ENGLISH: &str = "en";

/// ISO 639-1 code for Tamil content fields
pub const LANG_TAMIL: &str = "ta";

// =============================================================================
// CONTENT LIMITS
// =============================================================================

/// Maximum blog/event title length (characters)
pub const MAX_TITLE_LENGTH: u64 = 300;

/// Maximum comment length (characters)
pub const MAX_COMMENT_LENGTH: u64 = 5000;

/// Maximum length of a rejection reason
pub const MAX_REJECTION_REASON_LENGTH: u64 = 2000;
