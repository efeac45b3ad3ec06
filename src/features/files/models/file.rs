use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Uploaded object metadata
#[derive(Debug, FromRow)]
pub struct File {
    pub id: Uuid,
    pub file_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub url: String,
    pub purpose: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

pub const FILE_COLUMNS: &str =
    "id, file_key, original_filename, content_type, file_size, url, purpose, uploaded_by, created_at";
