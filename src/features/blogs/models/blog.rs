use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::document::RichTextDocument;
use super::draft::DraftFields;
use super::status::BlogStatus;

/// Blog joined with author and category display names
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub id: Uuid,
    pub title: String,
    pub content: serde_json::Value,
    pub title_tamil: String,
    pub content_tamil: serde_json::Value,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_name_tamil: Option<String>,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub status: BlogStatus,
    pub rejection_reason: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl BlogRow {
    pub fn draft_fields(&self) -> DraftFields {
        DraftFields {
            title: self.title.clone(),
            content: RichTextDocument::from_stored(self.content.clone()),
            title_tamil: self.title_tamil.clone(),
            content_tamil: RichTextDocument::from_stored(self.content_tamil.clone()),
            category_id: self.category_id,
        }
    }
}

/// Columns selected into [`BlogRow`]; append `WHERE`/`ORDER BY` clauses.
pub const BLOG_SELECT: &str = r#"
    SELECT b.id, b.title, b.content, b.title_tamil, b.content_tamil,
           b.category_id, c.name AS category_name, c.name_tamil AS category_name_tamil,
           b.author_id, p.full_name AS author_name, p.email AS author_email,
           b.status, b.rejection_reason, b.view_count,
           b.created_at, b.updated_at, b.published_at
    FROM blogs b
    LEFT JOIN blog_categories c ON c.id = b.category_id
    LEFT JOIN profiles p ON p.id = b.author_id
"#;
