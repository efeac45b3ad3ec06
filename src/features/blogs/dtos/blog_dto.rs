use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::blogs::models::status::allowed_actions;
use crate::features::blogs::models::{
    BlogAction, BlogRow, BlogStatus, DraftFields, DraftPatch, RichTextDocument,
};
use crate::shared::constants::{MAX_REJECTION_REASON_LENGTH, MAX_TITLE_LENGTH};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};

const EXCERPT_LENGTH: usize = 200;

/// Request DTO for creating a blog
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBlogDto {
    #[validate(length(max = MAX_TITLE_LENGTH, message = "Title is too long"))]
    #[serde(default)]
    pub title: String,

    /// Draft-js raw document, a serialized document string or plain text
    #[serde(default)]
    #[schema(value_type = Object)]
    pub content: serde_json::Value,

    #[validate(length(max = MAX_TITLE_LENGTH, message = "Tamil title is too long"))]
    #[serde(default)]
    pub title_tamil: String,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub content_tamil: serde_json::Value,

    pub category_id: Option<Uuid>,

    /// Submit for review right away instead of saving a draft
    #[serde(default)]
    pub submit: bool,
}

/// Autosave edit; absent fields are unchanged and `category_id: null` clears
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DraftPatchDto {
    #[validate(length(max = MAX_TITLE_LENGTH, message = "Title is too long"))]
    pub title: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub content: Option<serde_json::Value>,

    #[validate(length(max = MAX_TITLE_LENGTH, message = "Tamil title is too long"))]
    pub title_tamil: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub content_tamil: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

impl DraftPatchDto {
    pub fn into_patch(self) -> Result<DraftPatch, serde_json::Error> {
        Ok(DraftPatch {
            title: self.title,
            content: self.content.map(RichTextDocument::parse).transpose()?,
            title_tamil: self.title_tamil,
            content_tamil: self.content_tamil.map(RichTextDocument::parse).transpose()?,
            category_id: self.category_id,
        })
    }
}

impl CreateBlogDto {
    pub fn into_fields(self) -> Result<DraftFields, serde_json::Error> {
        Ok(DraftFields {
            title: self.title,
            content: RichTextDocument::parse(self.content)?,
            title_tamil: self.title_tamil,
            content_tamil: RichTextDocument::parse(self.content_tamil)?,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RejectBlogDto {
    #[validate(length(
        min = 1,
        max = MAX_REJECTION_REASON_LENGTH,
        message = "A rejection reason is required"
    ))]
    pub reason: String,
}

/// Full blog, as seen by `viewer`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content: RichTextDocument,
    pub title_tamil: String,
    pub content_tamil: RichTextDocument,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_name_tamil: Option<String>,
    pub author_id: String,
    pub author_name: Option<String>,
    pub status: BlogStatus,
    pub rejection_reason: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// Lifecycle actions available to the requesting user
    pub allowed_actions: Vec<BlogAction>,
    /// Whether the requesting user may edit the draft fields
    pub can_edit: bool,
}

impl BlogResponseDto {
    pub fn from_row(row: BlogRow, viewer: Option<&AuthenticatedUser>) -> Self {
        let fields = row.draft_fields();
        Self::with_fields(row, fields, viewer)
    }

    /// Response carrying `fields` in place of the stored draft fields
    pub fn with_fields(
        row: BlogRow,
        fields: DraftFields,
        viewer: Option<&AuthenticatedUser>,
    ) -> Self {
        let can_edit = viewer.is_some_and(|u| u.user_id == row.author_id && u.is_writer())
            && row.status.is_editable();

        Self {
            allowed_actions: allowed_actions(row.status, viewer, &row.author_id),
            can_edit,
            id: row.id,
            title: fields.title,
            content: fields.content,
            title_tamil: fields.title_tamil,
            content_tamil: fields.content_tamil,
            category_id: fields.category_id,
            category_name: row.category_name,
            category_name_tamil: row.category_name_tamil,
            author_id: row.author_id,
            author_name: row.author_name,
            status: row.status,
            rejection_reason: row.rejection_reason,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
        }
    }
}

/// List entry with a plain text excerpt instead of the documents
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub title_tamil: String,
    pub excerpt: String,
    pub excerpt_tamil: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub author_id: String,
    pub author_name: Option<String>,
    pub status: BlogStatus,
    pub view_count: i64,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<BlogRow> for BlogSummaryDto {
    fn from(row: BlogRow) -> Self {
        let fields = row.draft_fields();
        Self {
            id: row.id,
            title: fields.title,
            title_tamil: fields.title_tamil,
            excerpt: fields.content.excerpt(EXCERPT_LENGTH),
            excerpt_tamil: fields.content_tamil.excerpt(EXCERPT_LENGTH),
            category_id: row.category_id,
            category_name: row.category_name,
            author_id: row.author_id,
            author_name: row.author_name,
            status: row.status,
            view_count: row.view_count,
            updated_at: row.updated_at,
            published_at: row.published_at,
        }
    }
}

/// Query parameters for listing blogs
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct BlogQueryParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Filter by category slug
    pub category: Option<String>,
    /// Filter by author profile id
    pub author_id: Option<String>,
    /// Case-insensitive match on English or Tamil title
    pub search: Option<String>,
    /// Only for `/api/blogs/mine`
    pub status: Option<BlogStatus>,
}

impl BlogQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

/// Query parameters for the review queue
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ReviewQueryParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Defaults to `pending_approval`
    pub status: Option<BlogStatus>,
}

impl ReviewQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Autosave session state of a blog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DraftStatusDto {
    pub blog_id: Uuid,
    /// Unsaved edits exist
    pub dirty: bool,
    /// A save is in flight
    pub saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Error of the last failed save, cleared by the next success
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_accepts_plain_text_content() {
        let dto: CreateBlogDto = serde_json::from_value(json!({
            "title": "Monsoon",
            "content": "First line\nSecond line",
            "submit": true
        }))
        .unwrap();

        assert!(dto.submit);
        let fields = dto.into_fields().unwrap();
        assert_eq!(fields.content.blocks.len(), 2);
        assert!(fields.content_tamil.is_blank());
    }

    #[test]
    fn test_reject_requires_reason() {
        let dto = RejectBlogDto {
            reason: String::new(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_draft_patch_converts_documents() {
        let dto: DraftPatchDto = serde_json::from_value(json!({
            "content_tamil": "வணக்கம்",
            "category_id": null
        }))
        .unwrap();

        let patch = dto.into_patch().unwrap();
        assert_eq!(patch.content_tamil.unwrap().plain_text(), "வணக்கம்");
        assert_eq!(patch.category_id, Some(None));
        assert!(patch.title.is_none());
    }
}
