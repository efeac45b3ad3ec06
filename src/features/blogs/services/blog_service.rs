use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::blogs::models::{
    BlogAction, BlogRow, BlogStatus, DraftFields, RichTextDocument, BLOG_SELECT,
};
use crate::features::blogs::services::DraftStore;
use crate::features::notifications::services::{NotificationService, Recipient, ReviewOutcome};
use crate::modules::realtime::{ChangeAction, ChangeFeed};
use crate::shared::types::PaginationQuery;

/// A submission needs a title and content. Content counts as empty when the
/// first block of the document has no text.
pub fn validate_submission(fields: &DraftFields) -> Result<()> {
    if fields.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if fields.content.is_blank() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    Ok(())
}

/// Filters for blog listings; `None` matches everything
#[derive(Debug, Default)]
pub struct BlogListFilter<'a> {
    pub status: Option<BlogStatus>,
    pub author_id: Option<&'a str>,
    pub category_slug: Option<&'a str>,
    pub search: Option<String>,
}

const LIST_FILTER: &str = r#"
    WHERE ($1::blog_status IS NULL OR b.status = $1)
      AND ($2::text IS NULL OR b.author_id = $2)
      AND ($3::text IS NULL OR c.slug = $3)
      AND ($4::text IS NULL OR b.title ILIKE $4 OR b.title_tamil ILIKE $4)
"#;

/// Service for blog persistence and the status lifecycle
pub struct BlogService {
    pool: PgPool,
    changes: ChangeFeed,
    notifications: Arc<NotificationService>,
}

impl BlogService {
    pub fn new(pool: PgPool, changes: ChangeFeed, notifications: Arc<NotificationService>) -> Self {
        Self {
            pool,
            changes,
            notifications,
        }
    }

    pub async fn fetch(&self, id: Uuid) -> Result<BlogRow> {
        sqlx::query_as::<_, BlogRow>(&format!("{} WHERE b.id = $1", BLOG_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get blog: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Blog {} not found", id)))
    }

    /// Create a blog owned by `user`. With `submit` the blog goes straight
    /// to review and must pass submission validation first.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        fields: DraftFields,
        submit: bool,
    ) -> Result<BlogRow> {
        let status = if submit {
            validate_submission(&fields)?;
            BlogStatus::Draft
                .apply(BlogAction::Submit)
                .map_err(|e| AppError::Conflict(e.to_string()))?
        } else {
            BlogStatus::Draft
        };

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO blogs (title, content, title_tamil, content_tamil, category_id, author_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(fields.content.to_value())
        .bind(&fields.title_tamil)
        .bind(fields.content_tamil.to_value())
        .bind(fields.category_id)
        .bind(&user.user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Blog already exists"))?;

        tracing::info!("Blog {} created by {} as {}", id, user.user_id, status);
        self.changes.publish("blogs", ChangeAction::Insert, id);

        self.fetch(id).await
    }

    /// A published blog; each read counts as a view
    pub async fn view_published(&self, id: Uuid) -> Result<BlogRow> {
        let updated = sqlx::query(
            "UPDATE blogs SET view_count = view_count + 1 WHERE id = $1 AND status = 'published'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count blog view: {:?}", e);
            AppError::Database(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Blog {} not found", id)));
        }

        self.fetch(id).await
    }

    pub async fn list(
        &self,
        filter: BlogListFilter<'_>,
        pagination: &PaginationQuery,
        order_by: &str,
    ) -> Result<(Vec<BlogRow>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM blogs b
            LEFT JOIN blog_categories c ON c.id = b.category_id
            {}
            "#,
            LIST_FILTER
        ))
        .bind(filter.status)
        .bind(filter.author_id)
        .bind(filter.category_slug)
        .bind(&filter.search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count blogs: {:?}", e);
            AppError::Database(e)
        })?;

        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "{} {} ORDER BY {} LIMIT $5 OFFSET $6",
            BLOG_SELECT, LIST_FILTER, order_by
        ))
        .bind(filter.status)
        .bind(filter.author_id)
        .bind(filter.category_slug)
        .bind(&filter.search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list blogs: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows, total))
    }

    /// Blog as seen from the editor: authors and reviewers only
    pub async fn get_for_edit(&self, user: &AuthenticatedUser, id: Uuid) -> Result<BlogRow> {
        let row = self.fetch(id).await?;
        if row.author_id != user.user_id && !user.is_reviewer() {
            return Err(AppError::Forbidden(
                "Only the author or a reviewer can open this blog".to_string(),
            ));
        }
        Ok(row)
    }

    /// Apply a lifecycle action. Row is locked for the duration so
    /// concurrent transitions serialize.
    pub async fn transition(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        action: BlogAction,
        reason: Option<String>,
    ) -> Result<BlogRow> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let (author_id, from, title, content): (String, BlogStatus, String, serde_json::Value) =
            sqlx::query_as(
                "SELECT author_id, status, title, content FROM blogs WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock blog: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Blog {} not found", id)))?;

        if !action.actor().permits(user, &author_id) {
            return Err(AppError::Forbidden(format!(
                "You are not allowed to {} this blog",
                action
            )));
        }

        let to = from
            .apply(action)
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        if action == BlogAction::Submit {
            validate_submission(&DraftFields {
                title,
                content: RichTextDocument::from_stored(content),
                ..Default::default()
            })?;
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        if action.requires_reason() && reason.is_none() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }

        // Rejections record the reason; resubmission and approval clear it
        let replace_reason = matches!(
            action,
            BlogAction::Reject | BlogAction::Submit | BlogAction::Approve
        );

        sqlx::query(
            r#"
            UPDATE blogs SET
                status = $2,
                rejection_reason = CASE WHEN $4 THEN $3 ELSE rejection_reason END,
                published_at = CASE WHEN $2 = 'published'::blog_status
                                    THEN COALESCE(published_at, NOW())
                                    ELSE published_at END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(&reason)
        .bind(replace_reason)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update blog status: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Blog {} {}: {} -> {} by {}",
            id,
            action,
            from,
            to,
            user.user_id
        );
        self.changes.publish("blogs", ChangeAction::Update, id);

        let row = self.fetch(id).await?;
        self.notify_review_outcome(&row, action);
        Ok(row)
    }

    fn notify_review_outcome(&self, row: &BlogRow, action: BlogAction) {
        let outcome = match action {
            BlogAction::Approve => ReviewOutcome::Approved,
            BlogAction::Reject => ReviewOutcome::Rejected,
            BlogAction::Publish => ReviewOutcome::Published,
            _ => return,
        };
        let Some(recipient) = Recipient::new(row.author_email.as_deref(), row.author_name.as_deref())
        else {
            tracing::debug!("Author of blog {} has no email, skipping notification", row.id);
            return;
        };

        let notifications = self.notifications.clone();
        let (blog_id, title, reason) = (row.id, row.title.clone(), row.rejection_reason.clone());
        tokio::spawn(async move {
            notifications
                .send_review_outcome(&recipient, outcome, blog_id, &title, reason.as_deref())
                .await;
        });
    }

    /// Authors delete their own drafts; admins delete anything
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let row = self.fetch(id).await?;

        let is_author = row.author_id == user.user_id;
        if !user.is_admin() && !(is_author && row.status.is_editable()) {
            return Err(AppError::Forbidden(
                "Only drafts can be deleted by their author".to_string(),
            ));
        }

        sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete blog: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Blog {} deleted by {}", id, user.user_id);
        self.changes.publish("blogs", ChangeAction::Delete, id);
        Ok(())
    }

    /// Explain why a draft write matched no row
    async fn draft_write_error(&self, user_id: &str, id: Uuid) -> AppError {
        match self.fetch(id).await {
            Err(e) => e,
            Ok(row) if row.author_id != user_id => {
                AppError::Forbidden("Only the author can edit this blog".to_string())
            }
            Ok(row) => AppError::Conflict(format!(
                "Blog is {} and can no longer be edited",
                row.status
            )),
        }
    }
}

#[async_trait]
impl DraftStore for BlogService {
    async fn load_draft(&self, user_id: &str, blog_id: Uuid) -> Result<DraftFields> {
        let row = self.fetch(blog_id).await?;
        if row.author_id != user_id || !row.status.is_editable() {
            return Err(self.draft_write_error(user_id, blog_id).await);
        }
        Ok(row.draft_fields())
    }

    async fn save_draft(&self, user_id: &str, blog_id: Uuid, fields: &DraftFields) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE blogs SET
                title = $3,
                content = $4,
                title_tamil = $5,
                content_tamil = $6,
                category_id = $7,
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2 AND status IN ('draft', 'rejected')
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(fields.content.to_value())
        .bind(&fields.title_tamil)
        .bind(fields.content_tamil.to_value())
        .bind(fields.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Blog draft conflicts with an existing record"))?;

        if result.rows_affected() == 0 {
            return Err(self.draft_write_error(user_id, blog_id).await);
        }

        tracing::debug!("Saved draft of blog {}", blog_id);
        self.changes.publish("blogs", ChangeAction::Update, blog_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::Fake;

    fn fields(title: &str, content: RichTextDocument) -> DraftFields {
        DraftFields {
            title: title.to_string(),
            content,
            ..Default::default()
        }
    }

    #[test]
    fn test_submission_requires_title() {
        let body: String = Paragraph(1..3).fake();
        let err = validate_submission(&fields("   ", RichTextDocument::from_plain_text(&body)))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Title is required"));
    }

    #[test]
    fn test_submission_requires_content() {
        let title: String = Sentence(2..5).fake();
        let err = validate_submission(&fields(&title, RichTextDocument::empty())).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Content is required"));
    }

    #[test]
    fn test_submission_judges_content_by_first_block() {
        let doc = RichTextDocument::from_plain_text("\nsecond line only");
        assert!(validate_submission(&fields("Title", doc)).is_err());

        let doc = RichTextDocument::from_plain_text("first line");
        assert!(validate_submission(&fields("Title", doc)).is_ok());
    }
}
