use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::models::{
    CommentRow, CommentTarget, RatingRow, ReactionCounts, ReactionKind,
};
use crate::modules::realtime::{ChangeAction, ChangeFeed};
use crate::shared::types::PaginationQuery;

/// `$2` is the viewer id (nullable) for `my_reaction`
fn comment_select(target: CommentTarget) -> String {
    format!(
        r#"
        SELECT
            c.id,
            c.{parent} AS parent_id,
            c.author_id,
            p.full_name AS author_name,
            p.avatar_url AS author_avatar_url,
            c.content,
            (SELECT COUNT(*) FROM {reactions} r WHERE r.comment_id = c.id AND r.reaction = 'like') AS likes,
            (SELECT COUNT(*) FROM {reactions} r WHERE r.comment_id = c.id AND r.reaction = 'dislike') AS dislikes,
            (SELECT r.reaction FROM {reactions} r WHERE r.comment_id = c.id AND r.user_id = $2) AS my_reaction,
            c.created_at,
            c.updated_at
        FROM {comments} c
        LEFT JOIN profiles p ON p.id = c.author_id
        "#,
        parent = target.parent_column(),
        reactions = target.reactions_table(),
        comments = target.comments_table(),
    )
}

/// Comments, reactions and ratings for blogs and events
pub struct CommentService {
    pool: PgPool,
    changes: ChangeFeed,
}

impl CommentService {
    pub fn new(pool: PgPool, changes: ChangeFeed) -> Self {
        Self { pool, changes }
    }

    pub async fn list(
        &self,
        target: CommentTarget,
        parent_id: Uuid,
        viewer: Option<&str>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CommentRow>, i64)> {
        self.ensure_parent_open(target, parent_id).await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            target.comments_table(),
            target.parent_column()
        ))
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count comments: {:?}", e);
            AppError::Database(e)
        })?;

        let comments = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.{} = $1 ORDER BY c.created_at ASC LIMIT $3 OFFSET $4",
            comment_select(target),
            target.parent_column()
        ))
        .bind(parent_id)
        .bind(viewer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((comments, total))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        target: CommentTarget,
        parent_id: Uuid,
        content: &str,
    ) -> Result<CommentRow> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        self.ensure_parent_open(target, parent_id).await?;

        let id: Uuid = sqlx::query_scalar(&format!(
            "INSERT INTO {} ({}, author_id, content) VALUES ($1, $2, $3) RETURNING id",
            target.comments_table(),
            target.parent_column()
        ))
        .bind(parent_id)
        .bind(&user.user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Comment already exists"))?;

        tracing::info!("Comment {} added to {} {}", id, target.parent_table(), parent_id);
        self.changes
            .publish(target.comments_table(), ChangeAction::Insert, id);

        self.fetch(target, id, Some(&user.user_id)).await
    }

    /// Authors delete their own comments; managers and admins any
    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        target: CommentTarget,
        comment_id: Uuid,
    ) -> Result<()> {
        let author_id: String = sqlx::query_scalar(&format!(
            "SELECT author_id FROM {} WHERE id = $1",
            target.comments_table()
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get comment: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        if author_id != user.user_id && !user.is_reviewer() {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", target.comments_table()))
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Comment {} deleted by {}", comment_id, user.user_id);
        self.changes
            .publish(target.comments_table(), ChangeAction::Delete, comment_id);
        Ok(())
    }

    /// Set or clear the caller's reaction. One reaction per user and comment;
    /// a new reaction replaces the previous one.
    pub async fn react(
        &self,
        user: &AuthenticatedUser,
        target: CommentTarget,
        comment_id: Uuid,
        reaction: Option<ReactionKind>,
    ) -> Result<ReactionCounts> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            target.comments_table()
        ))
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get comment: {:?}", e);
            AppError::Database(e)
        })?;
        if !exists {
            return Err(AppError::NotFound(format!("Comment {} not found", comment_id)));
        }

        let result = match reaction {
            Some(reaction) => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO {} (comment_id, user_id, reaction)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (comment_id, user_id) DO UPDATE SET reaction = EXCLUDED.reaction
                    "#,
                    target.reactions_table()
                ))
                .bind(comment_id)
                .bind(&user.user_id)
                .bind(reaction)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "DELETE FROM {} WHERE comment_id = $1 AND user_id = $2",
                    target.reactions_table()
                ))
                .bind(comment_id)
                .bind(&user.user_id)
                .execute(&self.pool)
                .await
            }
        };
        result.map_err(|e| {
            tracing::error!("Failed to save reaction: {:?}", e);
            AppError::Database(e)
        })?;

        self.changes
            .publish(target.reactions_table(), ChangeAction::Update, comment_id);

        sqlx::query_as::<_, ReactionCounts>(&format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE reaction = 'like') AS likes,
                COUNT(*) FILTER (WHERE reaction = 'dislike') AS dislikes
            FROM {}
            WHERE comment_id = $1
            "#,
            target.reactions_table()
        ))
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reactions: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Rate 1-5; rating again replaces the caller's previous rating
    pub async fn rate(
        &self,
        user: &AuthenticatedUser,
        target: CommentTarget,
        parent_id: Uuid,
        rating: i16,
    ) -> Result<RatingRow> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        self.ensure_parent_open(target, parent_id).await?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {table} ({parent}, user_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT ({parent}, user_id) DO UPDATE SET rating = EXCLUDED.rating, updated_at = NOW()
            "#,
            table = target.ratings_table(),
            parent = target.parent_column()
        ))
        .bind(parent_id)
        .bind(&user.user_id)
        .bind(rating)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save rating: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!(
            "User {} rated {} {} with {}",
            user.user_id,
            target.parent_table(),
            parent_id,
            rating
        );
        self.changes
            .publish(target.ratings_table(), ChangeAction::Update, parent_id);

        self.summary_row(target, parent_id, Some(&user.user_id)).await
    }

    pub async fn rating_summary(
        &self,
        target: CommentTarget,
        parent_id: Uuid,
        viewer: Option<&str>,
    ) -> Result<RatingRow> {
        self.ensure_parent_open(target, parent_id).await?;
        self.summary_row(target, parent_id, viewer).await
    }

    async fn summary_row(
        &self,
        target: CommentTarget,
        parent_id: Uuid,
        viewer: Option<&str>,
    ) -> Result<RatingRow> {
        sqlx::query_as::<_, RatingRow>(&format!(
            r#"
            SELECT
                ROUND(AVG(rating)::numeric, 2) AS average,
                COUNT(*) AS count,
                (SELECT rating FROM {table} WHERE {parent} = $1 AND user_id = $2) AS my_rating
            FROM {table}
            WHERE {parent} = $1
            "#,
            table = target.ratings_table(),
            parent = target.parent_column()
        ))
        .bind(parent_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to summarize ratings: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn fetch(
        &self,
        target: CommentTarget,
        id: Uuid,
        viewer: Option<&str>,
    ) -> Result<CommentRow> {
        sqlx::query_as::<_, CommentRow>(&format!("{} WHERE c.id = $1", comment_select(target)))
            .bind(id)
            .bind(viewer)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get comment: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    async fn ensure_parent_open(&self, target: CommentTarget, parent_id: Uuid) -> Result<()> {
        let open: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND {})",
            target.parent_table(),
            target.visible_parent_clause()
        ))
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check {}: {:?}", target.parent_table(), e);
            AppError::Database(e)
        })?;

        if !open {
            return Err(AppError::NotFound(format!(
                "{} {} not found",
                target.label(),
                parent_id
            )));
        }
        Ok(())
    }
}
