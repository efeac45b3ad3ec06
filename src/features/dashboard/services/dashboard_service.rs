use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::*;
use crate::features::dashboard::models::*;

const RECENT_BLOG_LIMIT: i64 = 5;

/// Aggregate queries for the writer dashboard and admin statistics
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Writer dashboard
    // ========================================================================

    pub async fn writer_dashboard(&self, author_id: &str) -> Result<WriterDashboardDto> {
        let counts = sqlx::query_as::<_, StatusCountsRow>(&format!(
            "SELECT {} FROM blogs WHERE author_id = $1",
            STATUS_COUNT_COLUMNS
        ))
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count blogs of {}: {:?}", author_id, e);
            AppError::Database(e)
        })?;

        let engagement = sqlx::query_as::<_, WriterEngagementRow>(
            r#"
            SELECT
                COALESCE((SELECT SUM(view_count) FROM blogs
                          WHERE author_id = $1 AND status = 'published'), 0)::bigint AS total_views,
                (SELECT COUNT(*) FROM blog_comments c
                 JOIN blogs b ON b.id = c.blog_id
                 WHERE b.author_id = $1) AS comments_received,
                (SELECT ROUND(AVG(r.rating), 2) FROM blog_ratings r
                 JOIN blogs b ON b.id = r.blog_id
                 WHERE b.author_id = $1) AS average_rating,
                (SELECT COUNT(*) FROM blog_ratings r
                 JOIN blogs b ON b.id = r.blog_id
                 WHERE b.author_id = $1) AS rating_count,
                (SELECT COUNT(*) FROM event_registrations er
                 JOIN events e ON e.id = er.event_id
                 WHERE er.user_id = $1 AND e.event_date >= CURRENT_DATE) AS upcoming_registrations
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load engagement of {}: {:?}", author_id, e);
            AppError::Database(e)
        })?;

        let recent = sqlx::query_as::<_, RecentBlogRow>(
            r#"
            SELECT id, title, title_tamil, status, rejection_reason, updated_at
            FROM blogs
            WHERE author_id = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(RECENT_BLOG_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list recent blogs of {}: {:?}", author_id, e);
            AppError::Database(e)
        })?;

        Ok(WriterDashboardDto {
            blogs: counts.into(),
            total_views: engagement.total_views,
            comments_received: engagement.comments_received,
            average_rating: engagement.average_rating,
            rating_count: engagement.rating_count,
            upcoming_registrations: engagement.upcoming_registrations,
            recent_blogs: recent.into_iter().map(RecentBlogDto::from).collect(),
        })
    }

    // ========================================================================
    // Admin statistics
    // ========================================================================

    pub async fn admin_stats(&self) -> Result<AdminStatsDto> {
        let users = sqlx::query_as::<_, UserCountsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE COALESCE(r.role, 'reader') = 'reader') AS readers,
                COUNT(*) FILTER (WHERE r.role = 'writer') AS writers,
                COUNT(*) FILTER (WHERE r.role = 'manager') AS managers,
                COUNT(*) FILTER (WHERE r.role = 'admin') AS admins,
                COUNT(*) FILTER (WHERE p.created_at >= date_trunc('month', CURRENT_DATE)) AS new_this_month
            FROM profiles p
            LEFT JOIN user_roles r ON r.user_id = p.id
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users: {:?}", e);
            AppError::Database(e)
        })?;

        let blogs = sqlx::query_as::<_, StatusCountsRow>(&format!(
            "SELECT {} FROM blogs",
            STATUS_COUNT_COLUMNS
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count blogs: {:?}", e);
            AppError::Database(e)
        })?;

        let activity = sqlx::query_as::<_, ActivityCountsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events) AS events_total,
                (SELECT COUNT(*) FROM events WHERE event_date >= CURRENT_DATE) AS events_upcoming,
                (SELECT COUNT(*) FROM event_registrations) AS registrations,
                (SELECT COUNT(*) FROM blog_comments)
                    + (SELECT COUNT(*) FROM event_comments) AS comments,
                (SELECT COUNT(*) FROM blog_ratings)
                    + (SELECT COUNT(*) FROM event_ratings) AS ratings,
                (SELECT COUNT(*) FROM files WHERE is_active) AS files
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count activity: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(AdminStatsDto {
            users: users.into(),
            blogs: blogs.into(),
            activity: activity.into(),
        })
    }
}
