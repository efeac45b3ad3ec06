use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::users::dtos::{WriterQueryParams, WriterResponseDto};
use crate::features::users::models::WriterRow;

/// Public directory of members with at least the writer role
pub struct WriterService {
    pool: PgPool,
}

const WRITER_SELECT: &str = r#"
    SELECT p.id, p.full_name, p.avatar_url, p.level, p.bio, p.social_links,
           p.city, p.country, r.role,
           (SELECT COUNT(*) FROM blogs b
             WHERE b.author_id = p.id AND b.status = 'published') AS published_blogs
    FROM profiles p
    JOIN user_roles r ON r.user_id = p.id
    WHERE r.role IN ('writer', 'manager', 'admin')
"#;

impl WriterService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, params: &WriterQueryParams) -> Result<(Vec<WriterResponseDto>, i64)> {
        let pagination = params.pagination();
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let filter = r#"
            AND ($1::text IS NULL OR p.full_name ILIKE $1)
            AND ($2::text IS NULL OR p.level = $2)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM profiles p
            JOIN user_roles r ON r.user_id = p.id
            WHERE r.role IN ('writer', 'manager', 'admin') {}
            "#,
            filter
        ))
        .bind(&search)
        .bind(&params.level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count writers: {:?}", e);
            AppError::Database(e)
        })?;

        let rows = sqlx::query_as::<_, WriterRow>(&format!(
            "{} {} ORDER BY published_blogs DESC, p.full_name LIMIT $3 OFFSET $4",
            WRITER_SELECT, filter
        ))
        .bind(&search)
        .bind(&params.level)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list writers: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: &str) -> Result<WriterResponseDto> {
        sqlx::query_as::<_, WriterRow>(&format!("{} AND p.id = $1", WRITER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get writer: {:?}", e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Writer {} not found", id)))
    }
}
