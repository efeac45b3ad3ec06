use sqlx::PgPool;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::models::Category;
use crate::modules::realtime::{ChangeAction, ChangeFeed};

const CATEGORY_COLUMNS: &str = r#"
    id, name, name_tamil, slug, description, display_order, is_active, created_at, updated_at
"#;

/// Service for blog category operations
pub struct CategoryService {
    pool: PgPool,
    changes: ChangeFeed,
}

impl CategoryService {
    pub fn new(pool: PgPool, changes: ChangeFeed) -> Self {
        Self { pool, changes }
    }

    /// List all active categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM blog_categories WHERE is_active = TRUE ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM blog_categories WHERE slug = $1 AND is_active = TRUE",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let slug = dto.resolved_slug();
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Slug is required when the name has no Latin letters".to_string(),
            ));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO blog_categories (name, name_tamil, slug, description, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(dto.name_tamil.as_deref().map(str::trim))
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, &format!("Category '{}' already exists", slug)))?;

        tracing::info!("Category {} created", category.slug);
        self.changes
            .publish("blog_categories", ChangeAction::Insert, category.id);

        Ok(category.into())
    }
}
