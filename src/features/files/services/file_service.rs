use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{extension_for, FilePurpose, FileResponseDto};
use crate::features::files::models::{File, FILE_COLUMNS};
use crate::modules::storage::ObjectStore;

/// Uploads to object storage with a metadata row per object
pub struct FileService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl FileService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { pool, store }
    }

    /// Store the object under `{folder}/{user_id}/{file_id}.{ext}` and record it.
    /// Avatar uploads also become the uploader's profile picture.
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        purpose: FilePurpose,
    ) -> Result<FileResponseDto> {
        let file_size = data.len() as i64;
        let extension = extension_for(content_type).unwrap_or("bin");
        let path = format!(
            "{}/{}/{}.{}",
            purpose.folder(),
            user.user_id,
            Uuid::new_v4(),
            extension
        );
        let file_key = self.store.key_for(&path);
        let url = self.store.url_for(&file_key);

        self.store.put(&file_key, data, content_type).await?;

        let file = sqlx::query_as::<_, File>(&format!(
            r#"
            INSERT INTO files (file_key, original_filename, content_type, file_size, url, purpose, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(&file_key)
        .bind(original_filename)
        .bind(content_type)
        .bind(file_size)
        .bind(&url)
        .bind(purpose.as_str())
        .bind(&user.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save file metadata: {:?}", e);
            AppError::Database(e)
        })?;

        if purpose == FilePurpose::Avatar {
            sqlx::query("UPDATE profiles SET avatar_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(&user.user_id)
                .bind(&file.url)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to update avatar: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        info!(
            "File saved: id={}, key={}, purpose={}, size={}",
            file.id, file.file_key, file.purpose, file.file_size
        );

        Ok(file.into())
    }

    /// Remove the object and deactivate its row. Owners delete their own
    /// files; admins any.
    pub async fn delete_by_url(&self, user: &AuthenticatedUser, url: &str) -> Result<()> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE url = $1 AND is_active = TRUE",
            FILE_COLUMNS
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find file: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if file.uploaded_by != user.user_id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this file".to_string(),
            ));
        }

        if let Err(e) = self.store.remove(&file.file_key).await {
            // Deactivate the row even if the object lingers
            warn!("Object {} was not removed: {}", file.file_key, e);
        }

        sqlx::query("UPDATE files SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(file.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to deactivate file: {:?}", e);
                AppError::Database(e)
            })?;

        info!("File soft deleted: id={}, key={}", file.id, file.file_key);
        Ok(())
    }
}
