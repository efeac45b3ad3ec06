use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::files::models::File;

/// What an upload is for; decides the storage folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    /// Profile picture; also set as the uploader's `avatar_url`
    Avatar,
    EventImage,
    BlogImage,
}

impl FilePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            FilePurpose::Avatar => "avatar",
            FilePurpose::EventImage => "event_image",
            FilePurpose::BlogImage => "blog_image",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "avatar" => Some(FilePurpose::Avatar),
            "event_image" => Some(FilePurpose::EventImage),
            "blog_image" => Some(FilePurpose::BlogImage),
            _ => None,
        }
    }

    /// Storage folder below the public prefix
    pub fn folder(self) -> &'static str {
        match self {
            FilePurpose::Avatar => "avatars",
            FilePurpose::EventImage => "events",
            FilePurpose::BlogImage => "blogs",
        }
    }
}

/// Upload form, documented for Swagger UI; the handler reads the
/// multipart stream directly
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// Image to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// `avatar`, `event_image` or `blog_image`
    #[schema(example = "event_image")]
    pub purpose: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    /// Public URL of the image
    pub url: String,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            original_filename: file.original_filename,
            content_type: file.content_type,
            file_size: file.file_size,
            url: file.url,
            purpose: file.purpose,
            created_at: file.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteFileByUrlDto {
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum image size in bytes (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn validate_upload(content_type: &str, size: usize) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }
    if size > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("image/png", 1024).is_ok());
        assert!(validate_upload("image/png", 0).is_err());
        assert!(validate_upload("image/png", MAX_FILE_SIZE + 1).is_err());
        assert!(validate_upload("application/pdf", 1024).is_err());
    }

    #[test]
    fn test_purpose_parsing() {
        assert_eq!(FilePurpose::parse("avatar"), Some(FilePurpose::Avatar));
        assert_eq!(FilePurpose::parse(" blog_image "), Some(FilePurpose::BlogImage));
        assert_eq!(FilePurpose::parse("profile_picture"), None);
        assert_eq!(FilePurpose::EventImage.folder(), "events");
    }
}
