use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    validate_upload, DeleteFileByUrlDto, DeleteFileResponseDto, FilePurpose, FileResponseDto,
    UploadFileDto,
};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `file`: the image (JPEG, PNG, GIF or WebP)
/// - `purpose`: `avatar`, `event_image` or `blog_image`
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Image upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file, unsupported type or unknown purpose"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut upload: Option<(Vec<u8>, String, String)> = None;
    let mut purpose: Option<FilePurpose> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                upload = Some((data.to_vec(), file_name, content_type));
            }
            "purpose" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read purpose field: {}", e))
                })?;
                purpose = Some(FilePurpose::parse(&text).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown file purpose '{}'", text))
                })?);
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    let (data, file_name, content_type) =
        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let purpose = purpose.ok_or_else(|| AppError::BadRequest("Purpose is required".to_string()))?;
    validate_upload(&content_type, data.len())?;

    let response = service
        .upload(&user, data, &file_name, &content_type, purpose)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Delete a file by its URL
///
/// Owners delete their own files; admins any.
#[utoipa::path(
    delete,
    path = "/api/files",
    tag = "files",
    request_body = DeleteFileByUrlDto,
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 400, description = "Invalid URL"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to delete this file"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file_by_url(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<DeleteFileByUrlDto>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.delete_by_url(&user, &dto.url).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}
