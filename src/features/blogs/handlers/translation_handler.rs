use super::blog_handler::BlogState;
use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireWriter;
use crate::features::blogs::dtos::{
    BlogResponseDto, TranslateBlogDto, TranslateTextDto, TranslateTextResponseDto,
};
use crate::features::blogs::services::DraftStore;
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

/// Translate a blog draft into the other language and save it.
///
/// Existing content in the target language is only replaced when
/// `overwrite` is set; otherwise the request fails with 409 and nothing
/// is written.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/translate",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    request_body = TranslateBlogDto,
    responses(
        (status = 200, description = "Translated draft", body = ApiResponse<BlogResponseDto>),
        (status = 400, description = "Nothing to translate"),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Target content exists and overwrite was not confirmed"),
        (status = 502, description = "Translation service failed")
    ),
    tag = "translation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn translate_blog(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<TranslateBlogDto>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    state.autosave.flush(&user.user_id, id).await?;

    let fields = state.blogs.load_draft(&user.user_id, id).await?;
    let translated = state
        .translation
        .translate_fields(&fields, dto.direction, dto.overwrite)
        .await?;
    state
        .blogs
        .save_draft(&user.user_id, id, &translated)
        .await?;

    let row = state.blogs.fetch(id).await?;
    Ok(Json(ApiResponse::success(
        Some(BlogResponseDto::from_row(row, Some(&user))),
        Some("Translation saved".to_string()),
        None,
    )))
}

/// Translate free text without touching any blog
#[utoipa::path(
    post,
    path = "/api/translate",
    request_body = TranslateTextDto,
    responses(
        (status = 200, description = "Translated text", body = ApiResponse<TranslateTextResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Writer role required"),
        (status = 502, description = "Translation service failed")
    ),
    tag = "translation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn translate_text(
    State(state): State<BlogState>,
    RequireWriter(_user): RequireWriter,
    AppJson(dto): AppJson<TranslateTextDto>,
) -> Result<Json<ApiResponse<TranslateTextResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let translated_text = state
        .translation
        .translate_text(&dto.text, dto.direction)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(TranslateTextResponseDto { translated_text }),
        None,
        None,
    )))
}
