use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, MaybeUser};
use crate::features::auth::guards::RequireWriter;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::blogs::dtos::{
    BlogQueryParams, BlogResponseDto, BlogSummaryDto, CreateBlogDto, DraftPatchDto,
    DraftStatusDto,
};
use crate::features::blogs::models::BlogAction;
use crate::features::blogs::services::{
    AutosaveService, BlogListFilter, BlogService, TranslationService,
};
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct BlogState {
    pub blogs: Arc<BlogService>,
    pub autosave: Arc<AutosaveService>,
    pub translation: Arc<TranslationService>,
}

/// List published blogs
#[utoipa::path(
    get,
    path = "/api/blogs",
    params(BlogQueryParams),
    responses(
        (status = 200, description = "Published blogs", body = ApiResponse<Vec<BlogSummaryDto>>)
    ),
    tag = "blogs"
)]
pub async fn list_published(
    State(state): State<BlogState>,
    Query(params): Query<BlogQueryParams>,
) -> Result<Json<ApiResponse<Vec<BlogSummaryDto>>>> {
    let filter = BlogListFilter {
        status: Some(crate::features::blogs::models::BlogStatus::Published),
        author_id: params.author_id.as_deref(),
        category_slug: params.category.as_deref(),
        search: params.search_pattern(),
    };

    let (rows, total) = state
        .blogs
        .list(filter, &params.pagination(), "b.published_at DESC NULLS LAST")
        .await?;

    Ok(Json(ApiResponse::paginated(
        rows.into_iter().map(Into::into).collect(),
        total,
    )))
}

/// Read a published blog
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog", body = ApiResponse<BlogResponseDto>),
        (status = 404, description = "Blog not found or not published")
    ),
    tag = "blogs"
)]
pub async fn get_published(
    State(state): State<BlogState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    let row = state.blogs.view_published(id).await?;
    Ok(Json(ApiResponse::success(
        Some(BlogResponseDto::from_row(row, viewer.as_ref())),
        None,
        None,
    )))
}

/// Create a blog as draft, or submit it for review right away
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogDto,
    responses(
        (status = 201, description = "Blog created", body = ApiResponse<BlogResponseDto>),
        (status = 400, description = "Validation error (empty title or content on submit)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Writer role required")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_blog(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    AppJson(dto): AppJson<CreateBlogDto>,
) -> Result<(StatusCode, Json<ApiResponse<BlogResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let submit = dto.submit;
    let fields = dto
        .into_fields()
        .map_err(|e| AppError::Validation(format!("Invalid document: {}", e)))?;

    let row = state.blogs.create(&user, fields, submit).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(BlogResponseDto::from_row(row, Some(&user))),
            Some(if submit {
                "Blog submitted for review".to_string()
            } else {
                "Draft saved".to_string()
            }),
            None,
        )),
    ))
}

/// List the caller's own blogs in any status
#[utoipa::path(
    get,
    path = "/api/blogs/mine",
    params(BlogQueryParams),
    responses(
        (status = 200, description = "Own blogs", body = ApiResponse<Vec<BlogSummaryDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_blogs(
    State(state): State<BlogState>,
    user: AuthenticatedUser,
    Query(params): Query<BlogQueryParams>,
) -> Result<Json<ApiResponse<Vec<BlogSummaryDto>>>> {
    let filter = BlogListFilter {
        status: params.status,
        author_id: Some(&user.user_id),
        category_slug: params.category.as_deref(),
        search: params.search_pattern(),
    };

    let (rows, total) = state
        .blogs
        .list(filter, &params.pagination(), "b.updated_at DESC")
        .await?;

    Ok(Json(ApiResponse::paginated(
        rows.into_iter().map(Into::into).collect(),
        total,
    )))
}

/// Open a blog in the editor. Unsaved autosave edits are merged in.
#[utoipa::path(
    get,
    path = "/api/blogs/{id}/edit",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog with pending edits", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Not the author or a reviewer"),
        (status = 404, description = "Blog not found")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_blog_for_edit(
    State(state): State<BlogState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    let row = state.blogs.get_for_edit(&user, id).await?;

    let dto = match state.autosave.reconcile(id, &row.draft_fields()).await {
        Some(fields) if row.author_id == user.user_id => {
            BlogResponseDto::with_fields(row, fields, Some(&user))
        }
        _ => BlogResponseDto::from_row(row, Some(&user)),
    };

    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Record an editor change; saved after the debounce window
#[utoipa::path(
    patch,
    path = "/api/blogs/{id}/draft",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    request_body = DraftPatchDto,
    responses(
        (status = 202, description = "Edit recorded, save scheduled", body = ApiResponse<DraftStatusDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Blog is no longer editable")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn autosave_draft(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<DraftPatchDto>,
) -> Result<(StatusCode, Json<ApiResponse<DraftStatusDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let patch = dto
        .into_patch()
        .map_err(|e| AppError::Validation(format!("Invalid document: {}", e)))?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to save".to_string()));
    }

    let status = state.autosave.record_edit(&user.user_id, id, patch).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(Some(status), None, None)),
    ))
}

/// Autosave state of the caller's open editing session
#[utoipa::path(
    get,
    path = "/api/blogs/{id}/draft",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Autosave state", body = ApiResponse<DraftStatusDto>)
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_draft_status(
    State(state): State<BlogState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DraftStatusDto>>> {
    let status = state
        .autosave
        .status(&user.user_id, id)
        .await?
        .unwrap_or_else(|| idle_status(id));

    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

fn idle_status(blog_id: Uuid) -> DraftStatusDto {
    DraftStatusDto {
        blog_id,
        dirty: false,
        saving: false,
        last_saved_at: None,
        last_error: None,
    }
}

/// Persist pending edits now and close the editing session
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/draft/flush",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "All edits saved", body = ApiResponse<DraftStatusDto>),
        (status = 403, description = "Not the author")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn flush_draft(
    State(state): State<BlogState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DraftStatusDto>>> {
    let status = state
        .autosave
        .flush(&user.user_id, id)
        .await?
        .unwrap_or_else(|| idle_status(id));

    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

async fn author_transition(
    state: &BlogState,
    user: &AuthenticatedUser,
    id: Uuid,
    action: BlogAction,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    // Status checks must see the latest edits
    state.autosave.flush(&user.user_id, id).await?;

    let row = state.blogs.transition(user, id, action, None).await?;
    Ok(Json(ApiResponse::success(
        Some(BlogResponseDto::from_row(row, Some(user))),
        None,
        None,
    )))
}

/// Submit a draft or rejected blog for review
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog is pending approval", body = ApiResponse<BlogResponseDto>),
        (status = 400, description = "Empty title or content"),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Blog cannot be submitted in its current status")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_blog(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    author_transition(&state, &user, id, BlogAction::Submit).await
}

/// Take a pending blog back to draft
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog is a draft again", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Blog is not pending approval")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn withdraw_blog(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    author_transition(&state, &user, id, BlogAction::Withdraw).await
}

/// Move a rejected blog back to draft for rework
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/revise",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog is a draft again", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Blog is not rejected")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revise_blog(
    State(state): State<BlogState>,
    RequireWriter(user): RequireWriter,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    author_transition(&state, &user, id, BlogAction::Revise).await
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 403, description = "Not allowed to delete this blog"),
        (status = 404, description = "Blog not found")
    ),
    tag = "blogs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_blog(
    State(state): State<BlogState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.blogs.delete(&user, id).await?;
    state.autosave.discard(id).await;
    Ok(StatusCode::NO_CONTENT)
}
