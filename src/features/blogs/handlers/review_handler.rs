use super::blog_handler::BlogState;
use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireReviewer;
use crate::features::blogs::dtos::{
    BlogResponseDto, BlogSummaryDto, RejectBlogDto, ReviewQueryParams,
};
use crate::features::blogs::models::{BlogAction, BlogStatus};
use crate::features::blogs::services::BlogListFilter;
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

/// Review queue, oldest first. Defaults to blogs pending approval.
#[utoipa::path(
    get,
    path = "/api/review/blogs",
    params(ReviewQueryParams),
    responses(
        (status = 200, description = "Blogs awaiting review", body = ApiResponse<Vec<BlogSummaryDto>>),
        (status = 403, description = "Manager access required")
    ),
    tag = "review",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_review_queue(
    State(state): State<BlogState>,
    RequireReviewer(_user): RequireReviewer,
    Query(params): Query<ReviewQueryParams>,
) -> Result<Json<ApiResponse<Vec<BlogSummaryDto>>>> {
    let filter = BlogListFilter {
        status: Some(params.status.unwrap_or(BlogStatus::PendingApproval)),
        author_id: None,
        category_slug: None,
        search: None,
    };

    let (rows, total) = state
        .blogs
        .list(filter, &params.pagination(), "b.updated_at ASC")
        .await?;

    Ok(Json(ApiResponse::paginated(
        rows.into_iter().map(Into::into).collect(),
        total,
    )))
}

async fn review(
    state: &BlogState,
    user: &crate::features::auth::model::AuthenticatedUser,
    id: Uuid,
    action: BlogAction,
    reason: Option<String>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    let row = state.blogs.transition(user, id, action, reason).await?;
    Ok(Json(ApiResponse::success(
        Some(BlogResponseDto::from_row(row, Some(user))),
        Some(format!("Blog {}", row_status_message(action))),
        None,
    )))
}

fn row_status_message(action: BlogAction) -> &'static str {
    match action {
        BlogAction::Approve => "approved",
        BlogAction::Reject => "rejected",
        BlogAction::Publish => "published",
        BlogAction::Unpublish => "unpublished",
        _ => "updated",
    }
}

#[utoipa::path(
    post,
    path = "/api/review/blogs/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog approved", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Manager access required"),
        (status = 409, description = "Blog is not pending approval")
    ),
    tag = "review",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn approve_blog(
    State(state): State<BlogState>,
    RequireReviewer(user): RequireReviewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    review(&state, &user, id, BlogAction::Approve, None).await
}

/// Reject a pending blog; the reason is shown to the author
#[utoipa::path(
    post,
    path = "/api/review/blogs/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    request_body = RejectBlogDto,
    responses(
        (status = 200, description = "Blog rejected", body = ApiResponse<BlogResponseDto>),
        (status = 400, description = "Missing rejection reason"),
        (status = 403, description = "Manager access required"),
        (status = 409, description = "Blog is not pending approval")
    ),
    tag = "review",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reject_blog(
    State(state): State<BlogState>,
    RequireReviewer(user): RequireReviewer,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RejectBlogDto>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reason = dto.reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::Validation(
            "Rejection reason is required".to_string(),
        ));
    }

    review(&state, &user, id, BlogAction::Reject, Some(reason)).await
}

#[utoipa::path(
    post,
    path = "/api/review/blogs/{id}/publish",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog published", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Manager access required"),
        (status = 409, description = "Blog is not approved")
    ),
    tag = "review",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn publish_blog(
    State(state): State<BlogState>,
    RequireReviewer(user): RequireReviewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    review(&state, &user, id, BlogAction::Publish, None).await
}

#[utoipa::path(
    post,
    path = "/api/review/blogs/{id}/unpublish",
    params(
        ("id" = Uuid, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog taken down", body = ApiResponse<BlogResponseDto>),
        (status = 403, description = "Manager access required"),
        (status = 409, description = "Blog is not published")
    ),
    tag = "review",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unpublish_blog(
    State(state): State<BlogState>,
    RequireReviewer(user): RequireReviewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogResponseDto>>> {
    review(&state, &user, id, BlogAction::Unpublish, None).await
}
