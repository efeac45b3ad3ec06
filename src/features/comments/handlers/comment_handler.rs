use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, MaybeUser};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    CommentResponseDto, CreateCommentDto, RateDto, RatingSummaryDto, ReactDto,
    ReactionResponseDto,
};
use crate::features::comments::models::CommentTarget;
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Comment routes mounted under one parent collection (`/api/blogs` or `/api/events`)
#[derive(Clone)]
pub struct CommentScope {
    pub service: Arc<CommentService>,
    pub target: CommentTarget,
}

/// List comments, oldest first
#[utoipa::path(
    get,
    path = "/api/{target}/{id}/comments",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("id" = Uuid, Path, description = "Blog or event ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 404, description = "Blog or event not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(scope): State<CommentScope>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let viewer_id = viewer.as_ref().map(|u| u.user_id.as_str());
    let (rows, total) = scope
        .service
        .list(scope.target, id, viewer_id, &pagination)
        .await?;

    let comments = rows
        .into_iter()
        .map(|row| CommentResponseDto::from_row(row, viewer.as_ref()))
        .collect();
    Ok(Json(ApiResponse::paginated(comments, total)))
}

#[utoipa::path(
    post,
    path = "/api/{target}/{id}/comments",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("id" = Uuid, Path, description = "Blog or event ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Blog or event not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    State(scope): State<CommentScope>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let row = scope
        .service
        .create(&user, scope.target, id, &dto.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(CommentResponseDto::from_row(row, Some(&user))),
            None,
            None,
        )),
    ))
}

/// Average rating and count
#[utoipa::path(
    get,
    path = "/api/{target}/{id}/rating",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("id" = Uuid, Path, description = "Blog or event ID")
    ),
    responses(
        (status = 200, description = "Rating summary", body = ApiResponse<RatingSummaryDto>),
        (status = 404, description = "Blog or event not found")
    ),
    tag = "comments"
)]
pub async fn get_rating(
    State(scope): State<CommentScope>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RatingSummaryDto>>> {
    let summary = scope
        .service
        .rating_summary(scope.target, id, viewer.as_ref().map(|u| u.user_id.as_str()))
        .await?;
    Ok(Json(ApiResponse::success(Some(summary.into()), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/{target}/{id}/rating",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("id" = Uuid, Path, description = "Blog or event ID")
    ),
    request_body = RateDto,
    responses(
        (status = 200, description = "Rating saved", body = ApiResponse<RatingSummaryDto>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Blog or event not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rate(
    State(scope): State<CommentScope>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RateDto>,
) -> Result<Json<ApiResponse<RatingSummaryDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = scope
        .service
        .rate(&user, scope.target, id, dto.rating)
        .await?;
    Ok(Json(ApiResponse::success(Some(summary.into()), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{target}/{comment_id}",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author or a manager"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    State(service): State<Arc<CommentService>>,
    user: AuthenticatedUser,
    Path((target, comment_id)): Path<(CommentTarget, Uuid)>,
) -> Result<StatusCode> {
    service.delete(&user, target, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Like, dislike, or clear the caller's reaction with `null`
#[utoipa::path(
    put,
    path = "/api/comments/{target}/{comment_id}/reaction",
    params(
        ("target" = CommentTarget, Path, description = "`blogs` or `events`"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = ReactDto,
    responses(
        (status = 200, description = "Reaction saved", body = ApiResponse<ReactionResponseDto>),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn react_to_comment(
    State(service): State<Arc<CommentService>>,
    user: AuthenticatedUser,
    Path((target, comment_id)): Path<(CommentTarget, Uuid)>,
    AppJson(dto): AppJson<ReactDto>,
) -> Result<Json<ApiResponse<ReactionResponseDto>>> {
    let counts = service
        .react(&user, target, comment_id, dto.reaction)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ReactionResponseDto {
            comment_id,
            likes: counts.likes,
            dislikes: counts.dislikes,
            my_reaction: dto.reaction,
        }),
        None,
        None,
    )))
}
