use crate::core::error::Result;
use crate::features::users::dtos::{WriterQueryParams, WriterResponseDto};
use crate::features::users::services::WriterService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/writers",
    params(WriterQueryParams),
    responses(
        (status = 200, description = "Writers directory", body = ApiResponse<Vec<WriterResponseDto>>)
    ),
    tag = "writers"
)]
pub async fn list_writers(
    State(service): State<Arc<WriterService>>,
    Query(params): Query<WriterQueryParams>,
) -> Result<Json<ApiResponse<Vec<WriterResponseDto>>>> {
    let (writers, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::paginated(writers, total)))
}

#[utoipa::path(
    get,
    path = "/api/writers/{id}",
    params(
        ("id" = String, Path, description = "Writer profile id")
    ),
    responses(
        (status = 200, description = "Writer profile", body = ApiResponse<WriterResponseDto>),
        (status = 404, description = "Writer not found")
    ),
    tag = "writers"
)]
pub async fn get_writer(
    State(service): State<Arc<WriterService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WriterResponseDto>>> {
    let writer = service.get(&id).await?;
    Ok(Json(ApiResponse::success(Some(writer), None, None)))
}
