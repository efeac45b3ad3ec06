use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::guards::{RequireAdmin, RequireWriter};
use crate::features::dashboard::dtos::*;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Writer dashboard of the signed-in author
#[utoipa::path(
    get,
    path = "/api/dashboard/writer",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Writer dashboard", body = ApiResponse<WriterDashboardDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Writer access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_writer_dashboard(
    RequireWriter(user): RequireWriter,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<WriterDashboardDto>>, AppError> {
    let dashboard = service.writer_dashboard(&user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(dashboard), None, None)))
}

/// Site-wide statistics
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Admin statistics", body = ApiResponse<AdminStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_admin_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>, AppError> {
    let stats = service.admin_stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
