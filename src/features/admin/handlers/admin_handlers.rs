use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::ApiResponse;

/// List users with their roles (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(AdminUserQueryParams),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<AdminUserQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let (items, total) = service.list_users(&params).await?;

    Ok(Json(ApiResponse::paginated(items, total)))
}

/// Create a user (identity account, profile and role)
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<AdminUserDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Email already registered"),
        (status = 502, description = "Identity provider error")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<AdminUserDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create_user(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("User created".to_string()),
            None,
        )),
    ))
}

/// Delete a user with their role and profile
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeleteUserResponseDto>),
        (status = 400, description = "Cannot delete own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found"),
        (status = 502, description = "Identity provider error")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteUserResponseDto>>> {
    service.delete_user(&admin, &id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteUserResponseDto { id, deleted: true }),
        Some("User deleted".to_string()),
        None,
    )))
}

/// Assign a role
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<AdminUserDto>),
        (status = 400, description = "Cannot demote own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateRoleDto>,
) -> Result<Json<ApiResponse<AdminUserDto>>> {
    let user = service.update_role(&admin, &id, dto.role).await?;

    Ok(Json(ApiResponse::success(
        Some(user),
        Some(format!("Role set to {}", dto.role)),
        None,
    )))
}
