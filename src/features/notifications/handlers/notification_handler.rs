use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::services::{NotificationService, Recipient};
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Notify the account owner that their password was changed
#[utoipa::path(
    post,
    path = "/api/me/password-changed",
    responses(
        (status = 202, description = "Notification queued"),
        (status = 400, description = "Account has no email address"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn password_changed(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<(StatusCode, Json<ApiResponse<()>>)> {
    let recipient = Recipient::new(user.email.as_deref(), user.name.as_deref())
        .ok_or_else(|| AppError::BadRequest("Account has no email address".to_string()))?;

    tokio::spawn(async move {
        service.send_password_changed(&recipient).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            None,
            Some("Notification queued".to_string()),
            None,
        )),
    ))
}
