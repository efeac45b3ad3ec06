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
use crate::features::auth::guards::RequireReviewer;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::dtos::{
    CreateEventDto, EventQueryParams, EventResponseDto, RegistrantDto, UpdateEventDto,
};
use crate::features::events::services::EventService;
use crate::shared::types::ApiResponse;

/// List events
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventQueryParams),
    responses(
        (status = 200, description = "Events", body = ApiResponse<Vec<EventResponseDto>>)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(service): State<Arc<EventService>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<ApiResponse<Vec<EventResponseDto>>>> {
    let (events, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::paginated(
        events.into_iter().map(Into::into).collect(),
        total,
    )))
}

/// Get event details; signed-in callers also see whether they are registered
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event", body = ApiResponse<EventResponseDto>),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(service): State<Arc<EventService>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service.get(id).await?;
    let is_registered = match viewer {
        Some(user) => Some(service.is_registered(id, &user.user_id).await?),
        None => None,
    };

    Ok(Json(ApiResponse::success(
        Some(EventResponseDto::from_event(event, is_registered)),
        None,
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Manager access required")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_event(
    State(service): State<Arc<EventService>>,
    RequireReviewer(user): RequireReviewer,
    AppJson(dto): AppJson<CreateEventDto>,
) -> Result<(StatusCode, Json<ApiResponse<EventResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let event = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(event.into()),
            Some("Event created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Manager access required"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Limit below current registrations")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_event(
    State(service): State<Arc<EventService>>,
    RequireReviewer(_user): RequireReviewer,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateEventDto>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let event = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(event.into()), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Manager access required"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_event(
    State(service): State<Arc<EventService>>,
    RequireReviewer(_user): RequireReviewer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register the caller for an event
#[utoipa::path(
    post,
    path = "/api/events/{id}/registration",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registered", body = ApiResponse<EventResponseDto>),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Already registered, event full or in the past")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn register_for_event(
    State(service): State<Arc<EventService>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service.register(&user, id).await?;
    Ok(Json(ApiResponse::success(
        Some(EventResponseDto::from_event(event, Some(true))),
        Some("Registered for event".to_string()),
        None,
    )))
}

/// Cancel the caller's registration
#[utoipa::path(
    delete,
    path = "/api/events/{id}/registration",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registration cancelled", body = ApiResponse<EventResponseDto>),
        (status = 404, description = "Event not found or not registered")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unregister_from_event(
    State(service): State<Arc<EventService>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service.unregister(&user, id).await?;
    Ok(Json(ApiResponse::success(
        Some(EventResponseDto::from_event(event, Some(false))),
        Some("Registration cancelled".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/registrations",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registered participants", body = ApiResponse<Vec<RegistrantDto>>),
        (status = 403, description = "Manager access required"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_registrations(
    State(service): State<Arc<EventService>>,
    RequireReviewer(_user): RequireReviewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RegistrantDto>>>> {
    let registrants: Vec<RegistrantDto> = service
        .registrants(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = registrants.len() as i64;

    Ok(Json(ApiResponse::paginated(registrants, total)))
}
