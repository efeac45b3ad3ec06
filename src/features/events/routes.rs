use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::events::handlers;
use crate::features::events::services::EventService;

/// Public event listing
pub fn public_routes(service: Arc<EventService>) -> Router {
    Router::new()
        .route("/api/events", get(handlers::list_events))
        .route("/api/events/{id}", get(handlers::get_event))
        .with_state(service)
}

/// Event management (manager+) and registration (any signed-in user)
pub fn routes(service: Arc<EventService>) -> Router {
    Router::new()
        .route("/api/events", post(handlers::create_event))
        .route(
            "/api/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .route(
            "/api/events/{id}/registration",
            post(handlers::register_for_event).delete(handlers::unregister_from_event),
        )
        .route(
            "/api/events/{id}/registrations",
            get(handlers::list_registrations),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AppRole;
    use crate::modules::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_user, create_writer_user, lazy_pool, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    const EVENT_ID: &str = "0b9f3c52-7d1e-4f3a-9a55-3c2d9e8f1a20";

    fn service() -> Arc<EventService> {
        Arc::new(EventService::new(lazy_pool(), ChangeFeed::new()))
    }

    #[tokio::test]
    async fn test_event_management_requires_manager() {
        let server = TestServer::new(with_user(routes(service()), create_writer_user())).unwrap();

        server
            .post("/api/events")
            .json(&json!({ "title": "Launch", "event_date": "2026-12-01" }))
            .await
            .assert_status_forbidden();
        server
            .delete(&format!("/api/events/{}", EVENT_ID))
            .await
            .assert_status_forbidden();
        server
            .get(&format!("/api/events/{}/registrations", EVENT_ID))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_registration_requires_authentication() {
        let server = TestServer::new(routes(service())).unwrap();

        server
            .post(&format!("/api/events/{}/registration", EVENT_ID))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_create_event_validates_times() {
        let manager = create_user(AppRole::Manager);
        let server = TestServer::new(with_user(routes(service()), manager)).unwrap();

        server
            .post("/api/events")
            .json(&json!({
                "title": "Launch",
                "event_date": "2026-12-01",
                "start_time": "19:00:00",
                "end_time": "18:00:00"
            }))
            .await
            .assert_status_bad_request();
    }
}
