use crate::features::users::handlers;
use crate::features::users::services::{UserProfileService, WriterService};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Protected profile routes
pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route(
            "/api/me",
            get(handlers::get_profile).patch(handlers::update_profile),
        )
        .with_state(service)
}

/// Public writers directory
pub fn public_routes(service: Arc<WriterService>) -> Router {
    Router::new()
        .route("/api/writers", get(handlers::list_writers))
        .route("/api/writers/{id}", get(handlers::get_writer))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::services::notification_service::tests::{
        service_with, RecordingMailer,
    };
    use crate::modules::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_writer_user, lazy_pool, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    fn profile_service() -> Arc<UserProfileService> {
        let notifications = Arc::new(service_with(Arc::new(RecordingMailer::default()), None));
        Arc::new(UserProfileService::new(
            lazy_pool(),
            notifications,
            ChangeFeed::new(),
        ))
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let server = TestServer::new(routes(profile_service())).unwrap();
        server.get("/api/me").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_update_profile_validates_before_saving() {
        let app = with_user(routes(profile_service()), create_writer_user());
        let server = TestServer::new(app).unwrap();

        let response = server
            .patch("/api/me")
            .json(&json!({ "preferred_language": "de" }))
            .await;

        response.assert_status_bad_request();
    }
}
