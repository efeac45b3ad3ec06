use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationService;
use axum::{routing::post, Router};
use std::sync::Arc;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/me/password-changed", post(handlers::password_changed))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::notifications::services::notification_service::tests::{
        service_with, RecordingMailer,
    };
    use crate::shared::test_helpers::{create_writer_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_password_changed_is_accepted() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = with_user(
            routes(Arc::new(service_with(mailer, None))),
            create_writer_user(),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/me/password-changed").await;
        response.assert_status(StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_password_changed_without_email_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let user = AuthenticatedUser {
            email: None,
            ..create_writer_user()
        };
        let app = with_user(routes(Arc::new(service_with(mailer, None))), user);
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/me/password-changed").await;
        response.assert_status_bad_request();
    }
}
