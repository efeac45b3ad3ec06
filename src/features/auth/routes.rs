use crate::features::auth::handlers;
use axum::{routing::get, Router};

/// Protected auth routes (require JWT authentication)
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handlers::get_me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_writer_user, with_user};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_me_requires_authentication() {
        let server = TestServer::new(protected_routes()).unwrap();
        let response = server.get("/api/auth/me").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_me_returns_role_and_capabilities() {
        let app = with_user(protected_routes(), create_writer_user());
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/auth/me").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["role"], "writer");
        assert_eq!(body["data"]["capabilities"]["can_write"], true);
        assert_eq!(body["data"]["capabilities"]["can_review"], false);
    }
}
