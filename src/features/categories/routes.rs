use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public category listing
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{slug}", get(handlers::get_category))
        .with_state(service)
}

/// Category administration
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", post(handlers::create_category))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_admin_user, create_writer_user, lazy_pool, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<CategoryService> {
        Arc::new(CategoryService::new(lazy_pool(), ChangeFeed::new()))
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let server = TestServer::new(with_user(routes(service()), create_writer_user())).unwrap();

        server
            .post("/api/categories")
            .json(&json!({ "name": "Poetry" }))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_create_rejects_unusable_slug() {
        let server = TestServer::new(with_user(routes(service()), create_admin_user())).unwrap();

        server
            .post("/api/categories")
            .json(&json!({ "name": "கவிதை" }))
            .await
            .assert_status_bad_request();
    }
}
