use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Protected dashboard routes
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/writer", get(handlers::get_writer_dashboard))
        .route("/api/admin/stats", get(handlers::get_admin_stats))
        .with_state(dashboard_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AppRole;
    use crate::shared::test_helpers::{create_user, create_writer_user, lazy_pool, with_user};
    use axum_test::TestServer;

    fn router() -> Router {
        routes(Arc::new(DashboardService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_writer_dashboard_rejects_readers() {
        let app = with_user(router(), create_user(AppRole::Reader));
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/dashboard/writer")
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_admin_stats_rejects_writers() {
        let app = with_user(router(), create_writer_user());
        let server = TestServer::new(app).unwrap();

        server.get("/api/admin/stats").await.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_dashboard_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/dashboard/writer")
            .await
            .assert_status_unauthorized();
    }
}
