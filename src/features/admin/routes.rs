use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;
use crate::modules::realtime::ChangeFeed;

/// Admin routes (all require the admin role)
pub fn routes(admin_service: Arc<AdminService>, feed: ChangeFeed) -> Router {
    let users = Router::new()
        .route(
            "/api/admin/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/admin/users/{id}", delete(handlers::delete_user))
        .route("/api/admin/users/{id}/role", put(handlers::update_user_role))
        .with_state(admin_service);

    let changes = Router::new()
        .route("/api/admin/changes", get(handlers::stream_changes))
        .with_state(feed);

    users.merge(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::features::notifications::services::notification_service::tests::{
        service_with, RecordingMailer,
    };
    use crate::features::users::clients::logto::{IdentityDirectory, NewIdentity};
    use crate::features::users::services::RoleService;
    use crate::shared::test_helpers::{
        create_admin_user, create_user, create_writer_user, lazy_pool, with_user,
    };
    use crate::features::auth::model::AppRole;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDirectory {
        created: AtomicUsize,
    }

    #[async_trait]
    impl IdentityDirectory for CountingDirectory {
        async fn create_user(&self, _identity: &NewIdentity) -> Result<String> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok("new-user".to_string())
        }

        async fn delete_user(&self, _user_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn router(directory: Arc<CountingDirectory>) -> Router {
        let pool = lazy_pool();
        let notifications = Arc::new(service_with(Arc::new(RecordingMailer::default()), None));
        let service = Arc::new(AdminService::new(
            pool.clone(),
            directory,
            Arc::new(RoleService::new(pool)),
            notifications,
            ChangeFeed::new(),
        ));
        routes(service, ChangeFeed::new())
    }

    #[tokio::test]
    async fn test_admin_routes_reject_managers() {
        let app = with_user(router(Arc::default()), create_user(AppRole::Manager));
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/admin/users")
            .await
            .assert_status_forbidden();
        server
            .delete("/api/admin/users/someone")
            .await
            .assert_status_forbidden();
        server
            .get("/api/admin/changes")
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_change_feed_requires_authentication() {
        let server = TestServer::new(router(Arc::default())).unwrap();
        server
            .get("/api/admin/changes")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_create_user_validates_before_calling_identity_provider() {
        let directory = Arc::new(CountingDirectory::default());
        let app = with_user(router(directory.clone()), create_admin_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/admin/users")
            .json(&json!({ "email": "not-an-email", "password": "longenough" }))
            .await
            .assert_status_bad_request();

        assert_eq!(directory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let admin = create_admin_user();
        let app = with_user(router(Arc::default()), admin.clone());
        let server = TestServer::new(app).unwrap();

        server
            .delete(&format!("/api/admin/users/{}", admin.user_id))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_writer_cannot_change_roles() {
        let app = with_user(router(Arc::default()), create_writer_user());
        let server = TestServer::new(app).unwrap();

        server
            .put("/api/admin/users/someone/role")
            .json(&json!({ "role": "admin" }))
            .await
            .assert_status_forbidden();
    }
}
