use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers::{self, BlogState};
use super::services::{AutosaveService, BlogService, TranslationService};

fn state(
    blogs: Arc<BlogService>,
    autosave: Arc<AutosaveService>,
    translation: Arc<TranslationService>,
) -> BlogState {
    BlogState {
        blogs,
        autosave,
        translation,
    }
}

/// Published blogs, readable without signing in
pub fn public_routes(
    blogs: Arc<BlogService>,
    autosave: Arc<AutosaveService>,
    translation: Arc<TranslationService>,
) -> Router {
    Router::new()
        .route("/api/blogs", get(handlers::list_published))
        .route("/api/blogs/{id}", get(handlers::get_published))
        .with_state(state(blogs, autosave, translation))
}

/// Authoring, autosave, translation and review routes
pub fn routes(
    blogs: Arc<BlogService>,
    autosave: Arc<AutosaveService>,
    translation: Arc<TranslationService>,
) -> Router {
    let authoring = Router::new()
        .route("/api/blogs", post(handlers::create_blog))
        .route("/api/blogs/mine", get(handlers::list_my_blogs))
        .route("/api/blogs/{id}", delete(handlers::delete_blog))
        .route("/api/blogs/{id}/edit", get(handlers::get_blog_for_edit))
        .route(
            "/api/blogs/{id}/draft",
            patch(handlers::autosave_draft).get(handlers::get_draft_status),
        )
        .route("/api/blogs/{id}/draft/flush", post(handlers::flush_draft))
        .route("/api/blogs/{id}/submit", post(handlers::submit_blog))
        .route("/api/blogs/{id}/withdraw", post(handlers::withdraw_blog))
        .route("/api/blogs/{id}/revise", post(handlers::revise_blog))
        .route("/api/blogs/{id}/translate", post(handlers::translate_blog))
        .route("/api/translate", post(handlers::translate_text));

    let review = Router::new()
        .route("/api/review/blogs", get(handlers::list_review_queue))
        .route("/api/review/blogs/{id}/approve", post(handlers::approve_blog))
        .route("/api/review/blogs/{id}/reject", post(handlers::reject_blog))
        .route("/api/review/blogs/{id}/publish", post(handlers::publish_blog))
        .route(
            "/api/review/blogs/{id}/unpublish",
            post(handlers::unpublish_blog),
        );

    authoring
        .merge(review)
        .with_state(state(blogs, autosave, translation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::{AppRole, AuthenticatedUser};
    use crate::features::blogs::services::autosave_service::tests::MemoryStore;
    use crate::features::notifications::services::notification_service::tests::{
        service_with, RecordingMailer,
    };
    use crate::modules::realtime::ChangeFeed;
    use crate::modules::translation::{TranslationError, Translator};
    use crate::shared::test_helpers::{create_user, create_writer_user, lazy_pool, with_user};
    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::json;
    use std::time::Duration;

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, TranslationError> {
            Ok(text.to_string())
        }
    }

    fn app(user: AuthenticatedUser) -> Router {
        let notifications = Arc::new(service_with(Arc::new(RecordingMailer::default()), None));
        let blogs = Arc::new(BlogService::new(
            lazy_pool(),
            ChangeFeed::new(),
            notifications,
        ));
        let autosave = Arc::new(AutosaveService::new(
            Arc::new(MemoryStore::default()),
            Duration::from_millis(1500),
        ));
        let translation = Arc::new(TranslationService::new(Arc::new(EchoTranslator)));
        with_user(routes(blogs, autosave, translation), user)
    }

    #[tokio::test]
    async fn test_submit_with_empty_content_is_rejected() {
        let server = TestServer::new(app(create_writer_user())).unwrap();

        let response = server
            .post("/api/blogs")
            .json(&json!({
                "title": "Monsoon Notes",
                "content": { "blocks": [{ "key": "a", "text": "  ", "type": "unstyled" }], "entityMap": {} },
                "submit": true
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"].as_str().unwrap_or_default().contains("Content is required"));
    }

    #[tokio::test]
    async fn test_readers_cannot_author() {
        let server = TestServer::new(app(create_user(AppRole::Reader))).unwrap();

        server
            .post("/api/blogs")
            .json(&json!({ "title": "Hello", "content": {} }))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_review_queue_requires_manager() {
        let server = TestServer::new(app(create_writer_user())).unwrap();

        server
            .get("/api/review/blogs")
            .await
            .assert_status_forbidden();
        server
            .post("/api/review/blogs/8d0c4c8e-2f7a-4a55-9d49-0d3c4f1f6a10/publish")
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let server = TestServer::new(app(create_user(AppRole::Manager))).unwrap();

        server
            .post("/api/review/blogs/8d0c4c8e-2f7a-4a55-9d49-0d3c4f1f6a10/reject")
            .json(&json!({ "reason": "   " }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_translate_text_requires_writer() {
        let server = TestServer::new(app(create_user(AppRole::Reader))).unwrap();

        server
            .post("/api/translate")
            .json(&json!({ "text": "vanakkam", "direction": "ta_to_en" }))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_translate_text() {
        let server = TestServer::new(app(create_writer_user())).unwrap();

        let response = server
            .post("/api/translate")
            .json(&json!({ "text": "vanakkam", "direction": "ta_to_en" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["translated_text"], "vanakkam");
    }
}
