use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::comments::handlers::{self, CommentScope};
use crate::features::comments::models::CommentTarget;
use crate::features::comments::services::CommentService;

fn scoped(service: &Arc<CommentService>, target: CommentTarget) -> CommentScope {
    CommentScope {
        service: Arc::clone(service),
        target,
    }
}

/// Comment threads and rating summaries, readable without signing in
pub fn public_routes(service: Arc<CommentService>) -> Router {
    let blogs = Router::new()
        .route("/api/blogs/{id}/comments", get(handlers::list_comments))
        .route("/api/blogs/{id}/rating", get(handlers::get_rating))
        .with_state(scoped(&service, CommentTarget::Blogs));

    let events = Router::new()
        .route("/api/events/{id}/comments", get(handlers::list_comments))
        .route("/api/events/{id}/rating", get(handlers::get_rating))
        .with_state(scoped(&service, CommentTarget::Events));

    blogs.merge(events)
}

pub fn routes(service: Arc<CommentService>) -> Router {
    let blogs = Router::new()
        .route("/api/blogs/{id}/comments", post(handlers::create_comment))
        .route("/api/blogs/{id}/rating", put(handlers::rate))
        .with_state(scoped(&service, CommentTarget::Blogs));

    let events = Router::new()
        .route("/api/events/{id}/comments", post(handlers::create_comment))
        .route("/api/events/{id}/rating", put(handlers::rate))
        .with_state(scoped(&service, CommentTarget::Events));

    let comments = Router::new()
        .route(
            "/api/comments/{target}/{comment_id}",
            delete(handlers::delete_comment),
        )
        .route(
            "/api/comments/{target}/{comment_id}/reaction",
            put(handlers::react_to_comment),
        )
        .with_state(service);

    blogs.merge(events).merge(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_writer_user, lazy_pool, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    const BLOG_ID: &str = "5e0f1d2c-3b4a-4c5d-8e6f-7a8b9c0d1e2f";

    fn app() -> Router {
        let service = Arc::new(CommentService::new(lazy_pool(), ChangeFeed::new()));
        with_user(routes(service), create_writer_user())
    }

    #[tokio::test]
    async fn test_rating_out_of_range_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        server
            .put(&format!("/api/blogs/{}/rating", BLOG_ID))
            .json(&json!({ "rating": 6 }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        server
            .post(&format!("/api/events/{}/comments", BLOG_ID))
            .json(&json!({ "content": "" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_unknown_comment_target_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        server
            .delete(&format!("/api/comments/profiles/{}", BLOG_ID))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_commenting_requires_authentication() {
        let service = Arc::new(CommentService::new(lazy_pool(), ChangeFeed::new()));
        let server = TestServer::new(routes(service)).unwrap();

        server
            .post(&format!("/api/blogs/{}/comments", BLOG_ID))
            .json(&json!({ "content": "Lovely piece" }))
            .await
            .assert_status_unauthorized();
    }
}
