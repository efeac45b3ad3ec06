use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{delete_file_by_url, upload_file};
use crate::features::files::services::FileService;

pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            // Leave room for multipart overhead
            post(upload_file).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/files", delete(delete_file_by_url))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::modules::storage::ObjectStore;
    use crate::shared::test_helpers::{create_writer_user, lazy_pool, with_user};
    use async_trait::async_trait;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    struct NullStore;

    #[async_trait]
    impl ObjectStore for NullStore {
        fn key_for(&self, path: &str) -> String {
            format!("public/{}", path)
        }

        fn url_for(&self, key: &str) -> String {
            format!("http://localhost:9000/natawo/{}", key)
        }

        async fn put(&self, _key: &str, _data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn server() -> TestServer {
        let service = Arc::new(FileService::new(lazy_pool(), Arc::new(NullStore)));
        TestServer::new(with_user(routes(service), create_writer_user())).unwrap()
    }

    #[tokio::test]
    async fn test_upload_requires_file() {
        let form = MultipartForm::new().add_text("purpose", "blog_image");

        server()
            .post("/api/files/upload")
            .multipart(form)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_purpose() {
        let form = MultipartForm::new()
            .add_text("purpose", "resume")
            .add_part(
                "file",
                Part::bytes(vec![1, 2, 3])
                    .file_name("cv.png")
                    .mime_type("image/png"),
            );

        server()
            .post("/api/files/upload")
            .multipart(form)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_upload_rejects_documents() {
        let form = MultipartForm::new()
            .add_text("purpose", "event_image")
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.7".to_vec())
                    .file_name("flyer.pdf")
                    .mime_type("application/pdf"),
            );

        server()
            .post("/api/files/upload")
            .multipart(form)
            .await
            .assert_status_bad_request();
    }
}
