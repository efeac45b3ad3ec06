//! Object storage for uploaded images
//!
//! MinIO/S3-compatible client behind the [`ObjectStore`] trait, with a small
//! SigV4 signer for the bucket policy call.

mod minio_client;
mod sigv4;

pub use minio_client::{MinIOClient, ObjectStore};
