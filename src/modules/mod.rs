//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services: object storage,
//! transactional mail, machine translation and the in-process change feed.

pub mod mail;
pub mod realtime;
pub mod storage;
pub mod translation;
