//! Image uploads (avatars, event gallery, blog images).
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/files/upload` | Upload an image (multipart) |
//! | DELETE | `/api/files` | Delete an uploaded image by URL |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
