//! Comments, reactions and ratings on blogs and events.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/{blogs,events}/{id}/comments` | Comment thread (public) |
//! | POST | `/api/{blogs,events}/{id}/comments` | Add a comment |
//! | GET | `/api/{blogs,events}/{id}/rating` | Rating summary (public) |
//! | PUT | `/api/{blogs,events}/{id}/rating` | Rate 1-5 |
//! | DELETE | `/api/comments/{target}/{comment_id}` | Delete own comment (managers: any) |
//! | PUT | `/api/comments/{target}/{comment_id}/reaction` | Like, dislike or clear |
//!
//! Blogs accept comments and ratings only while published.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
