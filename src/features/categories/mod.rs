//! Blog categories with English and Tamil names.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | Active categories (public) |
//! | GET | `/api/categories/{slug}` | Category by slug (public) |
//! | POST | `/api/categories` | Create a category (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
