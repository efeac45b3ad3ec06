//! Writer dashboard and admin statistics.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/dashboard/writer` | Own blog counts, views, comments and ratings |
//! | GET | `/api/admin/stats` | Users, blogs and activity across the site |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::DashboardService;
