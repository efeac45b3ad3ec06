//! User administration and the change feed stream.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/users` | List users with roles |
//! | POST | `/api/admin/users` | Create user (identity + profile + role) |
//! | DELETE | `/api/admin/users/{id}` | Delete user, role and profile |
//! | PUT | `/api/admin/users/{id}/role` | Assign role |
//! | GET | `/api/admin/changes` | Server-sent change events |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::AdminService;
