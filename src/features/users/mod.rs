//! User profiles, roles and the writers directory.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/me` | Get profile; provisions profile + reader role on first access |
//! | PATCH | `/api/me` | Update profile fields |
//! | GET | `/api/writers` | Public writers directory |
//! | GET | `/api/writers/{id}` | Public writer profile |
//!
//! Identity provider user administration lives in [`clients::logto`].

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
