//! Events and event registration.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/events` | Events filtered by `when` (upcoming, past or all; public) |
//! | GET | `/api/events/{id}` | Event details (public) |
//! | POST | `/api/events` | Create event (manager) |
//! | PUT | `/api/events/{id}` | Update event, gallery and tags (manager) |
//! | DELETE | `/api/events/{id}` | Delete event (manager) |
//! | POST | `/api/events/{id}/registration` | Register the caller |
//! | DELETE | `/api/events/{id}/registration` | Cancel the caller's registration |
//! | GET | `/api/events/{id}/registrations` | Registered participants (manager) |
//!
//! `current_participants` only changes inside the registration transaction,
//! which holds a row lock on the event.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
