//! Transactional notification emails.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/me/password-changed` | Confirm a password change to the account owner |
//!
//! Signup mails are sent when a profile is first provisioned and review
//! outcome mails when a reviewer approves, rejects or publishes a blog.

pub mod handlers;
pub mod routes;
pub mod services;
