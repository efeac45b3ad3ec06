//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify they have the required role.
//!
//! Role hierarchy (from highest to lowest):
//! - admin: user administration and everything below
//! - manager: reviews, publishes content and manages events
//! - writer: authors blogs
//! - reader: comments, rates and registers for events
//!
//! Each higher role includes all permissions of lower roles.

use crate::core::error::AppError;
use crate::features::auth::model::{AppRole, AuthenticatedUser};
use axum::{extract::FromRequestParts, http::request::Parts};

fn require_role(parts: &Parts, role: AppRole, message: &str) -> Result<AuthenticatedUser, AppError> {
    let user = parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

    if !user.has_role(role) {
        return Err(AppError::Forbidden(message.to_string()));
    }

    Ok(user.clone())
}

/// Guard for admin-only operations (user provisioning, role changes).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, AppRole::Admin, "Admin access required").map(RequireAdmin)
    }
}

/// Guard for review operations (approve, reject, publish) and event management.
///
/// Allows "manager" and "admin".
pub struct RequireReviewer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireReviewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, AppRole::Manager, "Manager access required").map(RequireReviewer)
    }
}

/// Guard for authoring operations.
///
/// Allows "writer", "manager" and "admin".
pub struct RequireWriter(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireWriter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, AppRole::Writer, "Writer access required").map(RequireWriter)
    }
}
