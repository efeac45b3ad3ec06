use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::auth::model::AppRole;

/// Database model for profile; `id` is the identity provider subject
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub bio: Option<String>,
    pub social_links: serde_json::Value,
    pub preferred_language: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile joined with role and published blog count for the writers directory
#[derive(Debug, Clone, FromRow)]
pub struct WriterRow {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub bio: Option<String>,
    pub social_links: serde_json::Value,
    pub city: Option<String>,
    pub country: Option<String>,
    pub role: AppRole,
    pub published_blogs: i64,
}
