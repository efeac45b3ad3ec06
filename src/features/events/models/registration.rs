use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Registration joined with the registrant's profile
#[derive(Debug, Clone, FromRow)]
pub struct RegistrantRow {
    pub event_id: Uuid,
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
