use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::blogs::models::BlogStatus;

/// Blog counts per status
#[derive(Debug, Clone, Default, FromRow)]
pub struct StatusCountsRow {
    pub draft: i64,
    pub pending_approval: i64,
    pub approved: i64,
    pub rejected: i64,
    pub published: i64,
}

pub const STATUS_COUNT_COLUMNS: &str = r#"
    COUNT(*) FILTER (WHERE status = 'draft') AS draft,
    COUNT(*) FILTER (WHERE status = 'pending_approval') AS pending_approval,
    COUNT(*) FILTER (WHERE status = 'approved') AS approved,
    COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
    COUNT(*) FILTER (WHERE status = 'published') AS published
"#;

#[derive(Debug, Clone, FromRow)]
pub struct WriterEngagementRow {
    pub total_views: i64,
    pub comments_received: i64,
    pub average_rating: Option<Decimal>,
    pub rating_count: i64,
    pub upcoming_registrations: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecentBlogRow {
    pub id: Uuid,
    pub title: String,
    pub title_tamil: String,
    pub status: BlogStatus,
    pub rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserCountsRow {
    pub total: i64,
    pub readers: i64,
    pub writers: i64,
    pub managers: i64,
    pub admins: i64,
    pub new_this_month: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityCountsRow {
    pub events_total: i64,
    pub events_upcoming: i64,
    pub registrations: i64,
    pub comments: i64,
    pub ratings: i64,
    pub files: i64,
}
