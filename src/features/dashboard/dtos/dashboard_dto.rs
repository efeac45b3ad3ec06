use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::blogs::models::BlogStatus;
use crate::features::dashboard::models::{
    ActivityCountsRow, RecentBlogRow, StatusCountsRow, UserCountsRow,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BlogStatusCountsDto {
    pub draft: i64,
    pub pending_approval: i64,
    pub approved: i64,
    pub rejected: i64,
    pub published: i64,
    pub total: i64,
}

impl From<StatusCountsRow> for BlogStatusCountsDto {
    fn from(row: StatusCountsRow) -> Self {
        Self {
            total: row.draft + row.pending_approval + row.approved + row.rejected + row.published,
            draft: row.draft,
            pending_approval: row.pending_approval,
            approved: row.approved,
            rejected: row.rejected,
            published: row.published,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentBlogDto {
    pub id: Uuid,
    pub title: String,
    pub title_tamil: String,
    pub status: BlogStatus,
    pub rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecentBlogRow> for RecentBlogDto {
    fn from(row: RecentBlogRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            title_tamil: row.title_tamil,
            status: row.status,
            rejection_reason: row.rejection_reason,
            updated_at: row.updated_at,
        }
    }
}

/// The signed-in writer's own numbers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WriterDashboardDto {
    pub blogs: BlogStatusCountsDto,
    /// Views across published blogs
    pub total_views: i64,
    pub comments_received: i64,
    #[schema(value_type = Option<String>, example = "4.5")]
    pub average_rating: Option<Decimal>,
    pub rating_count: i64,
    /// Upcoming events the writer registered for
    pub upcoming_registrations: i64,
    /// Most recently edited blogs
    pub recent_blogs: Vec<RecentBlogDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCountsDto {
    pub total: i64,
    pub readers: i64,
    pub writers: i64,
    pub managers: i64,
    pub admins: i64,
    pub new_this_month: i64,
}

impl From<UserCountsRow> for UserCountsDto {
    fn from(row: UserCountsRow) -> Self {
        Self {
            total: row.total,
            readers: row.readers,
            writers: row.writers,
            managers: row.managers,
            admins: row.admins,
            new_this_month: row.new_this_month,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityCountsDto {
    pub events_total: i64,
    pub events_upcoming: i64,
    pub registrations: i64,
    pub comments: i64,
    pub ratings: i64,
    pub files: i64,
}

impl From<ActivityCountsRow> for ActivityCountsDto {
    fn from(row: ActivityCountsRow) -> Self {
        Self {
            events_total: row.events_total,
            events_upcoming: row.events_upcoming,
            registrations: row.registrations,
            comments: row.comments,
            ratings: row.ratings,
            files: row.files,
        }
    }
}

/// Site-wide statistics for administrators
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsDto {
    pub users: UserCountsDto,
    pub blogs: BlogStatusCountsDto,
    pub activity: ActivityCountsDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_total() {
        let dto = BlogStatusCountsDto::from(StatusCountsRow {
            draft: 2,
            pending_approval: 1,
            approved: 0,
            rejected: 3,
            published: 4,
        });
        assert_eq!(dto.total, 10);
        assert_eq!(dto.rejected, 3);
    }
}
