use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::auth::model::AppRole;

/// Profile joined with its role, as listed for administrators
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub role: AppRole,
    pub blog_count: i64,
    pub created_at: DateTime<Utc>,
}

pub const ADMIN_USER_COLUMNS: &str = r#"
    p.id, p.email, p.full_name, p.avatar_url, p.level,
    COALESCE(r.role, 'reader'::app_role) AS role,
    (SELECT COUNT(*) FROM blogs b WHERE b.author_id = p.id) AS blog_count,
    p.created_at
"#;
