use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "reaction_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

/// Comment with author details, reaction counters and the viewer's reaction
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub my_reaction: Option<ReactionKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct RatingRow {
    pub average: Option<Decimal>,
    pub count: i64,
    pub my_rating: Option<i16>,
}
