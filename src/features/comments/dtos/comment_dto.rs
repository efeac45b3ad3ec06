use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::models::{CommentRow, RatingRow, ReactionKind};
use crate::shared::constants::MAX_COMMENT_LENGTH;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub my_reaction: Option<ReactionKind>,
    /// Authors delete their own comments; managers moderate all
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponseDto {
    pub fn from_row(row: CommentRow, viewer: Option<&AuthenticatedUser>) -> Self {
        let can_delete =
            viewer.is_some_and(|user| user.user_id == row.author_id || user.is_reviewer());
        Self {
            id: row.id,
            parent_id: row.parent_id,
            author_id: row.author_id,
            author_name: row.author_name,
            author_avatar_url: row.author_avatar_url,
            content: row.content,
            likes: row.likes,
            dislikes: row.dislikes,
            my_reaction: row.my_reaction,
            can_delete,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = MAX_COMMENT_LENGTH, message = "Comment must be 1-5000 characters"))]
    pub content: String,
}

/// `null` removes the caller's reaction
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReactDto {
    pub reaction: Option<ReactionKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReactionResponseDto {
    pub comment_id: Uuid,
    pub likes: i64,
    pub dislikes: i64,
    pub my_reaction: Option<ReactionKind>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingSummaryDto {
    /// Mean rating rounded to two places; absent without ratings
    #[schema(value_type = Option<String>, example = "4.25")]
    pub average: Option<Decimal>,
    pub count: i64,
    /// The caller's own rating
    pub my_rating: Option<i16>,
}

impl From<RatingRow> for RatingSummaryDto {
    fn from(row: RatingRow) -> Self {
        Self {
            average: row.average,
            count: row.count,
            my_rating: row.my_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AppRole;
    use crate::shared::test_helpers::create_user;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn row(author_id: &str) -> CommentRow {
        CommentRow {
            id: Uuid::new_v4(),
            parent_id: Uuid::new_v4(),
            author_id: author_id.to_string(),
            author_name: None,
            author_avatar_url: None,
            content: Sentence(3..8).fake(),
            likes: 2,
            dislikes: 0,
            my_reaction: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_delete() {
        let reader = create_user(AppRole::Reader);
        let manager = create_user(AppRole::Manager);

        assert!(CommentResponseDto::from_row(row(&reader.user_id), Some(&reader)).can_delete);
        assert!(!CommentResponseDto::from_row(row("someone-else"), Some(&reader)).can_delete);
        assert!(CommentResponseDto::from_row(row("someone-else"), Some(&manager)).can_delete);
        assert!(!CommentResponseDto::from_row(row("someone-else"), None).can_delete);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(RateDto { rating: 0 }.validate().is_err());
        assert!(RateDto { rating: 6 }.validate().is_err());
        assert!(RateDto { rating: 5 }.validate().is_ok());
    }

    #[test]
    fn test_reaction_can_be_cleared() {
        let dto: ReactDto = serde_json::from_str(r#"{"reaction":null}"#).unwrap();
        assert!(dto.reaction.is_none());
        let dto: ReactDto = serde_json::from_str(r#"{"reaction":"dislike"}"#).unwrap();
        assert_eq!(dto.reaction, Some(ReactionKind::Dislike));
    }
}
