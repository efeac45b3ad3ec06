use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content that carries comments and ratings. Each target has its own
/// comment, reaction and rating tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommentTarget {
    Blogs,
    Events,
}

impl CommentTarget {
    pub fn parent_table(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "blogs",
            CommentTarget::Events => "events",
        }
    }

    pub fn parent_column(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "blog_id",
            CommentTarget::Events => "event_id",
        }
    }

    pub fn comments_table(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "blog_comments",
            CommentTarget::Events => "event_comments",
        }
    }

    pub fn reactions_table(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "blog_comment_reactions",
            CommentTarget::Events => "event_comment_reactions",
        }
    }

    pub fn ratings_table(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "blog_ratings",
            CommentTarget::Events => "event_ratings",
        }
    }

    /// Parent rows open for comments and ratings. Unpublished blogs are not.
    pub fn visible_parent_clause(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "status = 'published'",
            CommentTarget::Events => "TRUE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommentTarget::Blogs => "Blog",
            CommentTarget::Events => "Event",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_follow_target() {
        assert_eq!(CommentTarget::Blogs.comments_table(), "blog_comments");
        assert_eq!(CommentTarget::Events.reactions_table(), "event_comment_reactions");
        assert_eq!(CommentTarget::Events.parent_column(), "event_id");
    }

    #[test]
    fn test_target_from_path_segment() {
        let target: CommentTarget = serde_json::from_str("\"events\"").unwrap();
        assert_eq!(target, CommentTarget::Events);
        assert!(serde_json::from_str::<CommentTarget>("\"profiles\"").is_err());
    }
}
