pub mod comment;
pub mod target;

pub use comment::{CommentRow, RatingRow, ReactionCounts, ReactionKind};
pub use target::CommentTarget;
