//! Blog status state machine.
//!
//! Authors move their own blogs between draft, pending approval and
//! rejected; reviewers (managers and admins) approve, reject, publish and
//! unpublish. Every legal edge is listed in `TRANSITIONS`.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

use crate::features::auth::model::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "blog_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlogStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlogAction {
    Submit,
    Withdraw,
    Revise,
    Approve,
    Reject,
    Publish,
    Unpublish,
}

/// Who may perform a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The blog's author, holding at least the writer role
    Author,
    /// A manager or admin
    Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} a blog that is {from}")]
pub struct TransitionError {
    pub from: BlogStatus,
    pub action: BlogAction,
}

/// (from, action) → (to, actor)
const TRANSITIONS: &[(BlogStatus, BlogAction, BlogStatus, Actor)] = &[
    (BlogStatus::Draft, BlogAction::Submit, BlogStatus::PendingApproval, Actor::Author),
    (BlogStatus::Rejected, BlogAction::Submit, BlogStatus::PendingApproval, Actor::Author),
    (BlogStatus::PendingApproval, BlogAction::Withdraw, BlogStatus::Draft, Actor::Author),
    (BlogStatus::Rejected, BlogAction::Revise, BlogStatus::Draft, Actor::Author),
    (BlogStatus::PendingApproval, BlogAction::Approve, BlogStatus::Approved, Actor::Reviewer),
    (BlogStatus::PendingApproval, BlogAction::Reject, BlogStatus::Rejected, Actor::Reviewer),
    (BlogStatus::Approved, BlogAction::Reject, BlogStatus::Rejected, Actor::Reviewer),
    (BlogStatus::Approved, BlogAction::Publish, BlogStatus::Published, Actor::Reviewer),
    (BlogStatus::Published, BlogAction::Unpublish, BlogStatus::Approved, Actor::Reviewer),
];

impl BlogStatus {
    /// Target status of `action`, or an error if the table has no such edge
    pub fn apply(self, action: BlogAction) -> Result<BlogStatus, TransitionError> {
        TRANSITIONS
            .iter()
            .find(|(from, a, _, _)| *from == self && *a == action)
            .map(|(_, _, to, _)| *to)
            .ok_or(TransitionError { from: self, action })
    }

    /// Authors may change title, content and category only in these states
    pub fn is_editable(self) -> bool {
        matches!(self, BlogStatus::Draft | BlogStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::PendingApproval => "pending_approval",
            BlogStatus::Approved => "approved",
            BlogStatus::Rejected => "rejected",
            BlogStatus::Published => "published",
        }
    }
}

impl std::fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BlogAction {
    pub const ALL: [BlogAction; 7] = [
        BlogAction::Submit,
        BlogAction::Withdraw,
        BlogAction::Revise,
        BlogAction::Approve,
        BlogAction::Reject,
        BlogAction::Publish,
        BlogAction::Unpublish,
    ];

    pub fn actor(self) -> Actor {
        match self {
            BlogAction::Submit | BlogAction::Withdraw | BlogAction::Revise => Actor::Author,
            _ => Actor::Reviewer,
        }
    }

    pub fn requires_reason(self) -> bool {
        self == BlogAction::Reject
    }
}

impl std::fmt::Display for BlogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlogAction::Submit => "submit",
            BlogAction::Withdraw => "withdraw",
            BlogAction::Revise => "revise",
            BlogAction::Approve => "approve",
            BlogAction::Reject => "reject",
            BlogAction::Publish => "publish",
            BlogAction::Unpublish => "unpublish",
        };
        f.write_str(name)
    }
}

impl Actor {
    pub fn permits(self, user: &AuthenticatedUser, author_id: &str) -> bool {
        match self {
            Actor::Author => user.is_writer() && user.user_id == author_id,
            Actor::Reviewer => user.is_reviewer(),
        }
    }
}

/// Actions `user` may take on a blog in `status` written by `author_id`
pub fn allowed_actions(
    status: BlogStatus,
    user: Option<&AuthenticatedUser>,
    author_id: &str,
) -> Vec<BlogAction> {
    let Some(user) = user else {
        return Vec::new();
    };

    BlogAction::ALL
        .into_iter()
        .filter(|action| status.apply(*action).is_ok())
        .filter(|action| action.actor().permits(user, author_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AppRole;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_author_lifecycle() {
        let status = BlogStatus::Draft.apply(BlogAction::Submit).unwrap();
        assert_eq!(status, BlogStatus::PendingApproval);
        assert_eq!(
            status.apply(BlogAction::Withdraw).unwrap(),
            BlogStatus::Draft
        );
        assert_eq!(
            BlogStatus::Rejected.apply(BlogAction::Submit).unwrap(),
            BlogStatus::PendingApproval
        );
        assert_eq!(
            BlogStatus::Rejected.apply(BlogAction::Revise).unwrap(),
            BlogStatus::Draft
        );
    }

    #[test]
    fn test_review_lifecycle() {
        let approved = BlogStatus::PendingApproval
            .apply(BlogAction::Approve)
            .unwrap();
        let published = approved.apply(BlogAction::Publish).unwrap();
        assert_eq!(published, BlogStatus::Published);
        assert_eq!(
            published.apply(BlogAction::Unpublish).unwrap(),
            BlogStatus::Approved
        );
        assert_eq!(
            approved.apply(BlogAction::Reject).unwrap(),
            BlogStatus::Rejected
        );
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let err = BlogStatus::Draft.apply(BlogAction::Publish).unwrap_err();
        assert_eq!(err.from, BlogStatus::Draft);
        assert_eq!(err.to_string(), "Cannot publish a blog that is draft");

        assert!(BlogStatus::Published.apply(BlogAction::Reject).is_err());
        assert!(BlogStatus::PendingApproval.apply(BlogAction::Submit).is_err());
        assert!(BlogStatus::Draft.apply(BlogAction::Approve).is_err());
    }

    #[test]
    fn test_every_action_has_an_edge() {
        for action in BlogAction::ALL {
            assert!(TRANSITIONS.iter().any(|(_, a, _, _)| *a == action));
        }
    }

    #[test]
    fn test_only_draft_and_rejected_are_editable() {
        assert!(BlogStatus::Draft.is_editable());
        assert!(BlogStatus::Rejected.is_editable());
        assert!(!BlogStatus::PendingApproval.is_editable());
        assert!(!BlogStatus::Approved.is_editable());
        assert!(!BlogStatus::Published.is_editable());
    }

    #[test]
    fn test_review_actions_offered_only_to_reviewers() {
        let writer = create_user(AppRole::Writer);
        let manager = create_user(AppRole::Manager);

        let for_author = allowed_actions(BlogStatus::PendingApproval, Some(&writer), &writer.user_id);
        assert_eq!(for_author, vec![BlogAction::Withdraw]);

        let for_reviewer =
            allowed_actions(BlogStatus::PendingApproval, Some(&manager), &writer.user_id);
        assert_eq!(for_reviewer, vec![BlogAction::Approve, BlogAction::Reject]);

        let other_writer = AuthenticatedUser {
            user_id: "someone-else".to_string(),
            ..create_user(AppRole::Writer)
        };
        assert!(allowed_actions(BlogStatus::Draft, Some(&other_writer), &writer.user_id).is_empty());
        assert!(allowed_actions(BlogStatus::Approved, None, &writer.user_id).is_empty());
    }

    #[test]
    fn test_reader_cannot_submit_own_blog() {
        let reader = create_user(AppRole::Reader);
        assert!(!Actor::Author.permits(&reader, &reader.user_id));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&BlogStatus::PendingApproval).unwrap(),
            "\"pending_approval\""
        );
    }
}
