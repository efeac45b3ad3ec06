use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub action: ChangeAction,
    pub id: String,
    pub at: DateTime<Utc>,
}

/// Broadcast of table changes. Lagging subscribers drop the oldest events.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    const CAPACITY: usize = 256;

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, table: &'static str, action: ChangeAction, id: impl ToString) {
        let event = ChangeEvent {
            table,
            action,
            id: id.to_string(),
            at: Utc::now(),
        };

        // No subscribers is not an error
        if self.sender.send(event).is_err() {
            tracing::trace!("No change feed subscribers for {}", table);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_changes() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish("blogs", ChangeAction::Update, "abc");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, "blogs");
        assert_eq!(event.action, ChangeAction::Update);
        assert_eq!(event.id, "abc");
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_oldest() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        for i in 0..ChangeFeed::CAPACITY + 2 {
            feed.publish("comments", ChangeAction::Insert, i);
        }

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(2))
        ));
        let next = tokio_test::assert_ok!(rx.try_recv());
        assert_eq!(next.id, "2");
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let feed = ChangeFeed::new();
        feed.publish("events", ChangeAction::Insert, 1);
    }
}
