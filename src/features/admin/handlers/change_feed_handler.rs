use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::features::auth::guards::RequireAdmin;
use crate::modules::realtime::{ChangeEvent, ChangeFeed};

/// Stream table changes (server-sent events)
///
/// Each `change` event carries a [`ChangeEvent`]. A `resync` event means
/// changes were dropped and listings should be re-fetched in full.
#[utoipa::path(
    get,
    path = "/api/admin/changes",
    responses(
        (status = 200, description = "Change stream", content_type = "text/event-stream", body = ChangeEvent),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn stream_changes(
    RequireAdmin(admin): RequireAdmin,
    State(feed): State<ChangeFeed>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Change feed subscriber {}", admin.user_id);

    let stream = BroadcastStream::new(feed.subscribe()).map(|received| {
        let event = match received {
            Ok(change) => to_sse(&change),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("Change feed subscriber lagged by {} events", skipped);
                Event::default().event("resync").data(skipped.to_string())
            }
        };
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_sse(change: &ChangeEvent) -> Event {
    Event::default()
        .event("change")
        .json_data(change)
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to encode change event: {}", e);
            Event::default().event("resync").data("0")
        })
}
