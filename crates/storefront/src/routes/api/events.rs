//! Live product event stream.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;

/// Stream product events as Server-Sent Events.
///
/// GET /api/products/events
///
/// Each event is named after the change (`productAdded`, `productDeleted`)
/// and carries the JSON event as data. A listener that falls behind skips
/// the events it missed and keeps going.
pub async fn subscribe(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.events().subscribe();
    info!("Live product listener connected");

    let events = stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let data = serde_json::to_string(&event).unwrap_or_else(|_| {
                        r#"{"event":"error","data":"Failed to serialize event"}"#.to_string()
                    });
                    yield Ok(Event::default().event(event.name()).data(data));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live product listener lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}
