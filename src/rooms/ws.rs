use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::debug_handler;
use futures_util::{SinkExt, StreamExt};

use crate::store::RealtimeDb;

use super::sync::RoomFeed;

/// Live feed of one room: every store snapshot is re-derived and pushed to
/// the socket as JSON. The first frame arrives immediately with the current
/// state. Closing the socket drops the feed and with it the subscription.
#[debug_handler]
pub(crate) async fn room_ws(
    Path(room_id): Path<String>,
    State(db): State<Arc<RealtimeDb>>,

    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let feed = RoomFeed::attach(db.as_ref(), &room_id);

    ws.on_upgrade(move |stream| stream_room(stream, feed))
}

async fn stream_room(stream: WebSocket, mut feed: RoomFeed) {
    let (mut sender, mut receiver) = stream.split();

    let mut push_task = tokio::spawn(async move {
        while let Some(view) = feed.next().await {
            let Ok(body) = serde_json::to_string(&view) else {
                break;
            };
            if sender.send(Message::Text(body.into())).await.is_err() {
                break;
            }
        }
    });

    // client frames carry nothing; the loop only notices the socket closing
    loop {
        tokio::select! {
            msg = receiver.next() => {
                if !matches!(msg, Some(Ok(_))) {
                    break;
                }
            }
            _ = &mut push_task => break,
        }
    }

    push_task.abort();
}
