use std::sync::Arc;

use axum::{Form, Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{RealtimeDb, Store};
use crate::{AppError, AppResult};

use super::sync::room_path;

#[derive(Deserialize)]
pub(crate) struct JoinQuery {
    room_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub title: String,
}

#[debug_handler]
pub(crate) async fn join_room(
    State(db): State<Arc<RealtimeDb>>,
    Form(JoinQuery { room_code }): Form<JoinQuery>,
) -> AppResult<Json<RoomSummary>> {
    Ok(Json(check_room(db.as_ref(), &room_code).await?))
}

/// One-shot check that a room exists and has not ended. Best effort: the
/// room can still end between this check and whatever the caller does next.
pub async fn check_room<S: Store + ?Sized>(store: &S, room_code: &str) -> AppResult<RoomSummary> {
    let Some(room) = store.get(&room_path(room_code)).await? else {
        return Err(AppError::RoomNotFound(room_code.to_owned()));
    };

    if room.get("endedAt").is_some_and(|ended| !ended.is_null()) {
        return Err(AppError::RoomClosed(room_code.to_owned()));
    }

    Ok(RoomSummary {
        id: room_code.to_owned(),
        title: room.get("title").and_then(Value::as_str).unwrap_or("").to_owned(),
    })
}
