use std::sync::Arc;

use axum::{Form, Json, debug_handler, extract::Path, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::store::{RealtimeDb, Store};
use crate::{AppError, AppResult, session};

use super::mutate;
use super::sync::{RoomView, flatten_room, room_path};

#[debug_handler]
pub(crate) async fn room(
    Path(room_id): Path<String>,
    State(db): State<Arc<RealtimeDb>>,
) -> AppResult<Json<RoomView>> {
    let Some(snapshot) = db.get(&room_path(&room_id)).await? else {
        return Err(AppError::RoomNotFound(room_id));
    };

    Ok(Json(flatten_room(&Some(snapshot))))
}

#[derive(Deserialize)]
pub(crate) struct AskQuery {
    content: String,
}

#[derive(Serialize)]
pub(crate) struct QuestionCreated {
    id: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_question(
    Path(room_id): Path<String>,
    State(db): State<Arc<RealtimeDb>>,
    session: Session,

    Form(AskQuery { content }): Form<AskQuery>,
) -> AppResult<Json<QuestionCreated>> {
    let user = session::current_user(&session).await?;
    let id = mutate::post_question(db.as_ref(), user.as_ref(), &room_id, content).await?;

    Ok(Json(QuestionCreated { id }))
}
