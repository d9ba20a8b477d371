mod admin;
pub mod join;
pub mod mutate;
pub mod new;
mod room;
pub mod sync;
mod ws;

use axum::Router;
use axum::routing::{delete, get, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(new::new_room))
        .route("/join", post(join::join_room))
        .route("/{room_id}", get(room::room))
        .route("/{room_id}/ws", get(ws::room_ws))
        .route("/{room_id}/end", post(admin::end_room))
        .route("/{room_id}/questions", post(room::post_question))
        .route("/{room_id}/questions/{question_id}", delete(admin::delete_question))
        .route("/{room_id}/questions/{question_id}/answered", post(admin::mark_answered))
        .route("/{room_id}/questions/{question_id}/highlight", post(admin::toggle_highlight))
}
