//! Mutation handlers for the administrator view. Gated on a signed-in
//! session only; room ownership is not checked.

use std::sync::Arc;

use axum::{debug_handler, extract::Path, extract::State};
use tower_sessions::Session;

use crate::store::RealtimeDb;
use crate::{AppResult, session};

use super::mutate;

#[debug_handler]
pub(crate) async fn end_room(
    Path(room_id): Path<String>,
    State(db): State<Arc<RealtimeDb>>,
    session: Session,
) -> AppResult<()> {
    session::require_user(&session).await?;
    mutate::end_room(db.as_ref(), &room_id).await?;
    tracing::info!("room {room_id} ended");
    Ok(())
}

#[debug_handler]
pub(crate) async fn delete_question(
    Path((room_id, question_id)): Path<(String, String)>,
    State(db): State<Arc<RealtimeDb>>,
    session: Session,
) -> AppResult<()> {
    session::require_user(&session).await?;
    mutate::delete_question(db.as_ref(), &room_id, &question_id).await
}

#[debug_handler]
pub(crate) async fn mark_answered(
    Path((room_id, question_id)): Path<(String, String)>,
    State(db): State<Arc<RealtimeDb>>,
    session: Session,
) -> AppResult<()> {
    session::require_user(&session).await?;
    mutate::mark_answered(db.as_ref(), &room_id, &question_id).await
}

#[debug_handler]
pub(crate) async fn toggle_highlight(
    Path((room_id, question_id)): Path<(String, String)>,
    State(db): State<Arc<RealtimeDb>>,
    session: Session,
) -> AppResult<()> {
    session::require_user(&session).await?;
    mutate::toggle_highlight(db.as_ref(), &room_id, &question_id).await
}
