use axum::{Json, debug_handler};
use serde::Serialize;
use tower_sessions::Session;

use crate::AppResult;
use crate::session::{self, User};

#[derive(Serialize)]
pub struct SessionInfo {
    pub user: Option<User>,
}

/// Who the caller currently is; the client gates posting and admin controls
/// on this.
#[debug_handler]
pub async fn index(session: Session) -> AppResult<Json<SessionInfo>> {
    Ok(Json(SessionInfo {
        user: session::current_user(&session).await?,
    }))
}
