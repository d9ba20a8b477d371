use std::sync::Arc;

use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, debug_handler, extract::State};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::store::{RealtimeDb, Store};
use crate::{AppResult, session};

use super::sync::room_path;

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomQuery {
    title: String,
}

#[debug_handler]
pub(crate) async fn new_room(
    State(db): State<Arc<RealtimeDb>>,
    session: Session,

    Form(NewRoomQuery { title }): Form<NewRoomQuery>,
) -> AppResult<Response> {
    if session::current_user(&session).await?.is_none() {
        return Ok(Redirect::to("/login?return_url=/r/new").into_response());
    }

    let code = create_room(db.as_ref(), &title).await?;
    tracing::info!("room {code} created");

    Ok(Redirect::to(&format!("/r/{code}")).into_response())
}

/// Write a titled room document under a fresh code and return the code.
pub async fn create_room<S: Store + ?Sized>(store: &S, title: &str) -> AppResult<String> {
    loop {
        let code = room_code();
        if store.get(&room_path(&code)).await?.is_some() {
            continue;
        }

        let mut patch = serde_json::Map::new();
        patch.insert("title".to_owned(), json!(title));
        store.update(&room_path(&code), patch).await?;
        return Ok(code);
    }
}

/// The shareable identifier doubles as the room's path segment.
fn room_code() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::rng();
    (0..6)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
