use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::session::User;
use crate::store::Store;
use crate::{AppError, AppResult};

use super::sync::{Author, QuestionRecord, question_path, room_path};

fn patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub async fn end_room<S: Store + ?Sized>(store: &S, room_id: &str) -> AppResult<()> {
    let ended_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(anyhow::Error::from)?;
    store
        .update(&room_path(room_id), patch(json!({"endedAt": ended_at})))
        .await
}

/// Append a question authored by the signed-in user. The author is copied
/// onto the question at creation and never re-synced, so refusing a missing
/// user happens before any store call.
pub async fn post_question<S: Store + ?Sized>(
    store: &S,
    user: Option<&User>,
    room_id: &str,
    content: String,
) -> AppResult<String> {
    let user = user.ok_or(AppError::SignedOut)?;

    let record = QuestionRecord {
        content,
        author: Author {
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        },
        is_answered: false,
        is_highlighted: false,
    };

    store
        .push(&room_path(room_id).child("questions"), serde_json::to_value(&record)?)
        .await
}

pub async fn delete_question<S: Store + ?Sized>(
    store: &S,
    room_id: &str,
    question_id: &str,
) -> AppResult<()> {
    store.remove(&question_path(room_id, question_id)).await
}

pub async fn mark_answered<S: Store + ?Sized>(
    store: &S,
    room_id: &str,
    question_id: &str,
) -> AppResult<()> {
    store
        .update(&question_path(room_id, question_id), patch(json!({"isAnswered": true})))
        .await
}

/// Read the current flag, write its negation. Two admins toggling at once
/// race on the read and last write wins.
pub async fn toggle_highlight<S: Store + ?Sized>(
    store: &S,
    room_id: &str,
    question_id: &str,
) -> AppResult<()> {
    let path = question_path(room_id, question_id);
    let highlighted = store
        .get(&path)
        .await?
        .as_ref()
        .and_then(|question| question.get("isHighlighted"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    store
        .update(&path, patch(json!({"isHighlighted": !highlighted})))
        .await
}
