use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::store::{NodePath, Snapshot, Store};

pub fn room_path(room_id: &str) -> NodePath {
    NodePath::parse("rooms").child(room_id)
}

pub fn question_path(room_id: &str, question_id: &str) -> NodePath {
    room_path(room_id).child("questions").child(question_id)
}

/// What a room view renders: the title plus the question map flattened into
/// a list ordered by key, i.e. by creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomView {
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub content: String,
    pub author: Author,
    pub is_answered: bool,
    pub is_highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub avatar_url: String,
}

/// A question as stored, without its key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub content: String,
    pub author: Author,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Derive the view from a raw room snapshot. Total: a missing room, missing
/// question map or missing title all fall back to empty, and entries that do
/// not parse as questions are skipped. The same snapshot always derives the
/// same view.
pub fn flatten_room(snapshot: &Snapshot) -> RoomView {
    let room = snapshot.as_ref().and_then(Value::as_object);

    let title = room
        .and_then(|fields| fields.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();

    let questions = room
        .and_then(|fields| fields.get("questions"))
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| {
                    let record: QuestionRecord = serde_json::from_value(value.clone()).ok()?;
                    Some(Question {
                        id: key.clone(),
                        content: record.content,
                        author: record.author,
                        is_answered: record.is_answered,
                        is_highlighted: record.is_highlighted,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    RoomView { title, questions }
}

/// Live subscription to one room: re-derives the view on every snapshot the
/// store delivers. Dropping the feed detaches the subscription.
pub struct RoomFeed {
    rx: watch::Receiver<Snapshot>,
}

impl RoomFeed {
    pub fn attach<S: Store + ?Sized>(store: &S, room_id: &str) -> RoomFeed {
        RoomFeed {
            rx: store.watch(&room_path(room_id)),
        }
    }

    /// The next derived view. Resolves immediately with the current state on
    /// a fresh feed; `None` once the store is gone.
    pub async fn next(&mut self) -> Option<RoomView> {
        self.rx.changed().await.ok()?;
        let snapshot = self.rx.borrow_and_update().clone();
        Some(flatten_room(&snapshot))
    }
}
