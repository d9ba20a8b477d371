use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tokio::sync::watch;
use uuid::Uuid;

use crate::AppResult;

use super::{NodePath, Snapshot, Store};

/// In-process realtime document tree with SQLite write-through.
///
/// Mutations update the in-memory tree under a short-lived lock, persist the
/// enclosing top-level document, then push fresh snapshots to every watcher
/// whose path can see the change. Watch channels hold only the latest
/// snapshot, so consumers observe rapid mutations coalesced.
pub struct RealtimeDb {
    tree: RwLock<Value>,
    watchers: Mutex<Vec<Watcher>>,
    pool: Option<SqlitePool>,
}

struct Watcher {
    path: NodePath,
    tx: watch::Sender<Snapshot>,
}

impl RealtimeDb {
    /// An empty, unpersisted tree.
    pub fn memory() -> RealtimeDb {
        RealtimeDb {
            tree: RwLock::new(Value::Object(Map::new())),
            watchers: Mutex::new(Vec::new()),
            pool: None,
        }
    }

    /// Load the tree persisted in `pool`, creating the schema if needed.
    pub async fn open(pool: SqlitePool) -> AppResult<RealtimeDb> {
        sqlx::query("CREATE TABLE IF NOT EXISTS documents (path TEXT PRIMARY KEY, body TEXT NOT NULL)")
            .execute(&pool)
            .await?;

        let rows: Vec<(String, String)> = sqlx::query_as("SELECT path, body FROM documents")
            .fetch_all(&pool)
            .await?;

        let mut tree = Value::Object(Map::new());
        for (path, body) in rows {
            *node_entry(&mut tree, &NodePath::parse(&path)) = serde_json::from_str(&body)?;
        }

        Ok(RealtimeDb {
            tree: RwLock::new(tree),
            watchers: Mutex::new(Vec::new()),
            pool: Some(pool),
        })
    }

    /// Persist the document enclosing `path` and notify affected watchers.
    async fn commit(&self, path: &NodePath) -> AppResult<()> {
        let doc_path = path.truncated(2);
        let doc = {
            let tree = self.tree.read().unwrap();
            subtree(&tree, &doc_path).cloned()
        };

        if let Some(pool) = &self.pool {
            match &doc {
                Some(body) => {
                    sqlx::query("INSERT INTO documents (path, body) VALUES (?, ?) ON CONFLICT(path) DO UPDATE SET body=excluded.body")
                        .bind(doc_path.to_string())
                        .bind(serde_json::to_string(body)?)
                        .execute(pool)
                        .await?;
                }
                None => {
                    sqlx::query("DELETE FROM documents WHERE path=?")
                        .bind(doc_path.to_string())
                        .execute(pool)
                        .await?;
                }
            }
        }

        let tree = self.tree.read().unwrap();
        let mut watchers = self.watchers.lock().unwrap();
        watchers.retain(|w| w.tx.receiver_count() > 0);
        for watcher in watchers.iter().filter(|w| w.path.related(path)) {
            watcher.tx.send_replace(subtree(&tree, &watcher.path).cloned());
        }

        Ok(())
    }
}

#[async_trait]
impl Store for RealtimeDb {
    async fn get(&self, path: &NodePath) -> AppResult<Snapshot> {
        let tree = self.tree.read().unwrap();
        Ok(subtree(&tree, path).cloned())
    }

    async fn update(&self, path: &NodePath, patch: Map<String, Value>) -> AppResult<()> {
        {
            let mut tree = self.tree.write().unwrap();
            let node = node_entry(&mut tree, path);
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let fields = node.as_object_mut().unwrap();
            for (key, value) in patch {
                if value.is_null() {
                    fields.remove(&key);
                } else {
                    fields.insert(key, value);
                }
            }
        }

        self.commit(path).await
    }

    async fn remove(&self, path: &NodePath) -> AppResult<()> {
        let Some((parent, last)) = path.split_last() else {
            return Err("cannot remove the tree root".into());
        };

        let removed = {
            let mut tree = self.tree.write().unwrap();
            existing_mut(&mut tree, &parent)
                .and_then(Value::as_object_mut)
                .and_then(|fields| fields.remove(last))
                .is_some()
        };

        if removed {
            self.commit(path).await?;
        }
        Ok(())
    }

    async fn push(&self, path: &NodePath, value: Value) -> AppResult<String> {
        // v7 keys are time-ordered, so map iteration yields insertion order
        let key = Uuid::now_v7().to_string();
        let child = path.child(&key);
        {
            let mut tree = self.tree.write().unwrap();
            *node_entry(&mut tree, &child) = value;
        }

        self.commit(&child).await?;
        Ok(key)
    }

    fn watch(&self, path: &NodePath) -> watch::Receiver<Snapshot> {
        let snapshot = {
            let tree = self.tree.read().unwrap();
            subtree(&tree, path).cloned()
        };

        let (tx, mut rx) = watch::channel(snapshot);
        rx.mark_changed();
        self.watchers.lock().unwrap().push(Watcher {
            path: path.clone(),
            tx,
        });
        rx
    }
}

fn subtree<'a>(tree: &'a Value, path: &NodePath) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn existing_mut<'a>(tree: &'a mut Value, path: &NodePath) -> Option<&'a mut Value> {
    let mut node = tree;
    for segment in path.segments() {
        node = node.as_object_mut()?.get_mut(segment)?;
    }
    Some(node)
}

/// Walk to `path`, replacing scalars and creating missing objects on the way.
fn node_entry<'a>(tree: &'a mut Value, path: &NodePath) -> &'a mut Value {
    let mut node = tree;
    for segment in path.segments() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .unwrap()
            .entry(segment.clone())
            .or_insert(Value::Null);
    }
    node
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn update_writes_into_missing_paths() {
        let db = RealtimeDb::memory();
        let room = NodePath::parse("rooms/ab12cd");

        db.update(&room, patch(json!({"title": "rustlang"}))).await.unwrap();

        assert_eq!(db.get(&room).await.unwrap(), Some(json!({"title": "rustlang"})));
        assert_eq!(db.get(&NodePath::parse("rooms/nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_merges_and_null_removes() {
        let db = RealtimeDb::memory();
        let room = NodePath::parse("rooms/ab12cd");

        db.update(&room, patch(json!({"title": "rustlang"}))).await.unwrap();
        db.update(&room, patch(json!({"endedAt": "2026-01-01T00:00:00Z"}))).await.unwrap();
        assert_eq!(
            db.get(&room).await.unwrap(),
            Some(json!({"title": "rustlang", "endedAt": "2026-01-01T00:00:00Z"}))
        );

        db.update(&room, patch(json!({"endedAt": null}))).await.unwrap();
        assert_eq!(db.get(&room).await.unwrap(), Some(json!({"title": "rustlang"})));
    }

    #[tokio::test]
    async fn push_keys_sort_by_creation() {
        let db = RealtimeDb::memory();
        let questions = NodePath::parse("rooms/ab12cd/questions");

        let first = db.push(&questions, json!({"content": "1"})).await.unwrap();
        let second = db.push(&questions, json!({"content": "2"})).await.unwrap();
        let third = db.push(&questions, json!({"content": "3"})).await.unwrap();

        assert!(first < second && second < third);

        let map = db.get(&questions).await.unwrap().unwrap();
        let keys: Vec<&String> = map.as_object().unwrap().keys().collect();
        assert_eq!(keys, [&first, &second, &third]);
    }

    #[tokio::test]
    async fn remove_missing_is_a_noop() {
        let db = RealtimeDb::memory();
        let room = NodePath::parse("rooms/ab12cd");
        db.update(&room, patch(json!({"title": "rustlang"}))).await.unwrap();

        db.remove(&NodePath::parse("rooms/ab12cd/questions/ghost")).await.unwrap();

        assert_eq!(db.get(&room).await.unwrap(), Some(json!({"title": "rustlang"})));
    }

    #[tokio::test]
    async fn watch_fires_immediately_then_on_change() {
        let db = RealtimeDb::memory();
        let room = NodePath::parse("rooms/ab12cd");
        db.update(&room, patch(json!({"title": "rustlang"}))).await.unwrap();

        let mut rx = db.watch(&room);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(json!({"title": "rustlang"})));

        db.update(&room, patch(json!({"endedAt": "soon"}))).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            Some(json!({"title": "rustlang", "endedAt": "soon"}))
        );
    }

    #[tokio::test]
    async fn watch_sees_changes_below_its_path() {
        let db = RealtimeDb::memory();
        let room = NodePath::parse("rooms/ab12cd");

        let mut rx = db.watch(&room);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);

        db.push(&room.child("questions"), json!({"content": "hi"})).await.unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone().unwrap();
        assert_eq!(snapshot["questions"].as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reopening_reloads_persisted_documents() {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("askaway.db"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options.clone()).await.unwrap();

        let room = NodePath::parse("rooms/ab12cd");
        {
            let db = RealtimeDb::open(pool).await.unwrap();
            db.update(&room, patch(json!({"title": "rustlang"}))).await.unwrap();
            db.push(&room.child("questions"), json!({"content": "hi"})).await.unwrap();
        }

        let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
        let db = RealtimeDb::open(pool).await.unwrap();
        let snapshot = db.get(&room).await.unwrap().unwrap();
        assert_eq!(snapshot["title"], "rustlang");
        assert_eq!(snapshot["questions"].as_object().unwrap().len(), 1);
    }
}
