mod db;
mod path;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::AppResult;

pub use db::RealtimeDb;
pub use path::NodePath;

/// Full state of a subtree; `None` means the path does not exist.
pub type Snapshot = Option<Value>;

/// The realtime document tree. Paths address nested JSON objects; writes
/// into not-yet-existing paths create the intermediate nodes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, path: &NodePath) -> AppResult<Snapshot>;

    /// Merge `patch` into the object at `path`. A `null` entry removes
    /// that key.
    async fn update(&self, path: &NodePath, patch: Map<String, Value>) -> AppResult<()>;

    /// Remove the subtree at `path`. Removing a missing path is a no-op.
    async fn remove(&self, path: &NodePath) -> AppResult<()>;

    /// Append `value` under `path` with a store-generated key, returned to
    /// the caller. Keys sort by creation time.
    async fn push(&self, path: &NodePath, value: Value) -> AppResult<String>;

    /// Subscribe to the subtree at `path`. The receiver fires once
    /// immediately with the current snapshot, then on every change under
    /// that path, until it is dropped. Rapid changes may coalesce into a
    /// single observed snapshot.
    fn watch(&self, path: &NodePath) -> watch::Receiver<Snapshot>;
}
