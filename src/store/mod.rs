//! Replicated document store seam.
//!
//! The core only ever talks to a [`SyncStore`]: it subscribes to full subtree
//! snapshots and issues independent per-path writes and deletes. Ordering and
//! conflict handling (last write wins per path) belong to the store.

pub mod document;
pub mod memory;
pub mod path;
pub mod storage;

pub use memory::DocumentStore;
pub use path::{Root, StorePath};
pub use storage::{load_document, save_document};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;

/// Full subtree at a path; `None` when nothing exists there
pub type Snapshot = Option<Value>;

/// One write of a command's fan-out
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set { path: StorePath, value: Value },
    Delete { path: StorePath },
}

impl Write {
    pub fn set(path: StorePath, value: Value) -> Self {
        Write::Set { path, value }
    }

    pub fn delete(path: StorePath) -> Self {
        Write::Delete { path }
    }

    pub fn path(&self) -> &StorePath {
        match self {
            Write::Set { path, .. } | Write::Delete { path } => path,
        }
    }
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Write::Set { path, .. } => write!(f, "set {}", path),
            Write::Delete { path } => write!(f, "delete {}", path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or its state is unusable
    Unavailable(String),
    /// The write was accepted in memory but could not be made durable
    Persist(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StoreError::Persist(msg) => write!(f, "Failed to persist store: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Stream of full snapshots at `path`, starting with the current one
    fn subscribe(&self, path: &StorePath) -> BoxStream<'static, Snapshot>;

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError>;
}
