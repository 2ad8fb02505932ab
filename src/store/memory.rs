use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use super::document;
use super::storage::{load_document, save_document};
use super::{Snapshot, StoreError, StorePath, SyncStore};

/// In-process document store with live subscriptions.
///
/// Every subscribed path gets a watch channel that receives the full subtree
/// after each write touching it. When opened on a file, every write is
/// persisted atomically before subscribers are notified; a write that cannot
/// be persisted is not applied.
pub struct DocumentStore {
    inner: Mutex<Inner>,
    file: Option<PathBuf>,
}

struct Inner {
    tree: Value,
    channels: HashMap<StorePath, watch::Sender<Snapshot>>,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self::with_document(Value::Object(Map::new()))
    }

    pub fn with_document(tree: Value) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tree,
                channels: HashMap::new(),
            }),
            file: None,
        }
    }

    /// Open a file-backed store; a missing file starts an empty document
    pub fn open(path: &Path) -> Result<Self> {
        let tree = load_document(path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                tree,
                channels: HashMap::new(),
            }),
            file: Some(path.to_path_buf()),
        })
    }

    /// Copy of the whole document
    pub fn document(&self) -> Result<Value, StoreError> {
        Ok(self.lock()?.tree.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("document lock poisoned".to_string()))
    }

    fn apply<F>(&self, path: &StorePath, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Value),
    {
        let mut inner = self.lock()?;
        let mut next = inner.tree.clone();
        mutate(&mut next);

        if let Some(file) = &self.file {
            save_document(file, &next).map_err(|e| StoreError::Persist(format!("{:#}", e)))?;
        }
        inner.tree = next;
        debug!("Applied write at {}", path);

        let Inner { tree, channels } = &mut *inner;
        channels.retain(|watched, sender| {
            if sender.receiver_count() == 0 {
                return false;
            }
            let current = document::get(tree, &watched.segments()).cloned();
            sender.send_if_modified(|snapshot| {
                if *snapshot != current {
                    *snapshot = current;
                    true
                } else {
                    false
                }
            });
            true
        });
        Ok(())
    }
}

#[async_trait]
impl SyncStore for DocumentStore {
    fn subscribe(&self, path: &StorePath) -> BoxStream<'static, Snapshot> {
        let receiver = match self.lock() {
            Ok(mut inner) => {
                let live = inner
                    .channels
                    .get(path)
                    .filter(|sender| sender.receiver_count() > 0)
                    .map(watch::Sender::subscribe);
                match live {
                    Some(receiver) => receiver,
                    None => {
                        let current = document::get(&inner.tree, &path.segments()).cloned();
                        let (sender, receiver) = watch::channel(current);
                        inner.channels.insert(path.clone(), sender);
                        receiver
                    }
                }
            }
            Err(e) => {
                warn!("Cannot subscribe to {}: {}", path, e);
                return stream::empty().boxed();
            }
        };

        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let snapshot = receiver.borrow_and_update().clone();
            Some((snapshot, (receiver, false)))
        })
        .boxed()
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let segments = path.segments();
        self.apply(path, |tree| document::set(tree, &segments, value))
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        let segments = path.segments();
        self.apply(path, |tree| {
            document::remove(tree, &segments);
        })
    }
}
