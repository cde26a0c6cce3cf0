// catalog_admin/src/backend/mod.rs

//! Seams to the hosted backend: a document collection store and a
//! path-addressed object storage.
//!
//! Everything the catalog does against the outside world goes through
//! [`DocumentStore`] and [`ObjectStorage`]. The in-memory implementations in
//! [`memory`] back the demo and the test suite; a real deployment supplies
//! adapters over its provider's SDK.

pub mod memory;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::error::BackendError;
use crate::model::Blob;

/// One stored document: its key and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub body: serde_json::Value,
}

/// Full contents of a collection at one point in time. Order is whatever the
/// backend produced and must not be relied on.
pub type Snapshot = Arc<Vec<Document>>;

/// A live, push-updated view of one collection.
///
/// Dropping or cancelling the subscription runs the backend's teardown
/// exactly once; after that no further snapshots are delivered.
pub struct Subscription {
  receiver: watch::Receiver<Snapshot>,
  teardown: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
  pub fn new(receiver: watch::Receiver<Snapshot>, teardown: impl FnOnce() + Send + Sync + 'static) -> Self {
    Self {
      receiver,
      teardown: Some(Box::new(teardown)),
    }
  }

  /// The most recent snapshot.
  pub fn current(&self) -> Snapshot {
    self.receiver.borrow().clone()
  }

  /// Waits for the next pushed snapshot. `None` once the backend has closed
  /// the feed or the subscription was cancelled.
  pub async fn changed(&mut self) -> Option<Snapshot> {
    if self.teardown.is_none() {
      return None;
    }
    self.receiver.changed().await.ok()?;
    Some(self.receiver.borrow_and_update().clone())
  }

  pub fn is_active(&self) -> bool {
    self.teardown.is_some()
  }

  pub fn cancel(mut self) {
    self.release();
  }

  fn release(&mut self) {
    if let Some(teardown) = self.teardown.take() {
      teardown();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.release();
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.is_active())
      .finish()
  }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Fresh, unique document id, generated client-side.
  fn generate_id(&self) -> String;

  /// Creates (or replaces) the document at `id`.
  async fn set(&self, collection: &str, id: &str, body: serde_json::Value) -> Result<(), BackendError>;

  /// Overwrites the named fields of an existing document.
  /// Fails with `BackendError::NotFound` when `id` does not exist.
  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: serde_json::Map<String, serde_json::Value>,
  ) -> Result<(), BackendError>;

  async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError>;

  /// Starts listening to `collection`. Every change re-pushes the full snapshot.
  async fn subscribe(&self, collection: &str) -> Result<Subscription, BackendError>;
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle {
  pub path: String,
  pub size: usize,
  pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
  /// Writes `blob` at `path`, replacing any object already there.
  async fn upload(&self, path: &str, blob: Blob) -> Result<UploadHandle, BackendError>;

  /// A durable, publicly fetchable URL for the object at `path`.
  async fn download_url(&self, path: &str) -> Result<String, BackendError>;

  async fn delete(&self, path: &str) -> Result<(), BackendError>;

  /// Maps a URL previously returned by `download_url` (or a bare path) back
  /// to the storage path it names.
  fn path_for_reference(&self, reference: &str) -> Result<String, BackendError>;
}

/// Awaits `fut`, turning an expiry of `after` into `BackendError::TimedOut`.
pub(crate) async fn bounded<T>(
  operation: &'static str,
  after: Duration,
  fut: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
  match tokio::time::timeout(after, fut).await {
    Ok(result) => result,
    Err(_) => {
      tracing::warn!(operation, ?after, "Backend call timed out.");
      Err(BackendError::TimedOut { operation, after })
    }
  }
}
