// catalog_admin/src/backend/memory.rs

//! Process-local implementations of the backend seams.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Document, DocumentStore, ObjectStorage, Snapshot, Subscription, UploadHandle};
use crate::error::BackendError;
use crate::model::Blob;

struct Collection {
  docs: HashMap<String, serde_json::Value>,
  feed: watch::Sender<Snapshot>,
  listeners: Arc<AtomicUsize>,
}

impl Collection {
  fn new() -> Self {
    let (feed, _) = watch::channel(Arc::new(Vec::new()));
    Self {
      docs: HashMap::new(),
      feed,
      listeners: Arc::new(AtomicUsize::new(0)),
    }
  }

  fn snapshot(&self) -> Snapshot {
    Arc::new(
      self
        .docs
        .iter()
        .map(|(id, body)| Document {
          id: id.clone(),
          body: body.clone(),
        })
        .collect(),
    )
  }

  // send_replace also succeeds while nobody is listening.
  fn publish(&self) {
    self.feed.send_replace(self.snapshot());
  }
}

/// Document collections held in memory, with live snapshot pushes.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
  collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Listeners currently attached to `collection`.
  pub fn active_listeners(&self, collection: &str) -> usize {
    self
      .collections
      .read()
      .get(collection)
      .map_or(0, |c| c.listeners.load(Ordering::SeqCst))
  }

  pub fn get(&self, collection: &str, id: &str) -> Option<serde_json::Value> {
    self.collections.read().get(collection).and_then(|c| c.docs.get(id).cloned())
  }

  pub fn len(&self, collection: &str) -> usize {
    self.collections.read().get(collection).map_or(0, |c| c.docs.len())
  }

  pub fn is_empty(&self, collection: &str) -> bool {
    self.len(collection) == 0
  }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
  fn generate_id(&self) -> String {
    Uuid::new_v4().simple().to_string()
  }

  #[instrument(name = "InMemoryDocumentStore::set", skip(self, body))]
  async fn set(&self, collection: &str, id: &str, body: serde_json::Value) -> Result<(), BackendError> {
    let mut collections = self.collections.write();
    let coll = collections.entry(collection.to_string()).or_insert_with(Collection::new);
    coll.docs.insert(id.to_string(), body);
    coll.publish();
    debug!("Document stored.");
    Ok(())
  }

  #[instrument(name = "InMemoryDocumentStore::update", skip(self, fields))]
  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: serde_json::Map<String, serde_json::Value>,
  ) -> Result<(), BackendError> {
    let mut collections = self.collections.write();
    let coll = collections
      .get_mut(collection)
      .ok_or_else(|| BackendError::NotFound(format!("{}/{}", collection, id)))?;
    let doc = coll
      .docs
      .get_mut(id)
      .ok_or_else(|| BackendError::NotFound(format!("{}/{}", collection, id)))?;
    match doc.as_object_mut() {
      Some(existing) => existing.extend(fields),
      None => *doc = serde_json::Value::Object(fields),
    }
    coll.publish();
    debug!("Document updated.");
    Ok(())
  }

  #[instrument(name = "InMemoryDocumentStore::delete", skip(self))]
  async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
    let mut collections = self.collections.write();
    if let Some(coll) = collections.get_mut(collection) {
      if coll.docs.remove(id).is_some() {
        coll.publish();
        debug!("Document deleted.");
      }
    }
    Ok(())
  }

  #[instrument(name = "InMemoryDocumentStore::subscribe", skip(self))]
  async fn subscribe(&self, collection: &str) -> Result<Subscription, BackendError> {
    let mut collections = self.collections.write();
    let coll = collections.entry(collection.to_string()).or_insert_with(Collection::new);
    let receiver = coll.feed.subscribe();
    let listeners = Arc::clone(&coll.listeners);
    listeners.fetch_add(1, Ordering::SeqCst);
    debug!(listeners = listeners.load(Ordering::SeqCst), "Listener attached.");
    Ok(Subscription::new(receiver, move || {
      listeners.fetch_sub(1, Ordering::SeqCst);
    }))
  }
}

/// Path-addressed blob storage held in memory. Download URLs have the form
/// `{base_url}/{path}`.
#[derive(Clone)]
pub struct InMemoryObjectStorage {
  base_url: String,
  objects: Arc<RwLock<HashMap<String, Blob>>>,
}

impl InMemoryObjectStorage {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      objects: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  pub fn get(&self, path: &str) -> Option<Blob> {
    self.objects.read().get(path).cloned()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.objects.read().contains_key(path)
  }

  pub fn len(&self) -> usize {
    self.objects.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
  #[instrument(name = "InMemoryObjectStorage::upload", skip(self, blob), fields(size = blob.bytes.len()))]
  async fn upload(&self, path: &str, blob: Blob) -> Result<UploadHandle, BackendError> {
    let handle = UploadHandle {
      path: path.to_string(),
      size: blob.bytes.len(),
      content_type: blob.content_type.clone(),
    };
    self.objects.write().insert(path.to_string(), blob);
    Ok(handle)
  }

  async fn download_url(&self, path: &str) -> Result<String, BackendError> {
    if !self.contains(path) {
      return Err(BackendError::NotFound(path.to_string()));
    }
    Ok(format!("{}/{}", self.base_url, path))
  }

  #[instrument(name = "InMemoryObjectStorage::delete", skip(self))]
  async fn delete(&self, path: &str) -> Result<(), BackendError> {
    match self.objects.write().remove(path) {
      Some(_) => Ok(()),
      None => Err(BackendError::NotFound(path.to_string())),
    }
  }

  fn path_for_reference(&self, reference: &str) -> Result<String, BackendError> {
    if let Some(path) = reference
      .strip_prefix(self.base_url.as_str())
      .and_then(|rest| rest.strip_prefix('/'))
    {
      return Ok(path.to_string());
    }
    if reference.contains("://") {
      return Err(BackendError::Rejected(format!(
        "'{}' does not belong to storage '{}'",
        reference, self.base_url
      )));
    }
    Ok(reference.trim_start_matches('/').to_string())
  }
}
