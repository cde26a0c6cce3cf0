// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use catalog_admin::{
  AdminConfig, BackendError, Blob, CatalogStore, DocumentStore, FormController, ImageUploader, InMemoryDocumentStore,
  InMemoryObjectStorage, LocalImage, ObjectStorage, ProductFields, Subscription, UploadHandle,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::Level;

// --- Tracing, once per test binary ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const STORAGE_BASE: &str = "memory://test-bucket";
pub const COLLECTION: &str = "producto";

// "PNG\r\n" base64-encoded.
pub const PNG_DATA_URL: &str = "data:image/png;base64,UE5HDQo=";

pub fn widget_fields() -> ProductFields {
  ProductFields {
    name: "Widget".to_string(),
    price: 9.99,
    description: "A widget".to_string(),
    category: "tools".to_string(),
    alt_text: "widget photo".to_string(),
  }
}

pub fn widget_image() -> LocalImage {
  LocalImage::data_url("widget.png", PNG_DATA_URL)
}

pub fn test_config() -> AdminConfig {
  AdminConfig {
    collection: COLLECTION.to_string(),
    image_folder: "productos".to_string(),
    backend_timeout: Duration::from_millis(200),
    storage_base_url: STORAGE_BASE.to_string(),
  }
}

// --- Call log shared by both recording collaborators ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Upload(String),
  DownloadUrl(String),
  DeleteObject(String),
  SetDoc(String),
  UpdateDoc(String),
  DeleteDoc(String),
  Subscribe(String),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Object storage that logs every call and can be told to fail or block.
pub struct RecordingStorage {
  pub inner: InMemoryObjectStorage,
  log: CallLog,
  pub fail_upload: AtomicBool,
  pub fail_download_url: AtomicBool,
  pub fail_delete: AtomicBool,
  upload_gate: Mutex<Option<Arc<Notify>>>,
  delete_gate: Mutex<Option<Arc<Notify>>>,
}

impl RecordingStorage {
  pub fn new(log: CallLog) -> Self {
    Self {
      inner: InMemoryObjectStorage::new(STORAGE_BASE),
      log,
      fail_upload: AtomicBool::new(false),
      fail_download_url: AtomicBool::new(false),
      fail_delete: AtomicBool::new(false),
      upload_gate: Mutex::new(None),
      delete_gate: Mutex::new(None),
    }
  }

  /// Uploads wait until the returned `Notify` is signalled.
  pub fn gate_uploads(&self) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *self.upload_gate.lock() = Some(gate.clone());
    gate
  }

  pub fn gate_deletes(&self) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *self.delete_gate.lock() = Some(gate.clone());
    gate
  }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
  async fn upload(&self, path: &str, blob: Blob) -> Result<UploadHandle, BackendError> {
    self.log.lock().push(Call::Upload(path.to_string()));
    let gate = self.upload_gate.lock().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    if self.fail_upload.load(Ordering::SeqCst) {
      return Err(BackendError::Unavailable("quota exceeded".to_string()));
    }
    self.inner.upload(path, blob).await
  }

  async fn download_url(&self, path: &str) -> Result<String, BackendError> {
    self.log.lock().push(Call::DownloadUrl(path.to_string()));
    if self.fail_download_url.load(Ordering::SeqCst) {
      return Err(BackendError::Unavailable("url service down".to_string()));
    }
    self.inner.download_url(path).await
  }

  async fn delete(&self, path: &str) -> Result<(), BackendError> {
    self.log.lock().push(Call::DeleteObject(path.to_string()));
    let gate = self.delete_gate.lock().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    if self.fail_delete.load(Ordering::SeqCst) {
      return Err(BackendError::Rejected("permission denied".to_string()));
    }
    self.inner.delete(path).await
  }

  fn path_for_reference(&self, reference: &str) -> Result<String, BackendError> {
    self.inner.path_for_reference(reference)
  }
}

/// Document store that logs every call and can be told to fail or hang.
pub struct RecordingDocuments {
  pub inner: InMemoryDocumentStore,
  log: CallLog,
  pub fail_set: AtomicBool,
  pub fail_update: AtomicBool,
  pub fail_delete: AtomicBool,
  pub hang_set: AtomicBool,
}

impl RecordingDocuments {
  pub fn new(log: CallLog) -> Self {
    Self {
      inner: InMemoryDocumentStore::new(),
      log,
      fail_set: AtomicBool::new(false),
      fail_update: AtomicBool::new(false),
      fail_delete: AtomicBool::new(false),
      hang_set: AtomicBool::new(false),
    }
  }
}

#[async_trait]
impl DocumentStore for RecordingDocuments {
  fn generate_id(&self) -> String {
    self.inner.generate_id()
  }

  async fn set(&self, collection: &str, id: &str, body: serde_json::Value) -> Result<(), BackendError> {
    self.log.lock().push(Call::SetDoc(id.to_string()));
    if self.hang_set.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    if self.fail_set.load(Ordering::SeqCst) {
      return Err(BackendError::Unavailable("write quota exhausted".to_string()));
    }
    self.inner.set(collection, id, body).await
  }

  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: serde_json::Map<String, serde_json::Value>,
  ) -> Result<(), BackendError> {
    self.log.lock().push(Call::UpdateDoc(id.to_string()));
    if self.fail_update.load(Ordering::SeqCst) {
      return Err(BackendError::Unavailable("write quota exhausted".to_string()));
    }
    self.inner.update(collection, id, fields).await
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
    self.log.lock().push(Call::DeleteDoc(id.to_string()));
    if self.fail_delete.load(Ordering::SeqCst) {
      return Err(BackendError::Unavailable("delete rejected".to_string()));
    }
    self.inner.delete(collection, id).await
  }

  async fn subscribe(&self, collection: &str) -> Result<Subscription, BackendError> {
    self.log.lock().push(Call::Subscribe(collection.to_string()));
    self.inner.subscribe(collection).await
  }
}

/// Recording collaborators wired into a store and a controller.
pub struct Harness {
  pub log: CallLog,
  pub documents: Arc<RecordingDocuments>,
  pub storage: Arc<RecordingStorage>,
  pub config: AdminConfig,
  pub catalog: CatalogStore,
  pub controller: FormController,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_config(test_config())
  }

  pub fn with_config(config: AdminConfig) -> Self {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let documents = Arc::new(RecordingDocuments::new(log.clone()));
    let storage = Arc::new(RecordingStorage::new(log.clone()));
    let images = ImageUploader::new(storage.clone(), config.backend_timeout);
    let catalog = CatalogStore::new(documents.clone(), images, &config);
    let controller = FormController::new(catalog.clone(), &config);
    Self {
      log,
      documents,
      storage,
      config,
      catalog,
      controller,
    }
  }

  pub fn calls(&self) -> Vec<Call> {
    self.log.lock().clone()
  }

  pub fn clear_calls(&self) {
    self.log.lock().clear();
  }

  /// Stored document body for `id`, straight from the in-memory collection.
  pub fn stored(&self, id: &str) -> Option<serde_json::Value> {
    self.documents.inner.get(COLLECTION, id)
  }
}
