// catalog_admin/src/lib.rs

//! catalog_admin: product catalog administration over a hosted document
//! store and object storage.
//!
//! The crate has two halves:
//!  - [`CatalogStore`]: a thin adapter over the product collection. It offers a
//!    live [`ProductFeed`] of every product, plus create/update/delete by id.
//!    Deletes release the product's stored image first.
//!  - [`FormController`]: the create/edit form. It holds the draft and the
//!    selected product and runs submits as a sequenced [`Workflow`]:
//!    upload the image → resolve its URL → write the record.
//!
//! The backend is reached only through the [`DocumentStore`] and
//! [`ObjectStorage`] traits. [`backend::memory`] provides in-process versions.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod workflow;

pub use crate::backend::memory::{InMemoryDocumentStore, InMemoryObjectStorage};
pub use crate::backend::{Document, DocumentStore, ObjectStorage, Snapshot, Subscription, UploadHandle};
pub use crate::catalog::{CatalogStore, ImageUploader, ProductFeed};
pub use crate::config::AdminConfig;
pub use crate::error::{BackendError, CatalogError, CatalogResult, ConfigError, DeleteStage, WorkflowError};
pub use crate::form::{FormController, FormMode, FormState, Notification, NotificationLevel};
pub use crate::model::{
  Blob, Field, FormDraft, ImagePayload, ImageRef, LocalImage, Product, ProductFields, ProductId, ValidationErrors,
};
pub use crate::workflow::{ContextData, StepControl, Workflow, WorkflowOutcome};

/*
    Typical wiring:
    1. Pick collaborators: `Arc<dyn DocumentStore>` and `Arc<dyn ObjectStorage>`.
    2. `let images = ImageUploader::new(storage, config.backend_timeout);`
    3. `let catalog = CatalogStore::new(documents, images, &config);`
    4. The list view holds `catalog.observe_all().await?` and re-renders on every
       `feed.changed().await`. It cancels the feed when the view goes away.
    5. The form holds `FormController::new(catalog, &config)` and forwards user
       actions: `open_create`, `open_edit`, `edit_draft`, `pick_local_image`,
       `submit`, `request_delete`.
*/
