// catalog_admin/src/error.rs
use std::time::Duration;

use thiserror::Error;

use crate::model::{ProductId, ValidationErrors};

/// Failure reported by a backend collaborator (document store or object storage).
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("No such entry: {0}")]
  NotFound(String),

  #[error("Backend rejected the request: {0}")]
  Rejected(String),

  #[error("Backend unavailable: {0}")]
  Unavailable(String),

  #[error("'{operation}' did not complete within {after:?}")]
  TimedOut { operation: &'static str, after: Duration },

  #[error("Transport failure. Source: {0}")]
  Transport(#[source] anyhow::Error),
}

// Lets collaborator implementations use `?` on whatever their SDK returns.
impl From<anyhow::Error> for BackendError {
  fn from(err: anyhow::Error) -> Self {
    BackendError::Transport(err)
  }
}

/// Framework-level failures of the step workflow engine.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Workflow step '{step_name}' finished without producing {missing}")]
  MissingOutput { step_name: String, missing: &'static str },
}

/// Which half of a delete was reached before it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStage {
  /// Removing the stored image failed; the document was left untouched.
  ImageRemoval,
  /// The image is gone but the document still references it.
  DocumentRemoval,
}

impl std::fmt::Display for DeleteStage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DeleteStage::ImageRemoval => f.write_str("image removal"),
      DeleteStage::DocumentRemoval => f.write_str("document removal"),
    }
  }
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("Image upload to '{path}' failed. Source: {source}")]
  Upload {
    path: String,
    #[source]
    source: BackendError,
  },

  #[error("Could not resolve a download URL for '{path}'. Source: {source}")]
  UrlResolution {
    path: String,
    #[source]
    source: BackendError,
  },

  #[error("Write of product '{product_id}' failed. Source: {source}")]
  StoreWrite {
    product_id: ProductId,
    #[source]
    source: BackendError,
  },

  #[error("Delete of product '{product_id}' failed during {stage}; store and storage may disagree. Source: {source}")]
  StoreDeleteOrphan {
    product_id: ProductId,
    stage: DeleteStage,
    #[source]
    source: BackendError,
  },

  #[error("Could not subscribe to collection '{collection}'. Source: {source}")]
  Subscribe {
    collection: String,
    #[source]
    source: BackendError,
  },

  #[error("Document '{id}' is not a valid product. Source: {source}")]
  Decode {
    id: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Product '{product_id}' could not be encoded as a document. Source: {source}")]
  Encode {
    product_id: ProductId,
    #[source]
    source: serde_json::Error,
  },

  #[error("A submit is already in flight for this form")]
  SubmitInProgress,

  #[error("A delete is already in flight for product '{0}'")]
  DeleteInProgress(ProductId),

  #[error("'{operation}' is not allowed while the form is {state}")]
  InvalidState { operation: &'static str, state: &'static str },

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },
}

impl CatalogError {
  /// Text shown to the user when this error reaches the form boundary.
  pub fn user_message(&self) -> String {
    match self {
      CatalogError::Validation(errors) => format!("Please fill in: {}.", errors),
      CatalogError::Upload { source, .. } => format!("The image could not be uploaded: {}", source),
      CatalogError::UrlResolution { source, .. } => {
        format!("The image was uploaded but its link could not be obtained: {}", source)
      }
      CatalogError::StoreWrite { source, .. } => format!("The product could not be saved: {}", source),
      CatalogError::StoreDeleteOrphan { stage: DeleteStage::ImageRemoval, source, .. } => {
        format!("The product image could not be removed, so the product was kept: {}", source)
      }
      CatalogError::StoreDeleteOrphan { stage: DeleteStage::DocumentRemoval, source, .. } => {
        format!("The product image was removed but the product could not be deleted: {}", source)
      }
      CatalogError::SubmitInProgress => "The form is already being saved.".to_string(),
      CatalogError::DeleteInProgress(_) => "This product is already being deleted.".to_string(),
      other => format!("An unexpected error occurred: {}", other),
    }
  }
}

/// Problems loading [`crate::AdminConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Invalid value for '{var}': {message}")]
  Invalid { var: &'static str, message: String },
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
