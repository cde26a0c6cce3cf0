// catalog_admin/src/catalog/upload.rs
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::backend::{bounded, ObjectStorage, UploadHandle};
use crate::error::{BackendError, CatalogError, CatalogResult};
use crate::model::{ImagePayload, ImageRef};

/// Persists product images and hands out durable references to them.
#[derive(Clone)]
pub struct ImageUploader {
  storage: Arc<dyn ObjectStorage>,
  timeout: Duration,
}

impl ImageUploader {
  pub fn new(storage: Arc<dyn ObjectStorage>, timeout: Duration) -> Self {
    Self { storage, timeout }
  }

  /// `folder/filename`. The filename must be a single, non-empty path segment.
  pub fn object_path(folder: &str, filename: &str) -> Result<String, BackendError> {
    let filename = filename.trim();
    if filename.is_empty() || filename.contains('/') || filename == "." || filename == ".." {
      return Err(BackendError::Rejected(format!("'{}' is not a valid file name", filename)));
    }
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
      Ok(filename.to_string())
    } else {
      Ok(format!("{}/{}", folder, filename))
    }
  }

  /// Writes `payload` at `folder/filename`, replacing whatever was there.
  #[instrument(name = "ImageUploader::upload", skip(self, payload))]
  pub async fn upload(&self, filename: &str, payload: &ImagePayload, folder: &str) -> CatalogResult<UploadHandle> {
    let path = Self::object_path(folder, filename).map_err(|source| CatalogError::Upload {
      path: format!("{}/{}", folder, filename),
      source,
    })?;
    let blob = payload.to_blob().map_err(|reason| CatalogError::Upload {
      path: path.clone(),
      source: BackendError::Rejected(reason),
    })?;

    let handle = bounded("upload", self.timeout, self.storage.upload(&path, blob))
      .await
      .map_err(|source| {
        error!(%path, error = %source, "Image upload failed.");
        CatalogError::Upload {
          path: path.clone(),
          source,
        }
      })?;
    info!(%path, size = handle.size, "Image uploaded.");
    Ok(handle)
  }

  /// Durable URL for an object written by [`ImageUploader::upload`].
  #[instrument(name = "ImageUploader::resolve_url", skip(self), fields(path = %handle.path))]
  pub async fn resolve_url(&self, handle: &UploadHandle) -> CatalogResult<ImageRef> {
    let url = bounded("download_url", self.timeout, self.storage.download_url(&handle.path))
      .await
      .map_err(|source| {
        // The object stays behind in storage with nothing pointing at it.
        error!(path = %handle.path, error = %source, "URL resolution failed; uploaded object is orphaned.");
        CatalogError::UrlResolution {
          path: handle.path.clone(),
          source,
        }
      })?;
    Ok(ImageRef::new(url))
  }

  /// Removes the object behind `reference`. Failures are returned, never swallowed.
  #[instrument(name = "ImageUploader::delete", skip(self), fields(reference = %reference))]
  pub async fn delete(&self, reference: &ImageRef) -> Result<(), BackendError> {
    if reference.is_empty() {
      return Err(BackendError::Rejected("empty image reference".to_string()));
    }
    let path = self.storage.path_for_reference(reference.as_str())?;
    bounded("delete_object", self.timeout, self.storage.delete(&path)).await?;
    info!(%path, "Image deleted.");
    Ok(())
  }
}
