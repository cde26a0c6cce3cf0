// catalog_admin/src/catalog/store.rs
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::feed::ProductFeed;
use super::upload::ImageUploader;
use crate::backend::{bounded, DocumentStore};
use crate::config::AdminConfig;
use crate::error::{BackendError, CatalogError, CatalogResult, DeleteStage};
use crate::model::{ImageRef, Product, ProductFields, ProductId};

/// Thin adapter over the product collection of a [`DocumentStore`].
///
/// Deletes also go through the [`ImageUploader`], since a product and its
/// stored image are released together.
#[derive(Clone)]
pub struct CatalogStore {
  documents: Arc<dyn DocumentStore>,
  images: ImageUploader,
  collection: String,
  timeout: Duration,
}

impl CatalogStore {
  pub fn new(documents: Arc<dyn DocumentStore>, images: ImageUploader, config: &AdminConfig) -> Self {
    Self {
      documents,
      images,
      collection: config.collection.clone(),
      timeout: config.backend_timeout,
    }
  }

  pub fn collection(&self) -> &str {
    &self.collection
  }

  pub fn images(&self) -> &ImageUploader {
    &self.images
  }

  /// Subscribes to the whole collection.
  #[instrument(name = "CatalogStore::observe_all", skip(self), fields(collection = %self.collection))]
  pub async fn observe_all(&self) -> CatalogResult<ProductFeed> {
    let subscription = bounded("subscribe", self.timeout, self.documents.subscribe(&self.collection))
      .await
      .map_err(|source| {
        error!(error = %source, "Could not subscribe to product collection.");
        CatalogError::Subscribe {
          collection: self.collection.clone(),
          source,
        }
      })?;
    Ok(ProductFeed::new(self.collection.clone(), subscription))
  }

  /// Stores a new product under a freshly generated id and returns that id.
  ///
  /// A failed write is not rolled back; the backend may or may not hold it.
  #[instrument(name = "CatalogStore::create", skip(self, fields), fields(name = %fields.name))]
  pub async fn create(&self, fields: ProductFields, image_ref: ImageRef) -> CatalogResult<ProductId> {
    reject_invalid(&fields)?;
    let product_id = ProductId::new(self.documents.generate_id());
    let product = Product::new(product_id.clone(), fields, image_ref);
    let body = serde_json::Value::Object(product.to_document_body()?);

    bounded(
      "set_document",
      self.timeout,
      self.documents.set(&self.collection, product_id.as_str(), body),
    )
    .await
    .map_err(|source| self.write_failed(&product_id, source))?;

    info!(%product_id, "Product created.");
    Ok(product_id)
  }

  /// Overwrites every field of the product stored at `product_id`.
  /// The id inside `record` is ignored; `product_id` is authoritative.
  #[instrument(name = "CatalogStore::update", skip(self, record))]
  pub async fn update(&self, product_id: &ProductId, record: &Product) -> CatalogResult<()> {
    reject_invalid(&record.fields)?;
    let mut record = record.clone();
    if record.product_id != *product_id {
      warn!(record_id = %record.product_id, "Record id differs from target id; keeping target id.");
      record.product_id = product_id.clone();
    }
    let fields = record.to_document_body()?;

    bounded(
      "update_document",
      self.timeout,
      self.documents.update(&self.collection, product_id.as_str(), fields),
    )
    .await
    .map_err(|source| self.write_failed(product_id, source))?;

    info!("Product updated.");
    Ok(())
  }

  /// Deletes the stored image (when there is one) and then the document.
  ///
  /// The document is only deleted once the image is gone, so a product never
  /// points at a missing image because of this call. An image that is already
  /// missing counts as removed. Either failure is reported as
  /// `StoreDeleteOrphan` with the stage that failed.
  #[instrument(name = "CatalogStore::delete", skip(self))]
  pub async fn delete(&self, product_id: &ProductId, image_ref: &ImageRef) -> CatalogResult<()> {
    let image_removed = !image_ref.is_empty();
    if image_removed {
      match self.images.delete(image_ref).await {
        Ok(()) => {}
        // Uploads share `folder/filename`, so another product's delete may have taken it.
        Err(BackendError::NotFound(path)) => {
          warn!(%path, "Image already absent from storage; deleting the document anyway.");
        }
        Err(source) => {
          error!(error = %source, "Image removal failed; product document kept.");
          return Err(CatalogError::StoreDeleteOrphan {
            product_id: product_id.clone(),
            stage: DeleteStage::ImageRemoval,
            source,
          });
        }
      }
    }

    let result = bounded(
      "delete_document",
      self.timeout,
      self.documents.delete(&self.collection, product_id.as_str()),
    )
    .await;

    match result {
      Ok(()) => {
        info!("Product deleted.");
        Ok(())
      }
      Err(source) if image_removed => {
        error!(error = %source, "Document removal failed after its image was removed.");
        Err(CatalogError::StoreDeleteOrphan {
          product_id: product_id.clone(),
          stage: DeleteStage::DocumentRemoval,
          source,
        })
      }
      Err(source) => Err(self.write_failed(product_id, source)),
    }
  }

  fn write_failed(&self, product_id: &ProductId, source: BackendError) -> CatalogError {
    error!(%product_id, error = %source, "Product write failed.");
    CatalogError::StoreWrite {
      product_id: product_id.clone(),
      source,
    }
  }
}

fn reject_invalid(fields: &ProductFields) -> CatalogResult<()> {
  fields.validate().map_err(|errors| {
    warn!(missing = %errors, "Product record rejected before write.");
    CatalogError::Validation(errors)
  })
}
