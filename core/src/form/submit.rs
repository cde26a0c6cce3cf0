// catalog_admin/src/form/submit.rs

//! The submit workflow: optional image upload, URL resolution, then the
//! create or update of the product record.

use std::sync::Arc;
use tracing::info;

use super::state::FormMode;
use crate::backend::UploadHandle;
use crate::catalog::CatalogStore;
use crate::error::CatalogError;
use crate::model::{ImageRef, LocalImage, Product, ProductFields, ProductId};
use crate::workflow::{ContextData, StepControl, Workflow};

pub const UPLOAD_IMAGE: &str = "upload_image";
pub const RESOLVE_URL: &str = "resolve_url";
pub const PERSIST_RECORD: &str = "persist_record";

/// Everything one submit run reads and produces.
pub struct SubmitCtxData {
  pub catalog: CatalogStore,
  pub image_folder: String,
  pub mode: FormMode,
  pub fields: ProductFields,
  pub pending_image: Option<LocalImage>,
  pub upload: Option<UploadHandle>,
  pub resolved_image: Option<ImageRef>,
  pub saved_id: Option<ProductId>,
}

impl SubmitCtxData {
  pub fn new(
    catalog: CatalogStore,
    image_folder: String,
    mode: FormMode,
    fields: ProductFields,
    pending_image: Option<LocalImage>,
  ) -> Self {
    Self {
      catalog,
      image_folder,
      mode,
      fields,
      pending_image,
      upload: None,
      resolved_image: None,
      saved_id: None,
    }
  }

  /// The image reference the record should carry: a freshly resolved one, or
  /// the stored one when editing without a new pick.
  fn image_for_record(&self) -> ImageRef {
    match (&self.resolved_image, &self.mode) {
      (Some(resolved), _) => resolved.clone(),
      (None, FormMode::Existing { image_ref, .. }) => image_ref.clone(),
      (None, FormMode::New) => ImageRef::none(),
    }
  }
}

pub fn build_submit_workflow() -> Workflow<SubmitCtxData, CatalogError> {
  let mut w = Workflow::<SubmitCtxData, CatalogError>::new(&[
    (
      UPLOAD_IMAGE,
      false,
      Some(Arc::new(|ctx: ContextData<SubmitCtxData>| ctx.read().pending_image.is_none())),
    ),
    (
      RESOLVE_URL,
      false,
      Some(Arc::new(|ctx: ContextData<SubmitCtxData>| ctx.read().upload.is_none())),
    ),
    (PERSIST_RECORD, false, None),
  ]);

  w.on_step(UPLOAD_IMAGE, |ctx: ContextData<SubmitCtxData>| async move {
    let (catalog, folder, image) = {
      let guard = ctx.read();
      (guard.catalog.clone(), guard.image_folder.clone(), guard.pending_image.clone())
    };
    let Some(image) = image else {
      return Ok::<_, CatalogError>(StepControl::Continue);
    };

    let handle = catalog
      .images()
      .upload(&image.filename, &image.payload, &folder)
      .await?;
    ctx.write().upload = Some(handle);
    Ok::<_, CatalogError>(StepControl::Continue)
  });

  w.on_step(RESOLVE_URL, |ctx: ContextData<SubmitCtxData>| async move {
    let (catalog, handle) = {
      let guard = ctx.read();
      (guard.catalog.clone(), guard.upload.clone())
    };
    let Some(handle) = handle else {
      return Ok::<_, CatalogError>(StepControl::Continue);
    };

    let image_ref = catalog.images().resolve_url(&handle).await?;
    info!(path = %handle.path, "Image URL resolved.");
    ctx.write().resolved_image = Some(image_ref);
    Ok::<_, CatalogError>(StepControl::Continue)
  });

  w.on_step(PERSIST_RECORD, |ctx: ContextData<SubmitCtxData>| async move {
    let (catalog, mode, fields, image_ref) = {
      let guard = ctx.read();
      (
        guard.catalog.clone(),
        guard.mode.clone(),
        guard.fields.clone(),
        guard.image_for_record(),
      )
    };

    let saved_id = match mode {
      FormMode::New => catalog.create(fields, image_ref).await?,
      FormMode::Existing { product_id, .. } => {
        let record = Product::new(product_id.clone(), fields, image_ref);
        catalog.update(&product_id, &record).await?;
        product_id
      }
    };
    ctx.write().saved_id = Some(saved_id);
    Ok::<_, CatalogError>(StepControl::Continue)
  });

  w
}
