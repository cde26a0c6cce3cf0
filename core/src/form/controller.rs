// catalog_admin/src/form/controller.rs
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::state::{FormMode, FormState, Notification};
use super::submit::{build_submit_workflow, SubmitCtxData, PERSIST_RECORD};
use crate::catalog::CatalogStore;
use crate::config::AdminConfig;
use crate::error::{CatalogError, CatalogResult, WorkflowError};
use crate::model::{FormDraft, LocalImage, Product, ProductId, ValidationErrors};
use crate::workflow::{ContextData, Workflow};

#[derive(Default)]
struct FormInner {
  state: FormState,
  draft: FormDraft,
  selected: Option<Product>,
  validation: Option<ValidationErrors>,
  notifications: VecDeque<Notification>,
  deleting: HashSet<ProductId>,
}

impl FormInner {
  fn notify_error(&mut self, err: &CatalogError) {
    self.notifications.push_back(Notification::error(err.user_message()));
  }

  fn reject(&self, operation: &'static str) -> CatalogError {
    warn!(operation, state = self.state.label(), "Form action rejected in current state.");
    CatalogError::InvalidState {
      operation,
      state: self.state.label(),
    }
  }
}

/// Owns the form draft and the selected record, and turns user actions into
/// catalog calls.
///
/// Every method takes `&self`, so the controller can be shared between the
/// event handlers of a view. Internal locks are never held across an await;
/// at most one submit runs per controller, and at most one delete per product.
pub struct FormController {
  catalog: CatalogStore,
  image_folder: String,
  submit_workflow: Arc<Workflow<SubmitCtxData, CatalogError>>,
  inner: Mutex<FormInner>,
}

impl FormController {
  pub fn new(catalog: CatalogStore, config: &AdminConfig) -> Self {
    Self {
      catalog,
      image_folder: config.image_folder.clone(),
      submit_workflow: Arc::new(build_submit_workflow()),
      inner: Mutex::new(FormInner::default()),
    }
  }

  pub fn catalog(&self) -> &CatalogStore {
    &self.catalog
  }

  pub fn state(&self) -> FormState {
    self.inner.lock().state.clone()
  }

  pub fn draft(&self) -> FormDraft {
    self.inner.lock().draft.clone()
  }

  pub fn selected(&self) -> Option<Product> {
    self.inner.lock().selected.clone()
  }

  /// Missing fields from the last rejected submit, if the form is marked invalid.
  pub fn validation_errors(&self) -> Option<ValidationErrors> {
    self.inner.lock().validation.clone()
  }

  pub fn is_invalid(&self) -> bool {
    self.inner.lock().validation.is_some()
  }

  pub fn take_notifications(&self) -> Vec<Notification> {
    self.inner.lock().notifications.drain(..).collect()
  }

  /// Opens an empty create panel.
  pub fn open_create(&self) -> CatalogResult<()> {
    let mut inner = self.inner.lock();
    if matches!(inner.state, FormState::Submitting(_)) {
      return Err(inner.reject("open_create"));
    }
    inner.state = FormState::Editing(FormMode::New);
    inner.draft = FormDraft::default();
    inner.selected = None;
    inner.validation = None;
    info!("Create panel opened.");
    Ok(())
  }

  /// Opens an edit panel pre-filled from `product`.
  pub fn open_edit(&self, product: &Product) -> CatalogResult<()> {
    let mut inner = self.inner.lock();
    if matches!(inner.state, FormState::Submitting(_)) {
      return Err(inner.reject("open_edit"));
    }
    inner.state = FormState::Editing(FormMode::Existing {
      product_id: product.product_id.clone(),
      image_ref: product.image_ref.clone(),
    });
    inner.draft = FormDraft::from_product(product);
    inner.selected = Some(product.clone());
    inner.validation = None;
    info!(product_id = %product.product_id, "Edit panel opened.");
    Ok(())
  }

  /// Applies `edit` to the open draft.
  pub fn edit_draft(&self, edit: impl FnOnce(&mut FormDraft)) -> CatalogResult<()> {
    let mut inner = self.inner.lock();
    if !matches!(inner.state, FormState::Editing(_)) {
      return Err(inner.reject("edit_draft"));
    }
    edit(&mut inner.draft);
    Ok(())
  }

  /// Stages a local image for upload on the next submit.
  pub fn pick_local_image(&self, image: LocalImage) -> CatalogResult<()> {
    let mut inner = self.inner.lock();
    if !matches!(inner.state, FormState::Editing(_)) {
      return Err(inner.reject("pick_local_image"));
    }
    info!(filename = %image.filename, "Local image picked.");
    inner.draft.image = Some(image);
    Ok(())
  }

  /// Closes the open panel and discards the draft.
  pub fn cancel(&self) -> CatalogResult<()> {
    let mut inner = self.inner.lock();
    if matches!(inner.state, FormState::Submitting(_)) {
      return Err(inner.reject("cancel"));
    }
    inner.state = FormState::Idle;
    inner.draft = FormDraft::default();
    inner.selected = None;
    inner.validation = None;
    Ok(())
  }

  /// Validates the draft and runs the submit workflow.
  ///
  /// An invalid draft is rejected before any backend call and marks the form
  /// invalid. On success the form returns to `Idle` with a cleared draft; on
  /// failure it returns to the same editing state with the draft untouched.
  #[instrument(name = "FormController::submit", skip(self))]
  pub async fn submit(&self) -> CatalogResult<ProductId> {
    let (mode, ctx) = {
      let mut inner = self.inner.lock();
      let mode = match &inner.state {
        FormState::Editing(mode) => mode.clone(),
        FormState::Submitting(_) => {
          warn!("Submit rejected: another submit is in flight.");
          return Err(CatalogError::SubmitInProgress);
        }
        FormState::Idle => return Err(inner.reject("submit")),
      };

      let fields = match inner.draft.validate() {
        Ok(fields) => fields,
        Err(errors) => {
          warn!(missing = %errors, "Submit rejected: draft is invalid.");
          let err = CatalogError::Validation(errors.clone());
          inner.validation = Some(errors);
          inner.notify_error(&err);
          return Err(err);
        }
      };

      inner.validation = None;
      inner.state = FormState::Submitting(mode.clone());
      let ctx = SubmitCtxData::new(
        self.catalog.clone(),
        self.image_folder.clone(),
        mode.clone(),
        fields,
        inner.draft.image.clone(),
      );
      (mode, ContextData::new(ctx))
    };

    let guard = SubmitGuard {
      inner: &self.inner,
      mode: Some(mode.clone()),
    };
    let outcome = self.submit_workflow.run(ctx.clone()).await;
    guard.disarm();

    let result = outcome.and_then(|_| {
      let (saved_id, name) = {
        let data = ctx.read();
        (data.saved_id.clone(), data.fields.name.clone())
      };
      saved_id
        .map(|id| (id, name))
        .ok_or_else(|| {
          CatalogError::from(WorkflowError::MissingOutput {
            step_name: PERSIST_RECORD.to_string(),
            missing: "a product id",
          })
        })
    });

    let mut inner = self.inner.lock();
    match result {
      Ok((product_id, name)) => {
        let verb = match mode {
          FormMode::New => "created",
          FormMode::Existing { .. } => "updated",
        };
        info!(%product_id, verb, "Submit succeeded.");
        inner.state = FormState::Idle;
        inner.draft = FormDraft::default();
        inner.selected = None;
        inner
          .notifications
          .push_back(Notification::success(format!("Product '{}' {}.", name, verb)));
        Ok(product_id)
      }
      Err(err) => {
        error!(error = %err, "Submit failed; draft kept for retry.");
        inner.state = FormState::Editing(mode);
        inner.notify_error(&err);
        Err(err)
      }
    }
  }

  /// Deletes `product` and its stored image.
  ///
  /// Only allowed while no panel is open. A second request for a product whose
  /// delete is still in flight is rejected.
  #[instrument(name = "FormController::request_delete", skip(self, product), fields(product_id = %product.product_id))]
  pub async fn request_delete(&self, product: &Product) -> CatalogResult<()> {
    {
      let mut inner = self.inner.lock();
      if !inner.state.is_idle() {
        return Err(inner.reject("request_delete"));
      }
      if !inner.deleting.insert(product.product_id.clone()) {
        warn!("Delete rejected: already in flight.");
        return Err(CatalogError::DeleteInProgress(product.product_id.clone()));
      }
    }

    let guard = DeleteGuard {
      inner: &self.inner,
      product_id: product.product_id.clone(),
    };
    let result = self.catalog.delete(&product.product_id, &product.image_ref).await;
    drop(guard);

    let mut inner = self.inner.lock();
    match result {
      Ok(()) => {
        inner
          .notifications
          .push_back(Notification::success(format!("Product '{}' deleted.", product.fields.name)));
        Ok(())
      }
      Err(err) => {
        error!(error = %err, "Delete failed.");
        inner.notify_error(&err);
        Err(err)
      }
    }
  }
}

/// Puts the form back into `Editing` if a submit future is dropped mid-flight.
struct SubmitGuard<'a> {
  inner: &'a Mutex<FormInner>,
  mode: Option<FormMode>,
}

impl SubmitGuard<'_> {
  fn disarm(mut self) {
    self.mode = None;
  }
}

impl Drop for SubmitGuard<'_> {
  fn drop(&mut self) {
    if let Some(mode) = self.mode.take() {
      let mut inner = self.inner.lock();
      if matches!(inner.state, FormState::Submitting(_)) {
        warn!("Submit abandoned; returning to editing.");
        inner.state = FormState::Editing(mode);
      }
    }
  }
}

/// Releases a product's in-flight delete marker, even if the delete future is dropped.
struct DeleteGuard<'a> {
  inner: &'a Mutex<FormInner>,
  product_id: ProductId,
}

impl Drop for DeleteGuard<'_> {
  fn drop(&mut self) {
    self.inner.lock().deleting.remove(&self.product_id);
  }
}
