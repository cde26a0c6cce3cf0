// catalog_admin/src/form/state.rs
use crate::model::{ImageRef, ProductId};

/// Which kind of panel is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
  New,
  /// Editing a stored product. Id and current image are kept out of the draft.
  Existing { product_id: ProductId, image_ref: ImageRef },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
  #[default]
  Idle,
  Editing(FormMode),
  /// A submit workflow is in flight; on failure the form returns to `Editing`
  /// with the same mode.
  Submitting(FormMode),
}

impl FormState {
  pub fn label(&self) -> &'static str {
    match self {
      FormState::Idle => "idle",
      FormState::Editing(FormMode::New) => "editing a new product",
      FormState::Editing(FormMode::Existing { .. }) => "editing an existing product",
      FormState::Submitting(_) => "submitting",
    }
  }

  pub fn is_idle(&self) -> bool {
    matches!(self, FormState::Idle)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
  Success,
  Error,
}

/// A user-visible message produced by a form action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: NotificationLevel,
  pub message: String,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Success,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Error,
      message: message.into(),
    }
  }
}
