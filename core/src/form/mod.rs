// catalog_admin/src/form/mod.rs

//! The Form Controller: editable draft, selected record, and the
//! create/edit/delete workflows that reconcile user actions with the catalog.

pub mod controller;
pub mod state;
pub mod submit;

pub use controller::FormController;
pub use state::{FormMode, FormState, Notification, NotificationLevel};
