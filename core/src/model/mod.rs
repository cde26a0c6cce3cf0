// catalog_admin/src/model/mod.rs

//! Product records and the transient form draft.

pub mod draft;
pub mod product;

pub use draft::{Blob, FormDraft, Field, ImagePayload, LocalImage, ValidationErrors};
pub use product::{ImageRef, Product, ProductFields, ProductId};
