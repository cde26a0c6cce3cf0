// catalog_admin/src/model/product.rs

//! The product record and its document representation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::draft::{FormDraft, ValidationErrors};
use crate::backend::Document;
use crate::error::CatalogError;

/// Store-assigned identifier of a product. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
  pub fn new(id: impl Into<String>) -> Self {
    ProductId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Durable reference (download URL) to a stored image. Empty means "no image".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
  pub fn new(reference: impl Into<String>) -> Self {
    ImageRef(reference.into())
  }

  pub fn none() -> Self {
    ImageRef(String::new())
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ImageRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Every editable field of a product, i.e. a product without its id and image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
  pub name: String,
  pub price: f64,
  pub description: String,
  pub category: String,
  pub alt_text: String,
}

impl ProductFields {
  /// Same rules as the form draft: every text field filled, price finite.
  pub fn validate(&self) -> Result<(), ValidationErrors> {
    FormDraft::from_fields(self.clone()).validate().map(|_| ())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub product_id: ProductId,
  #[serde(flatten)]
  pub fields: ProductFields,
  #[serde(default)]
  pub image_ref: ImageRef,
}

impl Product {
  pub fn new(product_id: ProductId, fields: ProductFields, image_ref: ImageRef) -> Self {
    Self {
      product_id,
      fields,
      image_ref,
    }
  }

  /// Serializes the record into the field map stored under its id.
  pub fn to_document_body(&self) -> Result<serde_json::Map<String, serde_json::Value>, CatalogError> {
    let encode_failed = |source: serde_json::Error| CatalogError::Encode {
      product_id: self.product_id.clone(),
      source,
    };
    match serde_json::to_value(self).map_err(encode_failed)? {
      serde_json::Value::Object(map) => Ok(map),
      other => Err(encode_failed(<serde_json::Error as serde::ser::Error>::custom(format!(
        "expected an object, got {}",
        other
      )))),
    }
  }

  /// Decodes a stored document. The document key wins over any id in the body.
  pub fn from_document(doc: &Document) -> Result<Self, CatalogError> {
    let mut body = doc.body.clone();
    if let Some(map) = body.as_object_mut() {
      map.insert("productId".to_string(), serde_json::Value::String(doc.id.clone()));
    }
    serde_json::from_value(body).map_err(|source| CatalogError::Decode {
      id: doc.id.clone(),
      source,
    })
  }
}
