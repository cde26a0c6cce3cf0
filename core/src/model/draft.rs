// catalog_admin/src/model/draft.rs

//! Transient form state: the editable draft, the locally picked image, and
//! field validation.

use base64::Engine as _;
use std::fmt;

use super::product::{Product, ProductFields};

/// Binary content ready to be written to object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
  pub bytes: Vec<u8>,
  pub content_type: Option<String>,
}

/// Image content as picked by the user, before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
  /// `data:<mime>[;base64],<data>`, the way a browser file reader hands it over.
  DataUrl(String),
  Raw { bytes: Vec<u8>, content_type: Option<String> },
}

impl ImagePayload {
  /// Decodes the payload into bytes. Fails with a human-readable reason.
  pub fn to_blob(&self) -> Result<Blob, String> {
    match self {
      ImagePayload::Raw { bytes, content_type } => Ok(Blob {
        bytes: bytes.clone(),
        content_type: content_type.clone(),
      }),
      ImagePayload::DataUrl(url) => decode_data_url(url),
    }
  }
}

fn decode_data_url(url: &str) -> Result<Blob, String> {
  let rest = url
    .strip_prefix("data:")
    .ok_or_else(|| "payload is not a data URL".to_string())?;
  let (header, data) = rest
    .split_once(',')
    .ok_or_else(|| "data URL has no ',' separator".to_string())?;

  let (media_type, is_base64) = match header.strip_suffix(";base64") {
    Some(media_type) => (media_type, true),
    None => (header, false),
  };
  let content_type = if media_type.is_empty() {
    None
  } else {
    Some(media_type.to_string())
  };

  let bytes = if is_base64 {
    base64::engine::general_purpose::STANDARD
      .decode(data.trim())
      .map_err(|e| format!("invalid base64 in data URL: {}", e))?
  } else {
    data.as_bytes().to_vec()
  };

  Ok(Blob { bytes, content_type })
}

/// An image picked in the form but not uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
  pub filename: String,
  pub payload: ImagePayload,
}

impl LocalImage {
  pub fn data_url(filename: impl Into<String>, data_url: impl Into<String>) -> Self {
    Self {
      filename: filename.into(),
      payload: ImagePayload::DataUrl(data_url.into()),
    }
  }

  pub fn raw(filename: impl Into<String>, bytes: Vec<u8>, content_type: Option<String>) -> Self {
    Self {
      filename: filename.into(),
      payload: ImagePayload::Raw { bytes, content_type },
    }
  }
}

/// Required form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Name,
  Price,
  Description,
  Category,
  AltText,
}

impl Field {
  pub fn as_str(&self) -> &'static str {
    match self {
      Field::Name => "name",
      Field::Price => "price",
      Field::Description => "description",
      Field::Category => "category",
      Field::AltText => "alt text",
    }
  }
}

/// The required fields that were missing when a draft was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
  missing: Vec<Field>,
}

impl ValidationErrors {
  pub fn missing(&self) -> &[Field] {
    &self.missing
  }

  pub fn contains(&self, field: Field) -> bool {
    self.missing.contains(&field)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.missing.iter().map(Field::as_str).collect();
    f.write_str(&names.join(", "))
  }
}

/// Editable mirror of a product while a create/edit panel is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
  pub name: String,
  pub price: Option<f64>,
  pub description: String,
  pub category: String,
  pub alt_text: String,
  pub image: Option<LocalImage>,
}

impl FormDraft {
  /// Draft pre-filled from a stored product. The image is never pre-filled:
  /// `image` only ever holds a new, not yet uploaded pick.
  pub fn from_product(product: &Product) -> Self {
    Self {
      name: product.fields.name.clone(),
      price: Some(product.fields.price),
      description: product.fields.description.clone(),
      category: product.fields.category.clone(),
      alt_text: product.fields.alt_text.clone(),
      image: None,
    }
  }

  pub fn from_fields(fields: ProductFields) -> Self {
    Self {
      name: fields.name,
      price: Some(fields.price),
      description: fields.description,
      category: fields.category,
      alt_text: fields.alt_text,
      image: None,
    }
  }

  pub fn validate(&self) -> Result<ProductFields, ValidationErrors> {
    let mut missing = Vec::new();
    if self.name.trim().is_empty() {
      missing.push(Field::Name);
    }
    let price = match self.price {
      Some(p) if p.is_finite() => p,
      _ => {
        missing.push(Field::Price);
        0.0
      }
    };
    if self.description.trim().is_empty() {
      missing.push(Field::Description);
    }
    if self.category.trim().is_empty() {
      missing.push(Field::Category);
    }
    if self.alt_text.trim().is_empty() {
      missing.push(Field::AltText);
    }

    if !missing.is_empty() {
      return Err(ValidationErrors { missing });
    }
    Ok(ProductFields {
      name: self.name.clone(),
      price,
      description: self.description.clone(),
      category: self.category.clone(),
      alt_text: self.alt_text.clone(),
    })
  }
}
