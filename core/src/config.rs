// catalog_admin/src/config.rs

use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct AdminConfig {
  /// Document collection holding the products.
  pub collection: String,
  /// Storage folder that product images are uploaded into.
  pub image_folder: String,
  /// Upper bound for every single backend call.
  pub backend_timeout: Duration,
  /// Base URL handed to the in-memory object storage.
  pub storage_base_url: String,
}

impl Default for AdminConfig {
  fn default() -> Self {
    Self {
      collection: "producto".to_string(),
      image_folder: "productos".to_string(),
      backend_timeout: Duration::from_secs(10),
      storage_base_url: "memory://catalog".to_string(),
    }
  }
}

impl AdminConfig {
  /// Reads `CATALOG_*` variables (after loading a `.env` file if present),
  /// falling back to the defaults for anything unset.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenv().ok();
    let defaults = Self::default();

    let collection = non_empty_var("CATALOG_COLLECTION")?.unwrap_or(defaults.collection);
    let image_folder = non_empty_var("CATALOG_IMAGE_FOLDER")?
      .map(|f| f.trim_matches('/').to_string())
      .unwrap_or(defaults.image_folder);
    let storage_base_url = non_empty_var("CATALOG_STORAGE_BASE_URL")?.unwrap_or(defaults.storage_base_url);

    let backend_timeout = match env::var("CATALOG_BACKEND_TIMEOUT_MS") {
      Ok(raw) => {
        let millis = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
          var: "CATALOG_BACKEND_TIMEOUT_MS",
          message: e.to_string(),
        })?;
        if millis == 0 {
          return Err(ConfigError::Invalid {
            var: "CATALOG_BACKEND_TIMEOUT_MS",
            message: "must be greater than zero".to_string(),
          });
        }
        Duration::from_millis(millis)
      }
      Err(_) => defaults.backend_timeout,
    };

    tracing::info!(%collection, %image_folder, ?backend_timeout, "Admin configuration loaded.");

    Ok(Self {
      collection,
      image_folder,
      backend_timeout,
      storage_base_url,
    })
  }
}

fn non_empty_var(var: &'static str) -> Result<Option<String>, ConfigError> {
  match env::var(var) {
    Ok(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
      var,
      message: "must not be empty".to_string(),
    }),
    Ok(value) => Ok(Some(value)),
    Err(_) => Ok(None),
  }
}
