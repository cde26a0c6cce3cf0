// tests/config_tests.rs
mod common;

use catalog_admin::{AdminConfig, ConfigError};
use common::*;
use serial_test::serial;
use std::env;
use std::time::Duration;

const VARS: [&str; 4] = [
  "CATALOG_COLLECTION",
  "CATALOG_IMAGE_FOLDER",
  "CATALOG_BACKEND_TIMEOUT_MS",
  "CATALOG_STORAGE_BASE_URL",
];

fn clear_vars() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn test_defaults_when_nothing_is_set() {
  setup_tracing();
  clear_vars();

  let config = AdminConfig::from_env().unwrap();
  assert_eq!(config.collection, "producto");
  assert_eq!(config.image_folder, "productos");
  assert_eq!(config.backend_timeout, Duration::from_secs(10));
  assert_eq!(config.storage_base_url, "memory://catalog");
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
  setup_tracing();
  clear_vars();
  env::set_var("CATALOG_COLLECTION", "catalogue");
  env::set_var("CATALOG_IMAGE_FOLDER", "/images/");
  env::set_var("CATALOG_BACKEND_TIMEOUT_MS", "2500");

  let config = AdminConfig::from_env().unwrap();
  clear_vars();

  assert_eq!(config.collection, "catalogue");
  assert_eq!(config.image_folder, "images");
  assert_eq!(config.backend_timeout, Duration::from_millis(2500));
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
  setup_tracing();
  for (var, value) in [
    ("CATALOG_BACKEND_TIMEOUT_MS", "soon"),
    ("CATALOG_BACKEND_TIMEOUT_MS", "0"),
    ("CATALOG_COLLECTION", "  "),
  ] {
    clear_vars();
    env::set_var(var, value);
    let err = AdminConfig::from_env().unwrap_err();
    let ConfigError::Invalid { var: reported, .. } = err;
    assert_eq!(reported, var, "value '{}'", value);
  }
  clear_vars();
}
