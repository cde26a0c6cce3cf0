// tests/catalog_store_tests.rs
mod common;

use catalog_admin::{
  BackendError, CatalogError, DeleteStage, DocumentStore, Field, ImageRef, ObjectStorage, Product, ProductFields,
  ProductId,
};
use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn gadget_fields() -> ProductFields {
  ProductFields {
    name: "Gadget".to_string(),
    price: 25.0,
    description: "A gadget".to_string(),
    category: "toys".to_string(),
    alt_text: "gadget photo".to_string(),
  }
}

/// Stores `widget.png` and returns its download URL.
async fn stored_image(h: &Harness) -> ImageRef {
  let handle = h
    .catalog
    .images()
    .upload("widget.png", &widget_image().payload, "productos")
    .await
    .unwrap();
  h.catalog.images().resolve_url(&handle).await.unwrap()
}

fn sorted_names(products: &[Product]) -> Vec<String> {
  let mut names: Vec<String> = products.iter().map(|p| p.fields.name.clone()).collect();
  names.sort();
  names
}

#[tokio::test]
#[serial]
async fn test_create_stores_camel_case_document() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = ImageRef::new("memory://test-bucket/productos/widget.png");

  let id = h.catalog.create(widget_fields(), image_ref).await.unwrap();

  assert!(!id.as_str().is_empty());
  assert_eq!(
    h.stored(id.as_str()).unwrap(),
    json!({
      "productId": id.as_str(),
      "name": "Widget",
      "price": 9.99,
      "description": "A widget",
      "category": "tools",
      "altText": "widget photo",
      "imageRef": "memory://test-bucket/productos/widget.png",
    })
  );
}

#[tokio::test]
#[serial]
async fn test_create_assigns_distinct_ids() {
  setup_tracing();
  let h = Harness::new();
  let a = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  let b = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  assert_ne!(a, b);
  assert_eq!(h.documents.inner.len(COLLECTION), 2);
}

#[tokio::test]
#[serial]
async fn test_create_failure_is_store_write() {
  setup_tracing();
  let h = Harness::new();
  h.documents.fail_set.store(true, Ordering::SeqCst);

  let err = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap_err();
  assert!(matches!(err, CatalogError::StoreWrite { source: BackendError::Unavailable(_), .. }));
}

#[tokio::test]
#[serial]
async fn test_update_overwrites_fields_and_keeps_id() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = ImageRef::new("memory://test-bucket/productos/widget.png");
  let id = h.catalog.create(widget_fields(), image_ref.clone()).await.unwrap();

  let mut fields = widget_fields();
  fields.price = 12.50;
  // A stale id inside the record must not redirect the write.
  let record = Product::new(ProductId::new("someone-else"), fields, image_ref.clone());
  h.catalog.update(&id, &record).await.unwrap();

  let doc = h.stored(id.as_str()).unwrap();
  assert_eq!(doc["price"], json!(12.5));
  assert_eq!(doc["productId"], json!(id.as_str()));
  assert_eq!(doc["imageRef"], json!(image_ref.as_str()));
  assert!(h.stored("someone-else").is_none());
  assert_eq!(h.documents.inner.len(COLLECTION), 1);
}

#[tokio::test]
#[serial]
async fn test_update_of_missing_product_fails() {
  setup_tracing();
  let h = Harness::new();
  let id = ProductId::new("ghost");
  let record = Product::new(id.clone(), widget_fields(), ImageRef::none());

  let err = h.catalog.update(&id, &record).await.unwrap_err();
  match err {
    CatalogError::StoreWrite { product_id, source } => {
      assert_eq!(product_id, id);
      assert!(matches!(source, BackendError::NotFound(_)));
    }
    other => panic!("Expected StoreWrite, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_delete_removes_image_before_document() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = stored_image(&h).await;
  let id = h.catalog.create(widget_fields(), image_ref.clone()).await.unwrap();
  h.clear_calls();

  h.catalog.delete(&id, &image_ref).await.unwrap();

  assert_eq!(
    h.calls(),
    vec![
      Call::DeleteObject("productos/widget.png".to_string()),
      Call::DeleteDoc(id.as_str().to_string()),
    ]
  );
  assert!(h.stored(id.as_str()).is_none());
  assert!(h.storage.inner.is_empty());
}

#[tokio::test]
#[serial]
async fn test_delete_with_image_already_gone_still_removes_document() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = stored_image(&h).await;
  let id = h.catalog.create(widget_fields(), image_ref.clone()).await.unwrap();
  // Removed behind the catalog's back.
  h.storage.inner.delete("productos/widget.png").await.unwrap();
  h.clear_calls();

  h.catalog.delete(&id, &image_ref).await.unwrap();

  assert_eq!(
    h.calls(),
    vec![
      Call::DeleteObject("productos/widget.png".to_string()),
      Call::DeleteDoc(id.as_str().to_string()),
    ]
  );
  assert!(h.stored(id.as_str()).is_none());
}

#[tokio::test]
#[serial]
async fn test_writes_reject_invalid_fields() {
  setup_tracing();
  let h = Harness::new();

  let mut fields = widget_fields();
  fields.price = f64::NAN;
  let err = h.catalog.create(fields, ImageRef::none()).await.unwrap_err();
  assert!(matches!(err, CatalogError::Validation(ref e) if e.contains(Field::Price)));

  let id = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  h.clear_calls();
  let mut fields = widget_fields();
  fields.name = "  ".to_string();
  let err = h
    .catalog
    .update(&id, &Product::new(id.clone(), fields, ImageRef::none()))
    .await
    .unwrap_err();
  assert!(matches!(err, CatalogError::Validation(ref e) if e.contains(Field::Name)));

  assert!(h.calls().is_empty());
  assert_eq!(h.stored(id.as_str()).unwrap()["name"], "Widget");
  assert_eq!(h.documents.inner.len(COLLECTION), 1);
}

#[tokio::test]
#[serial]
async fn test_delete_without_image_skips_storage() {
  setup_tracing();
  let h = Harness::new();
  let id = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  h.clear_calls();

  h.catalog.delete(&id, &ImageRef::none()).await.unwrap();

  assert_eq!(h.calls(), vec![Call::DeleteDoc(id.as_str().to_string())]);
}

#[tokio::test]
#[serial]
async fn test_image_removal_failure_keeps_document() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = stored_image(&h).await;
  let id = h.catalog.create(widget_fields(), image_ref.clone()).await.unwrap();
  h.storage.fail_delete.store(true, Ordering::SeqCst);
  h.clear_calls();

  let err = h.catalog.delete(&id, &image_ref).await.unwrap_err();

  assert!(matches!(
    err,
    CatalogError::StoreDeleteOrphan { stage: DeleteStage::ImageRemoval, .. }
  ));
  assert!(h.stored(id.as_str()).is_some());
  assert!(!h.calls().contains(&Call::DeleteDoc(id.as_str().to_string())));
}

#[tokio::test]
#[serial]
async fn test_document_removal_failure_after_image_is_orphan() {
  setup_tracing();
  let h = Harness::new();
  let image_ref = stored_image(&h).await;
  let id = h.catalog.create(widget_fields(), image_ref.clone()).await.unwrap();
  h.documents.fail_delete.store(true, Ordering::SeqCst);

  let err = h.catalog.delete(&id, &image_ref).await.unwrap_err();

  assert!(matches!(
    err,
    CatalogError::StoreDeleteOrphan { stage: DeleteStage::DocumentRemoval, .. }
  ));
  assert!(h.storage.inner.is_empty());
  assert!(h.stored(id.as_str()).is_some());
}

#[tokio::test]
#[serial]
async fn test_document_removal_failure_without_image_is_store_write() {
  setup_tracing();
  let h = Harness::new();
  let id = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  h.documents.fail_delete.store(true, Ordering::SeqCst);

  let err = h.catalog.delete(&id, &ImageRef::none()).await.unwrap_err();
  assert!(matches!(err, CatalogError::StoreWrite { .. }));
}

#[tokio::test]
#[serial]
async fn test_feed_pushes_full_list_on_each_change() {
  setup_tracing();
  let h = Harness::new();
  let existing = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();

  let mut feed = h.catalog.observe_all().await.unwrap();
  let initial = feed.current();
  assert_eq!(initial.len(), 1);
  assert_eq!(initial[0].product_id, existing);

  let gadget = h.catalog.create(gadget_fields(), ImageRef::none()).await.unwrap();
  let pushed = feed.changed().await.unwrap();
  assert_eq!(sorted_names(&pushed), vec!["Gadget", "Widget"]);

  h.catalog.delete(&existing, &ImageRef::none()).await.unwrap();
  let pushed = feed.changed().await.unwrap();
  assert_eq!(pushed.len(), 1);
  assert_eq!(pushed[0].product_id, gadget);

  // No phantom duplicates of one id across pushes.
  let mut ids: Vec<_> = pushed.iter().map(|p| p.product_id.clone()).collect();
  ids.sort();
  ids.dedup();
  assert_eq!(ids.len(), pushed.len());
}

#[tokio::test]
#[serial]
async fn test_feed_reflects_updates() {
  setup_tracing();
  let h = Harness::new();
  let id = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  let mut feed = h.catalog.observe_all().await.unwrap();

  let mut fields = widget_fields();
  fields.price = 12.50;
  h.catalog
    .update(&id, &Product::new(id.clone(), fields, ImageRef::none()))
    .await
    .unwrap();

  let pushed = feed.changed().await.unwrap();
  assert_eq!(pushed.len(), 1);
  assert_eq!(pushed[0].fields.price, 12.50);
}

#[tokio::test]
#[serial]
async fn test_feed_cancel_releases_listener() {
  setup_tracing();
  let h = Harness::new();

  let feed = h.catalog.observe_all().await.unwrap();
  let other = h.catalog.observe_all().await.unwrap();
  assert_eq!(h.documents.inner.active_listeners(COLLECTION), 2);

  feed.cancel();
  assert_eq!(h.documents.inner.active_listeners(COLLECTION), 1);

  drop(other);
  assert_eq!(h.documents.inner.active_listeners(COLLECTION), 0);
}

#[tokio::test]
#[serial]
async fn test_feed_skips_undecodable_documents() {
  setup_tracing();
  let h = Harness::new();
  h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap();
  h.documents
    .inner
    .set(COLLECTION, "broken", json!({ "name": "No price" }))
    .await
    .unwrap();

  let feed = h.catalog.observe_all().await.unwrap();
  let products = feed.current();
  assert_eq!(products.len(), 1);
  assert_eq!(products[0].fields.name, "Widget");
}

#[tokio::test]
#[serial]
async fn test_document_key_wins_over_body_id() {
  setup_tracing();
  let h = Harness::new();
  h.documents
    .inner
    .set(
      COLLECTION,
      "real-key",
      json!({
        "productId": "stale",
        "name": "Widget",
        "price": 1.0,
        "description": "d",
        "category": "c",
        "altText": "a",
      }),
    )
    .await
    .unwrap();

  let products = h.catalog.observe_all().await.unwrap().current();
  assert_eq!(products[0].product_id.as_str(), "real-key");
  assert!(products[0].image_ref.is_empty());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_hung_write_times_out() {
  setup_tracing();
  let h = Harness::new();
  h.documents.hang_set.store(true, Ordering::SeqCst);

  let err = h.catalog.create(widget_fields(), ImageRef::none()).await.unwrap_err();
  match err {
    CatalogError::StoreWrite {
      source: BackendError::TimedOut { operation, after },
      ..
    } => {
      assert_eq!(operation, "set_document");
      assert_eq!(after, Duration::from_millis(200));
    }
    other => panic!("Expected a timed out write, got {:?}", other),
  }
}
