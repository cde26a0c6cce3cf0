// admin_console/src/main.rs

mod session;

use catalog_admin::{AdminConfig, CatalogStore, FormController, ImageUploader, InMemoryDocumentStore, InMemoryObjectStorage};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting catalog admin console...");

  let config = match AdminConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load admin configuration.");
      return Err(e.into());
    }
  };

  let documents = Arc::new(InMemoryDocumentStore::new());
  let storage = Arc::new(InMemoryObjectStorage::new(config.storage_base_url.clone()));
  let images = ImageUploader::new(storage.clone(), config.backend_timeout);
  let catalog = CatalogStore::new(documents.clone(), images, &config);
  let controller = FormController::new(catalog.clone(), &config);

  // The list view: re-render on every pushed snapshot until the task is dropped.
  let mut feed = catalog.observe_all().await?;
  session::render("initial", &feed.current());
  let list_view = tokio::spawn(async move {
    while let Some(products) = feed.changed().await {
      session::render("update", &products);
    }
  });

  let outcome = session::run(&controller).await;

  list_view.abort();
  // Let the aborted task drop its feed before checking the listener count.
  let _ = list_view.await;
  tracing::info!(
    listeners = documents.active_listeners(&config.collection),
    stored_images = storage.len(),
    "Session finished."
  );

  outcome
}
