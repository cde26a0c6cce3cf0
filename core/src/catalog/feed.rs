// catalog_admin/src/catalog/feed.rs
use tracing::warn;

use crate::backend::{Snapshot, Subscription};
use crate::model::Product;

/// Live list of all products, re-pushed on every change to the collection.
///
/// Product order follows the backend and is not stable between pushes.
/// Keep the feed only as long as its view lives: `cancel` (or drop) releases
/// the backend listener.
#[derive(Debug)]
pub struct ProductFeed {
  collection: String,
  subscription: Subscription,
}

impl ProductFeed {
  pub(crate) fn new(collection: String, subscription: Subscription) -> Self {
    Self {
      collection,
      subscription,
    }
  }

  pub fn current(&self) -> Vec<Product> {
    self.decode(&self.subscription.current())
  }

  /// Next pushed list, or `None` once the feed is closed.
  pub async fn changed(&mut self) -> Option<Vec<Product>> {
    let snapshot = self.subscription.changed().await?;
    Some(self.decode(&snapshot))
  }

  pub fn is_active(&self) -> bool {
    self.subscription.is_active()
  }

  pub fn cancel(self) {
    tracing::debug!(collection = %self.collection, "Product feed cancelled.");
    self.subscription.cancel();
  }

  fn decode(&self, snapshot: &Snapshot) -> Vec<Product> {
    snapshot
      .iter()
      .filter_map(|doc| match Product::from_document(doc) {
        Ok(product) => Some(product),
        Err(e) => {
          warn!(collection = %self.collection, error = %e, "Skipping undecodable document.");
          None
        }
      })
      .collect()
  }
}
