// catalog_admin/src/catalog/mod.rs

//! The Catalog Store adapter and the Image Upload facility.

pub mod feed;
pub mod store;
pub mod upload;

pub use feed::ProductFeed;
pub use store::CatalogStore;
pub use upload::ImageUploader;
