//! Data models for Bazaar

mod product;
mod record;

pub use product::{NewProduct, Product, ProductId, MAX_PRODUCT_IMAGES};
pub use record::{normalize_images, ProductRecord};
