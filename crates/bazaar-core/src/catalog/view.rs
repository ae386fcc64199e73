//! Read-side types handed to presentation code.

use std::sync::Arc;

use crate::models::{Product, ProductId};
use crate::search::filter_products;

/// Load state of the catalog. Starts as `Loading` and cycles on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Ready,
    /// Last load failed; the previous collection is still shown.
    Errored(String),
}

impl CatalogStatus {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Errored(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Immutable snapshot of the catalog.
///
/// Holding a view never blocks the synchronizer; later changes are made on a
/// fresh copy of the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    pub(crate) products: Arc<Vec<Product>>,
    pub(crate) status: CatalogStatus,
    pub(crate) feed_error: Option<String>,
    pub(crate) version: u64,
}

impl CatalogView {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub const fn status(&self) -> &CatalogStatus {
        &self.status
    }

    /// Most recent change-feed failure, cleared once events flow again.
    pub fn feed_error(&self) -> Option<&str> {
        self.feed_error.as_deref()
    }

    /// Monotonic counter bumped on every visible state change.
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|product| product.id.clone()).collect()
    }

    /// Search-filtered projection of this snapshot.
    pub fn search(&self, query: &str) -> Vec<Product> {
        filter_products(&self.products, query)
    }
}

/// Result of a completed `load()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot replaced the collection; carries the entry count.
    Applied(usize),
    /// A newer load was started before this one resolved; its result was discarded.
    Superseded,
}

/// Effect of one change event on the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
    Removed,
    /// Unknown or suppressed id; nothing changed.
    Ignored,
}
