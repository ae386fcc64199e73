//! Local-first deletes with reconcile-by-reload on failure.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::synchronizer::CatalogSynchronizer;
use super::view::LoadOutcome;
use crate::models::{Product, ProductId};
use crate::Result;

const SIGNAL_CAPACITY: usize = 64;

/// Notification emitted when an optimistic mutation settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationSignal {
    DeleteCommitted(ProductId),
    DeleteFailed { id: ProductId, reason: String },
}

/// How a `delete_product` call ended.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The store confirmed the delete; the local removal stands.
    Committed(ProductId),
    /// The store rejected the delete. `resync` is the reconciliation load.
    Failed {
        id: ProductId,
        reason: String,
        resync: Result<LoadOutcome>,
    },
    /// The id was not in the collection, or a delete for it is already in flight.
    Rejected(ProductId),
}

impl DeleteOutcome {
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Applies deletes to the catalog before the store confirms them.
pub struct OptimisticMutationController {
    catalog: Arc<CatalogSynchronizer>,
    signals: broadcast::Sender<MutationSignal>,
}

impl OptimisticMutationController {
    pub fn new(catalog: Arc<CatalogSynchronizer>) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { catalog, signals }
    }

    pub const fn catalog(&self) -> &Arc<CatalogSynchronizer> {
        &self.catalog
    }

    /// Subscribe to settle notifications.
    pub fn signals(&self) -> broadcast::Receiver<MutationSignal> {
        self.signals.subscribe()
    }

    /// Remove `id` locally and return a handle that issues the remote delete.
    ///
    /// Returns `None` when `id` is not in the collection; no signal is sent.
    pub fn request_delete(&self, id: &ProductId) -> Option<PendingDelete> {
        let Some(product) = self.catalog.begin_optimistic_delete(id) else {
            tracing::debug!("Ignoring delete for {id}: not in catalog");
            return None;
        };
        tracing::debug!("Optimistically removed product {id}");

        Some(PendingDelete {
            catalog: Arc::clone(&self.catalog),
            signals: self.signals.clone(),
            product,
            settled: false,
        })
    }

    /// Remove `id` locally, then delete it remotely.
    pub async fn delete_product(&self, id: &ProductId) -> DeleteOutcome {
        match self.request_delete(id) {
            Some(pending) => pending.settle().await,
            None => DeleteOutcome::Rejected(id.clone()),
        }
    }
}

/// A delete applied locally and not yet confirmed by the store.
///
/// Dropping it unsettled stops hiding the entry; it returns on the next load.
pub struct PendingDelete {
    catalog: Arc<CatalogSynchronizer>,
    signals: broadcast::Sender<MutationSignal>,
    product: Product,
    settled: bool,
}

impl PendingDelete {
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// The entry as it was when it was removed.
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Issue the remote delete and reconcile.
    ///
    /// A failed delete is not undone by re-inserting the removed copy; the
    /// catalog is reloaded from the store, which knows whether the delete
    /// actually took effect.
    pub async fn settle(mut self) -> DeleteOutcome {
        let id = self.product.id.clone();
        let result = self.catalog.store().delete(&id).await;
        self.settled = true;

        match result {
            Ok(()) => {
                self.catalog.commit_optimistic_delete(&id);
                tracing::info!("Deleted product {id}");
                let _ = self.signals.send(MutationSignal::DeleteCommitted(id.clone()));
                DeleteOutcome::Committed(id)
            }
            Err(error) => {
                let reason = error.to_string();
                if error.is_transport() {
                    tracing::warn!("Delete of product {id} failed, resynchronizing: {reason}");
                } else {
                    tracing::info!("Store refused delete of product {id}, resynchronizing: {reason}");
                }
                self.catalog.abandon_optimistic_delete(&id);
                let _ = self.signals.send(MutationSignal::DeleteFailed {
                    id: id.clone(),
                    reason: reason.clone(),
                });
                let resync = self.catalog.load().await;
                DeleteOutcome::Failed { id, reason, resync }
            }
        }
    }
}

impl Drop for PendingDelete {
    fn drop(&mut self) {
        if !self.settled {
            self.catalog.abandon_optimistic_delete(&self.product.id);
        }
    }
}
