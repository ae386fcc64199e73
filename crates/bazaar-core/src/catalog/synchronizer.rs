//! Canonical in-memory product collection.
//!
//! Three sources write into the collection: wholesale snapshot loads, change
//! events pushed by the store, and optimistic deletes. Every write happens
//! under one short, non-async lock, so a load result is swapped in atomically
//! and an event can never land halfway through that swap. Nothing awaits while
//! the lock is held.
//!
//! Loads are tagged with a generation number. A response is applied only if
//! no newer load was started in the meantime; slower, older responses are
//! dropped.
//!
//! Feed tasks started by `attach_feed` are aborted when the synchronizer is
//! dropped, which releases their store subscriptions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use super::view::{CatalogStatus, CatalogView, LoadOutcome, MergeOutcome};
use crate::models::{Product, ProductId, ProductRecord};
use crate::search::filter_products;
use crate::store::{ChangeEvent, FeedMessage, RemoteStore};
use crate::Result;

/// Ids whose rows must not be (re)admitted into the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppression {
    /// Optimistic delete in flight.
    Pending,
    /// Delete confirmed while load `after_load` (or an older one) was still
    /// outstanding and may carry the pre-delete row. Dropped once a load at
    /// least that new resolves.
    Committed { after_load: u64 },
}

#[derive(Default)]
struct CatalogState {
    products: Arc<Vec<Product>>,
    status: CatalogStatus,
    feed_error: Option<String>,
    version: u64,
    latest_load: u64,
    /// Generation of the last load that resolved without being superseded.
    resolved_load: u64,
    suppressed: HashMap<ProductId, Suppression>,
}

impl CatalogState {
    fn view(&self) -> CatalogView {
        CatalogView {
            products: Arc::clone(&self.products),
            status: self.status.clone(),
            feed_error: self.feed_error.clone(),
            version: self.version,
        }
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|product| &product.id == id)
    }

    fn is_suppressed(&self, id: &ProductId) -> bool {
        self.suppressed.contains_key(id)
    }

    /// Record that load `generation` resolved. No older load can apply after
    /// this, so committed deletes guarded by it are released.
    fn resolve_load(&mut self, generation: u64) {
        self.resolved_load = generation;
        self.suppressed.retain(|_, suppression| match suppression {
            Suppression::Pending => true,
            Suppression::Committed { after_load } => *after_load > generation,
        });
    }

    const fn load_outstanding(&self) -> bool {
        self.latest_load > self.resolved_load
    }
}

/// Owner of the canonical product collection.
pub struct CatalogSynchronizer {
    store: Arc<dyn RemoteStore>,
    state: Mutex<CatalogState>,
    updates: watch::Sender<CatalogView>,
    feed_tasks: Mutex<Vec<AbortHandle>>,
}

impl CatalogSynchronizer {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_initial(store, Vec::new())
    }

    /// Start from a previously persisted collection.
    ///
    /// Status stays `Loading` until the first `load()` resolves.
    pub fn with_initial(store: Arc<dyn RemoteStore>, products: Vec<Product>) -> Self {
        let state = CatalogState {
            products: Arc::new(dedup_by_id(products)),
            ..CatalogState::default()
        };
        let (updates, _) = watch::channel(state.view());
        Self {
            store,
            state: Mutex::new(state),
            updates,
            feed_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Immutable snapshot of the collection and its status.
    pub fn current_view(&self) -> CatalogView {
        self.lock().view()
    }

    /// Receiver that observes every visible state change.
    pub fn watch(&self) -> watch::Receiver<CatalogView> {
        self.updates.subscribe()
    }

    pub fn product(&self, id: &ProductId) -> Option<Product> {
        let state = self.lock();
        state.position(id).map(|index| state.products[index].clone())
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.lock().position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().products.is_empty()
    }

    /// Search-filtered projection of the current collection.
    pub fn search(&self, query: &str) -> Vec<Product> {
        let products = Arc::clone(&self.lock().products);
        filter_products(&products, query)
    }

    /// Fetch a full snapshot and replace the collection with it.
    ///
    /// On failure the status becomes `Errored` and the previous collection is
    /// kept. Nothing is retried here; call `load()` again to retry.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let generation = {
            let mut state = self.lock();
            state.latest_load += 1;
            state.status = CatalogStatus::Loading;
            let generation = state.latest_load;
            self.publish(&mut state);
            generation
        };

        let result = self.store.query_snapshot().await;

        let mut state = self.lock();
        if generation != state.latest_load {
            tracing::warn!(
                "Discarding catalog load {generation}; load {} is newer",
                state.latest_load
            );
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(records) => {
                let products: Vec<Product> = dedup_by_id(
                    records
                        .into_iter()
                        .map(ProductRecord::into_product)
                        .filter(|product| !state.is_suppressed(&product.id))
                        .collect(),
                );
                let count = products.len();

                state.resolve_load(generation);
                state.products = Arc::new(products);
                state.status = CatalogStatus::Ready;
                self.publish(&mut state);
                tracing::info!("Catalog loaded with {count} products");
                Ok(LoadOutcome::Applied(count))
            }
            Err(error) => {
                if error.is_transport() {
                    tracing::warn!("Catalog load failed: {error}");
                } else {
                    tracing::error!("Catalog load returned unusable data: {error}");
                }
                state.resolve_load(generation);
                state.status = CatalogStatus::Errored(error.to_string());
                self.publish(&mut state);
                Err(error)
            }
        }
    }

    /// Merge one pushed change into the collection.
    pub fn apply_remote_event(&self, event: ChangeEvent) -> MergeOutcome {
        let mut state = self.lock();
        let outcome = Self::merge(&mut state, event);
        if outcome != MergeOutcome::Ignored {
            self.publish(&mut state);
        }
        outcome
    }

    /// Handle one message from the change feed.
    pub fn apply_feed_message(&self, message: FeedMessage) -> MergeOutcome {
        match message {
            FeedMessage::Event(event) => {
                let mut state = self.lock();
                let recovered = state.feed_error.take().is_some();
                let outcome = Self::merge(&mut state, event);
                if recovered || outcome != MergeOutcome::Ignored {
                    self.publish(&mut state);
                }
                outcome
            }
            FeedMessage::TransportError(reason) => {
                tracing::warn!("Catalog change feed error: {reason}");
                let mut state = self.lock();
                state.feed_error = Some(reason);
                self.publish(&mut state);
                MergeOutcome::Ignored
            }
        }
    }

    /// Subscribe to the store's change feed and apply it in the background.
    ///
    /// Messages are applied in receipt order by a single task. The returned
    /// handle owns the subscription; shutting it down releases the channel.
    pub async fn attach_feed(self: &Arc<Self>) -> Result<FeedHandle> {
        let mut subscription = self.store.subscribe().await?;
        let catalog: Weak<Self> = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            loop {
                let message = subscription.recv().await;
                let Some(catalog) = catalog.upgrade() else {
                    break;
                };
                match message {
                    Some(message) => {
                        let outcome = catalog.apply_feed_message(message);
                        tracing::debug!("Applied catalog feed message: {outcome:?}");
                    }
                    None => {
                        catalog.apply_feed_message(FeedMessage::TransportError(
                            "change feed closed".to_string(),
                        ));
                        break;
                    }
                }
            }
        });

        {
            let mut feed_tasks = self
                .feed_tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            feed_tasks.retain(|handle| !handle.is_finished());
            feed_tasks.push(task.abort_handle());
        }

        Ok(FeedHandle { task: Some(task) })
    }

    /// Remove `id` ahead of the remote delete. `None` if it is absent or
    /// already being deleted.
    pub(crate) fn begin_optimistic_delete(&self, id: &ProductId) -> Option<Product> {
        let mut state = self.lock();
        if state.suppressed.get(id) == Some(&Suppression::Pending) {
            return None;
        }
        let index = state.position(id)?;
        let removed = Arc::make_mut(&mut state.products).remove(index);
        state.suppressed.insert(id.clone(), Suppression::Pending);
        self.publish(&mut state);
        Some(removed)
    }

    /// The remote delete succeeded; keep the entry out of any load that was
    /// already running. With no load outstanding nothing can carry the row back.
    pub(crate) fn commit_optimistic_delete(&self, id: &ProductId) {
        let mut state = self.lock();
        if state.load_outstanding() {
            let after_load = state.latest_load;
            state
                .suppressed
                .insert(id.clone(), Suppression::Committed { after_load });
        } else {
            state.suppressed.remove(id);
        }
    }

    /// The remote delete failed or was abandoned; stop hiding the entry.
    pub(crate) fn abandon_optimistic_delete(&self, id: &ProductId) {
        self.lock().suppressed.remove(id);
    }

    fn merge(state: &mut CatalogState, event: ChangeEvent) -> MergeOutcome {
        match event {
            ChangeEvent::Inserted(record) => {
                let product = record.into_product();
                if state.is_suppressed(&product.id) {
                    return MergeOutcome::Ignored;
                }
                // Redelivered insert: keep uniqueness and position.
                if let Some(index) = state.position(&product.id) {
                    Arc::make_mut(&mut state.products)[index] = product;
                    return MergeOutcome::Replaced;
                }
                Arc::make_mut(&mut state.products).insert(0, product);
                MergeOutcome::Inserted
            }
            ChangeEvent::Updated(record) => {
                let product = record.into_product();
                if state.is_suppressed(&product.id) {
                    return MergeOutcome::Ignored;
                }
                let Some(index) = state.position(&product.id) else {
                    return MergeOutcome::Ignored;
                };
                Arc::make_mut(&mut state.products)[index] = product;
                MergeOutcome::Replaced
            }
            ChangeEvent::Deleted(id) => {
                let Some(index) = state.position(&id) else {
                    return MergeOutcome::Ignored;
                };
                Arc::make_mut(&mut state.products).remove(index);
                MergeOutcome::Removed
            }
        }
    }

    fn publish(&self, state: &mut CatalogState) {
        state.version += 1;
        self.updates.send_replace(state.view());
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn suppressed_count(&self) -> usize {
        self.lock().suppressed.len()
    }
}

impl Drop for CatalogSynchronizer {
    fn drop(&mut self) {
        let feed_tasks = self
            .feed_tasks
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for handle in feed_tasks.drain(..) {
            handle.abort();
        }
    }
}

/// Background task applying the change feed. Dropping it stops the task.
pub struct FeedHandle {
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Stop applying events and wait until the subscription is released.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn dedup_by_id(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::with_capacity(products.len());
    products
        .into_iter()
        .filter(|product| seen.insert(product.id.clone()))
        .collect()
}
