//! In-process store used by tests and demos.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{ChangeEvent, ChangeFeed, RemoteStore, Subscription};
use crate::error::{Error, Result};
use crate::models::{NewProduct, ProductId, ProductRecord};
use crate::util::unix_timestamp_millis;

#[derive(Default)]
struct Faults {
    snapshot: Option<String>,
    insert: Option<String>,
    delete: Option<String>,
}

/// A [`RemoteStore`] kept in memory, with one-shot failure injection.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    records: Mutex<Vec<ProductRecord>>,
    feed: ChangeFeed,
    faults: Mutex<Faults>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `records` without emitting any events.
    pub fn with_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.seed(record);
        }
        store
    }

    /// Add or overwrite a record silently, as if it predates every subscriber.
    pub fn seed(&self, record: ProductRecord) {
        let mut records = self.records();
        records.retain(|existing| existing.id != record.id);
        records.push(record);
    }

    /// Overwrite an existing record and announce it on the feed.
    pub fn update_record(&self, record: ProductRecord) -> Result<()> {
        {
            let mut records = self.records();
            let slot = records
                .iter_mut()
                .find(|existing| existing.id == record.id)
                .ok_or_else(|| Error::NotFound(record.id.to_string()))?;
            *slot = record.clone();
        }
        self.feed.publish(ChangeEvent::Updated(record));
        Ok(())
    }

    /// Current records, newest first.
    pub fn snapshot(&self) -> Vec<ProductRecord> {
        let mut records = self.records().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.records().iter().any(|record| &record.id == id)
    }

    pub fn fail_next_snapshot(&self, reason: impl Into<String>) {
        self.faults().snapshot = Some(reason.into());
    }

    pub fn fail_next_insert(&self, reason: impl Into<String>) {
        self.faults().insert = Some(reason.into());
    }

    pub fn fail_next_delete(&self, reason: impl Into<String>) {
        self.faults().delete = Some(reason.into());
    }

    /// Push a transport failure onto the change feed.
    pub fn inject_feed_error(&self, reason: impl Into<String>) {
        self.feed.publish_error(reason);
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn records(&self) -> MutexGuard<'_, Vec<ProductRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn query_snapshot(&self) -> Result<Vec<ProductRecord>> {
        if let Some(reason) = self.faults().snapshot.take() {
            return Err(Error::Transport(reason));
        }
        Ok(self.snapshot())
    }

    async fn insert(&self, product: NewProduct) -> Result<ProductRecord> {
        if let Some(reason) = self.faults().insert.take() {
            return Err(Error::Transport(reason));
        }

        let product = product.validate()?;
        let record = ProductRecord {
            id: ProductId::generate(),
            created_at: unix_timestamp_millis(),
            name: product.name,
            price: product.price,
            description: product.description,
            seller_username: product.seller_username,
            images: Some(serde_json::to_value(product.images)?),
        };

        self.records().push(record.clone());
        self.feed.publish(ChangeEvent::Inserted(record.clone()));
        Ok(record)
    }

    async fn delete(&self, id: &ProductId) -> Result<()> {
        if let Some(reason) = self.faults().delete.take() {
            return Err(Error::Transport(reason));
        }

        {
            let mut records = self.records();
            let before = records.len();
            records.retain(|record| &record.id != id);
            if records.len() == before {
                return Err(Error::NotFound(id.to_string()));
            }
        }

        self.feed.publish(ChangeEvent::Deleted(id.clone()));
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        Ok(self.feed.subscribe())
    }
}
