//! The authoritative remote store contract and its implementations.

mod feed;
mod libsql_store;
mod memory;

use async_trait::async_trait;

use crate::models::{NewProduct, ProductId, ProductRecord};
use crate::Result;

pub use feed::{ChangeFeed, Subscription};
pub use libsql_store::LibSqlRemoteStore;
pub use memory::InMemoryRemoteStore;

/// A change pushed by the store outside of any request/response call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Inserted(ProductRecord),
    Updated(ProductRecord),
    Deleted(ProductId),
}

impl ChangeEvent {
    /// Identifier of the entity the event refers to.
    pub const fn product_id(&self) -> &ProductId {
        match self {
            Self::Inserted(record) | Self::Updated(record) => &record.id,
            Self::Deleted(id) => id,
        }
    }
}

/// One message on a subscription channel.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Event(ChangeEvent),
    TransportError(String),
}

/// Authoritative product store reached over a query interface and a
/// change-notification interface.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All current records, newest first by `created_at`.
    async fn query_snapshot(&self) -> Result<Vec<ProductRecord>>;

    /// Publish a new listing. The store assigns `id` and `created_at`.
    async fn insert(&self, product: NewProduct) -> Result<ProductRecord>;

    /// Remove a listing.
    async fn delete(&self, id: &ProductId) -> Result<()>;

    /// Open the change feed.
    async fn subscribe(&self) -> Result<Subscription>;
}
