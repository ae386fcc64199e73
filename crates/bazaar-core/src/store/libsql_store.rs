//! libSQL-backed store, local or replicated from Turso.

use std::path::Path;

use async_trait::async_trait;
use libsql::{params, Value as SqlValue};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{ChangeEvent, ChangeFeed, RemoteStore, Subscription};
use crate::db::{Database, SyncConfig};
use crate::error::{Error, Result};
use crate::models::{NewProduct, ProductId, ProductRecord};
use crate::util::unix_timestamp_millis;

const SELECT_PRODUCTS: &str = "SELECT id, created_at, name, price, description, seller_username, images
     FROM products
     ORDER BY created_at DESC, rowid DESC";

/// [`RemoteStore`] backed by a libSQL database.
///
/// Mutations made through this handle are announced on its change feed.
pub struct LibSqlRemoteStore {
    db: Mutex<Database>,
    feed: ChangeFeed,
}

impl LibSqlRemoteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            feed: ChangeFeed::new(),
        }
    }

    /// Open a store at `db_path`, as an embedded replica when `sync_config` is set.
    pub async fn open_path(db_path: &Path, sync_config: Option<SyncConfig>) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = if let Some(config) = sync_config.filter(SyncConfig::is_configured) {
            tracing::info!(
                "Catalog sync enabled with Turso: {}",
                config.url.as_deref().unwrap_or("unknown")
            );
            Database::open_with_sync(db_path, config).await?
        } else {
            tracing::info!("Running catalog in local-only mode (no sync config)");
            Database::open(db_path).await?
        };
        Ok(Self::new(db))
    }

    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// Pull remote changes into the local replica.
    pub async fn sync(&self) -> Result<()> {
        self.db.lock().await.sync().await
    }

    pub async fn is_sync_enabled(&self) -> bool {
        self.db.lock().await.is_sync_enabled()
    }

    /// Overwrite an existing listing and announce it on the feed.
    pub async fn update_record(&self, record: ProductRecord) -> Result<()> {
        let images = encode_images(record.images.as_ref())?;
        let rows = {
            let db = self.db.lock().await;
            db.connection()
                .execute(
                    "UPDATE products
                     SET name = ?, price = ?, description = ?, seller_username = ?, images = ?
                     WHERE id = ?",
                    params![
                        record.name.as_str(),
                        record.price.as_str(),
                        record.description.as_str(),
                        record.seller_username.as_str(),
                        images,
                        record.id.as_str()
                    ],
                )
                .await?
        };

        if rows == 0 {
            return Err(Error::NotFound(record.id.to_string()));
        }

        self.feed.publish(ChangeEvent::Updated(record));
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn parse_record(row: &libsql::Row) -> Result<ProductRecord> {
        let id: String = row.get(0)?;
        Ok(ProductRecord {
            id: ProductId::new(id),
            created_at: row.get(1)?,
            name: row.get(2)?,
            price: row.get(3)?,
            description: row.get(4)?,
            seller_username: row.get(5)?,
            images: decode_images(row.get_value(6)?),
        })
    }
}

#[async_trait]
impl RemoteStore for LibSqlRemoteStore {
    async fn query_snapshot(&self) -> Result<Vec<ProductRecord>> {
        let db = self.db.lock().await;
        let mut rows = db.connection().query(SELECT_PRODUCTS, ()).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::parse_record(&row)?);
        }
        Ok(records)
    }

    async fn insert(&self, product: NewProduct) -> Result<ProductRecord> {
        let product = product.validate()?;
        let images = serde_json::to_value(&product.images)?;
        let record = ProductRecord {
            id: ProductId::generate(),
            created_at: unix_timestamp_millis(),
            name: product.name,
            price: product.price,
            description: product.description,
            seller_username: product.seller_username,
            images: Some(images),
        };

        {
            let db = self.db.lock().await;
            db.connection()
                .execute(
                    "INSERT INTO products (id, created_at, name, price, description, seller_username, images)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        record.id.as_str(),
                        record.created_at,
                        record.name.as_str(),
                        record.price.as_str(),
                        record.description.as_str(),
                        record.seller_username.as_str(),
                        encode_images(record.images.as_ref())?
                    ],
                )
                .await?;
        }

        tracing::info!("Published product {}", record.id);
        self.feed.publish(ChangeEvent::Inserted(record.clone()));
        Ok(record)
    }

    async fn delete(&self, id: &ProductId) -> Result<()> {
        let rows = {
            let db = self.db.lock().await;
            db.connection()
                .execute("DELETE FROM products WHERE id = ?", params![id.as_str()])
                .await?
        };

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.feed.publish(ChangeEvent::Deleted(id.clone()));
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        Ok(self.feed.subscribe())
    }
}

fn encode_images(images: Option<&Value>) -> Result<SqlValue> {
    match images {
        None | Some(Value::Null) => Ok(SqlValue::Null),
        Some(value) => Ok(SqlValue::Text(serde_json::to_string(value)?)),
    }
}

/// Read the raw `images` column. Text that is not JSON is a legacy bare payload.
fn decode_images(value: SqlValue) -> Option<Value> {
    match value {
        SqlValue::Text(text) => {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        }
        SqlValue::Integer(number) => Some(Value::from(number)),
        SqlValue::Real(number) => Some(Value::from(number)),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}
