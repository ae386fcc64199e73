//! Publishing new listings.

use crate::models::{NewProduct, ProductRecord};
use crate::store::RemoteStore;
use crate::Result;

/// Validate `draft` and hand it to the store.
///
/// The catalog is not touched here; the new listing arrives through the
/// change feed or the next load.
pub async fn publish_product(store: &dyn RemoteStore, draft: NewProduct) -> Result<ProductRecord> {
    let draft = draft.validate()?;
    let record = store.insert(draft).await?;
    tracing::info!("Published listing {} for {}", record.id, record.seller_username);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRemoteStore;
    use crate::Error;

    fn draft(images: usize) -> NewProduct {
        NewProduct {
            name: "Guitar".to_string(),
            price: "150".to_string(),
            description: "Six strings".to_string(),
            seller_username: "ana".to_string(),
            images: vec!["data:image/png;base64,AAA".to_string(); images],
        }
    }

    #[tokio::test]
    async fn publishes_valid_draft() {
        let store = InMemoryRemoteStore::new();
        let record = publish_product(&store, draft(2)).await.unwrap();
        assert!(store.contains(&record.id));
    }

    #[tokio::test]
    async fn rejects_before_reaching_store() {
        let store = InMemoryRemoteStore::new();
        store.fail_next_insert("should not be reached");

        let result = publish_product(&store, draft(4)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        // The injected fault is still armed: the store was never called.
        let result = publish_product(&store, draft(1)).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
