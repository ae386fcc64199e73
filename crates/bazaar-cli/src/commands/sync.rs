use bazaar_core::CatalogSynchronizer;

use crate::commands::common::{open_store, StoreSettings};
use crate::error::CliError;

pub async fn run_sync(settings: &StoreSettings) -> Result<(), CliError> {
    if settings.sync.is_none() {
        return Err(CliError::SyncNotConfigured);
    }

    let store = open_store(settings).await?;
    if !store.is_sync_enabled().await {
        return Err(CliError::SyncNotConfigured);
    }
    store.sync().await?;

    let catalog = CatalogSynchronizer::new(store);
    catalog.load().await?;
    println!("Sync completed ({} listings)", catalog.len());
    Ok(())
}
