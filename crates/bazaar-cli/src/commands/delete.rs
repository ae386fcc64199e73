use bazaar_core::{DeleteOutcome, OptimisticMutationController, ProductId};

use crate::commands::common::{
    load_catalog, normalize_product_identifier, resolve_product_id, StoreSettings,
};
use crate::error::CliError;

pub async fn run_delete(id: &str, settings: &StoreSettings) -> Result<ProductId, CliError> {
    let normalized_id = normalize_product_identifier(id)?;
    let catalog = load_catalog(settings).await?;
    let product_id = resolve_product_id(&normalized_id, catalog.current_view().products())?;

    let controller = OptimisticMutationController::new(catalog);
    match controller.delete_product(&product_id).await {
        DeleteOutcome::Committed(id) => {
            println!("{id}");
            Ok(id)
        }
        DeleteOutcome::Rejected(id) => Err(CliError::ProductNotFound(id.to_string())),
        DeleteOutcome::Failed { reason, resync, .. } => {
            if let Err(error) = resync {
                tracing::warn!("Catalog reload after failed delete also failed: {error}");
            }
            Err(CliError::DeleteFailed(reason))
        }
    }
}
