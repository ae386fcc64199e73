use bazaar_core::catalog::publish_product;
use bazaar_core::{NewProduct, ProductRecord};

use crate::commands::common::{open_store, StoreSettings};
use crate::error::CliError;

pub async fn run_publish(
    draft: NewProduct,
    settings: &StoreSettings,
) -> Result<ProductRecord, CliError> {
    let store = open_store(settings).await?;
    let record = publish_product(store.as_ref(), draft).await?;
    println!("{}", record.id);
    Ok(record)
}
