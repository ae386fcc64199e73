use crate::commands::common::{list_products, print_products, StoreSettings};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    seller: Option<&str>,
    as_json: bool,
    settings: &StoreSettings,
) -> Result<(), CliError> {
    let products = list_products(limit, seller, settings).await?;
    print_products(&products, as_json)
}
