use crate::commands::common::{
    normalize_search_query, print_products, search_products, StoreSettings,
};
use crate::error::CliError;

pub async fn run_search(
    query: &str,
    limit: usize,
    as_json: bool,
    settings: &StoreSettings,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let products = search_products(&normalized_query, limit, settings).await?;
    print_products(&products, as_json)
}
