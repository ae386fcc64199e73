use std::path::{Path, PathBuf};
use std::sync::Arc;

use bazaar_core::config::CatalogConfig;
use bazaar_core::db::SyncConfig;
use bazaar_core::search::filter_by_seller;
use bazaar_core::store::LibSqlRemoteStore;
use bazaar_core::{CatalogSynchronizer, Product, ProductId};
use chrono::Utc;
use serde::Serialize;

use crate::error::CliError;

/// Where the CLI keeps its data and how it reaches the remote replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub db_path: PathBuf,
    pub sync: Option<SyncConfig>,
}

impl StoreSettings {
    /// Resolve settings from the config file, the environment, and CLI flags.
    pub fn resolve(
        cli_db_path: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let config = CatalogConfig::load_file(&config_path)?.with_env()?;
        Ok(Self::from_config(cli_db_path, &config))
    }

    pub fn from_config(cli_db_path: Option<PathBuf>, config: &CatalogConfig) -> Self {
        Self {
            db_path: cli_db_path
                .or_else(|| config.db_path.clone())
                .unwrap_or_else(default_db_path),
            sync: config.sync_config(),
        }
    }

    pub const fn local(db_path: PathBuf) -> Self {
        Self {
            db_path,
            sync: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListItem {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub seller_username: String,
    pub images: Vec<String>,
    pub created_at: i64,
    pub relative_time: String,
}

pub async fn open_store(settings: &StoreSettings) -> Result<Arc<LibSqlRemoteStore>, CliError> {
    let store = LibSqlRemoteStore::open_path(&settings.db_path, settings.sync.clone()).await?;
    Ok(Arc::new(store))
}

/// Open the store and run one full load through the synchronizer.
pub async fn load_catalog(settings: &StoreSettings) -> Result<Arc<CatalogSynchronizer>, CliError> {
    let store = open_store(settings).await?;
    let catalog = Arc::new(CatalogSynchronizer::new(store));
    catalog.load().await?;
    Ok(catalog)
}

pub async fn list_products(
    limit: usize,
    seller: Option<&str>,
    settings: &StoreSettings,
) -> Result<Vec<Product>, CliError> {
    let catalog = load_catalog(settings).await?;
    let view = catalog.current_view();
    let mut products = match seller {
        Some(username) => filter_by_seller(view.products(), username.trim()),
        None => view.products().to_vec(),
    };
    products.truncate(limit);
    Ok(products)
}

pub async fn search_products(
    query: &str,
    limit: usize,
    settings: &StoreSettings,
) -> Result<Vec<Product>, CliError> {
    let catalog = load_catalog(settings).await?;
    let mut products = catalog.search(query);
    products.truncate(limit);
    Ok(products)
}

/// Match `query` against full ids first, then unique id prefixes.
pub fn resolve_product_id(query: &str, products: &[Product]) -> Result<ProductId, CliError> {
    if let Some(product) = products.iter().find(|product| product.id.as_str() == query) {
        return Ok(product.id.clone());
    }

    let matching_ids = products
        .iter()
        .filter(|product| product.id.as_str().starts_with(query))
        .map(|product| product.id.clone())
        .take(3)
        .collect::<Vec<_>>();

    match matching_ids.as_slice() {
        [] => Err(CliError::ProductNotFound(query.to_string())),
        [id] => Ok(id.clone()),
        _ => {
            let options = matching_ids
                .iter()
                .map(|id| id.as_str().chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousProductId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn format_product_lines(products: &[Product]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    products
        .iter()
        .map(|product| {
            let short_id = product.id.as_str().chars().take(13).collect::<String>();
            let name = truncate_chars(&product.name, 32);
            let price = product.display_price();
            let seller = &product.seller_username;
            let relative_time = format_relative_time(product.created_at, now_ms);

            format!("{short_id:<13}  {name:<32}  {price:>10}  @{seller:<16}  {relative_time}")
        })
        .collect()
}

pub fn product_to_list_item(product: &Product) -> ProductListItem {
    let now_ms = Utc::now().timestamp_millis();
    ProductListItem {
        id: product.id.to_string(),
        name: product.name.clone(),
        price: product.display_price(),
        description: product.description.clone(),
        seller_username: product.seller_username.clone(),
        images: product.images.clone(),
        created_at: product.created_at,
        relative_time: format_relative_time(product.created_at, now_ms),
    }
}

pub fn print_products(products: &[Product], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = products
            .iter()
            .map(product_to_list_item)
            .collect::<Vec<ProductListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if products.is_empty() {
        println!("No listings found.");
    } else {
        for line in format_product_lines(products) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_product_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyProductId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("bazaar").join("bazaar.db")
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(data_dir)
        .join("bazaar")
        .join("config.json")
}

fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| Path::new(".").to_path_buf())
}
