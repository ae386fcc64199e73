//! Read-time catalog filtering.
//!
//! These are projections over a borrowed collection: cheap, synchronous, and
//! safe to run on every keystroke. The input is never modified.

use crate::models::Product;

/// Case-insensitive substring match against name or description.
///
/// An empty (or whitespace-only) query returns every product in order.
#[must_use]
pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    let normalized_query = normalize_query(query);
    products
        .iter()
        .filter(|product| product_matches_query(product, &normalized_query))
        .cloned()
        .collect()
}

/// Listings owned by `username`, in collection order.
#[must_use]
pub fn filter_by_seller(products: &[Product], username: &str) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.is_listed_by(username))
        .cloned()
        .collect()
}

fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn product_matches_query(product: &Product, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(query)
        || product.description.to_lowercase().contains(query)
}
