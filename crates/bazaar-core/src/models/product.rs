//! Product model

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum number of images a listing may carry when it is published.
pub const MAX_PRODUCT_IMAGES: usize = 3;

/// Opaque product identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an identifier handed out by a store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh time-sortable identifier (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A catalog listing as held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Creation timestamp (Unix ms), canonical sort key
    pub created_at: i64,
    pub name: String,
    /// Free-text price as entered by the seller
    pub price: String,
    pub description: String,
    /// Owning seller
    pub seller_username: String,
    /// Inline image payloads, normalized to a sequence
    pub images: Vec<String>,
}

impl Product {
    /// Whether `username` owns this listing.
    pub fn is_listed_by(&self, username: &str) -> bool {
        let username = username.trim();
        !username.is_empty() && self.seller_username.trim() == username
    }

    /// First image payload, used as the listing thumbnail.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Price text normalized for display. The stored `price` is never changed.
    ///
    /// Whitespace is collapsed, and plain decimal amounts with a fractional
    /// part are shown with two decimals (`"12.5"` becomes `"12.50"`).
    pub fn display_price(&self) -> String {
        let collapsed = self.price.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.split_once('.') {
            Some((whole, fraction))
                if !whole.is_empty()
                    && whole.chars().all(|c| c.is_ascii_digit())
                    && (1..=2).contains(&fraction.len())
                    && fraction.chars().all(|c| c.is_ascii_digit()) =>
            {
                format!("{whole}.{fraction:0<2}")
            }
            _ => collapsed,
        }
    }
}

/// A listing draft submitted by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub description: String,
    pub seller_username: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewProduct {
    /// Check publishing rules and return a trimmed copy of the draft.
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Product name cannot be empty".to_string(),
            ));
        }

        let seller_username = self.seller_username.trim().to_string();
        if seller_username.is_empty() {
            return Err(Error::InvalidInput(
                "Seller username cannot be empty".to_string(),
            ));
        }

        if self.images.len() > MAX_PRODUCT_IMAGES {
            return Err(Error::InvalidInput(format!(
                "A listing can carry at most {MAX_PRODUCT_IMAGES} images (got {})",
                self.images.len()
            )));
        }

        Ok(Self {
            name,
            price: self.price.trim().to_string(),
            description: self.description.trim().to_string(),
            seller_username,
            images: self.images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_price(price: &str) -> Product {
        Product {
            id: ProductId::new("p-1"),
            created_at: 1,
            name: "Lamp".to_string(),
            price: price.to_string(),
            description: String::new(),
            seller_username: "ana".to_string(),
            images: Vec::new(),
        }
    }

    fn draft() -> NewProduct {
        NewProduct {
            name: "  Desk lamp ".to_string(),
            price: " 20 ".to_string(),
            description: "Warm light".to_string(),
            seller_username: "ana".to_string(),
            images: vec!["data:image/png;base64,AAA".to_string()],
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ProductId::generate(), ProductId::generate());
    }

    #[test]
    fn product_id_parse_keeps_text() {
        let id: ProductId = "abc-123".parse().unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn display_price_pads_fraction() {
        assert_eq!(product_with_price("12.5").display_price(), "12.50");
        assert_eq!(product_with_price(" 12.05 ").display_price(), "12.05");
    }

    #[test]
    fn display_price_leaves_free_text_alone() {
        assert_eq!(product_with_price("15").display_price(), "15");
        assert_eq!(
            product_with_price("  ask   the seller ").display_price(),
            "ask the seller"
        );
        assert_eq!(product_with_price("1.2.3").display_price(), "1.2.3");
    }

    #[test]
    fn display_price_does_not_touch_stored_value() {
        let product = product_with_price("12.5");
        let _ = product.display_price();
        assert_eq!(product.price, "12.5");
    }

    #[test]
    fn ownership_is_exact_match() {
        let product = product_with_price("1");
        assert!(product.is_listed_by("ana"));
        assert!(product.is_listed_by(" ana "));
        assert!(!product.is_listed_by("Ana"));
        assert!(!product.is_listed_by(""));
    }

    #[test]
    fn validate_trims_fields() {
        let validated = draft().validate().unwrap();
        assert_eq!(validated.name, "Desk lamp");
        assert_eq!(validated.price, "20");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut invalid = draft();
        invalid.name = "   ".to_string();
        assert!(matches!(invalid.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_too_many_images() {
        let mut invalid = draft();
        invalid.images = vec!["a".to_string(); MAX_PRODUCT_IMAGES + 1];
        assert!(matches!(invalid.validate(), Err(Error::InvalidInput(_))));

        let mut at_limit = draft();
        at_limit.images = vec!["a".to_string(); MAX_PRODUCT_IMAGES];
        assert!(at_limit.validate().is_ok());
    }
}
