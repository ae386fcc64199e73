//! Wire shape of a product as exchanged with the remote store.
//!
//! Records written by older clients are not uniform: `images` may be missing,
//! `null`, a single string, or an array. Reading never fails on that field;
//! [`normalize_images`] coerces whatever arrived into a sequence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::product::{Product, ProductId};

/// Product record as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub created_at: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub seller_username: String,
    #[serde(default)]
    pub images: Option<Value>,
}

impl ProductRecord {
    /// Convert into the client model, normalizing the image field.
    pub fn into_product(self) -> Product {
        Product {
            id: self.id,
            created_at: self.created_at,
            name: self.name,
            price: self.price,
            description: self.description,
            seller_username: self.seller_username,
            images: normalize_images(self.images),
        }
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            created_at: product.created_at,
            name: product.name,
            price: product.price,
            description: product.description,
            seller_username: product.seller_username,
            images: Some(Value::Array(
                product.images.into_iter().map(Value::String).collect(),
            )),
        }
    }
}

/// Coerce an untrusted image field into an ordered sequence.
///
/// Absent or `null` becomes empty, an array passes through in order, and any
/// other value becomes a one-element sequence. Non-string values are carried
/// as their JSON text.
pub fn normalize_images(images: Option<Value>) -> Vec<String> {
    match images {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(value_to_payload).collect(),
        Some(scalar) => vec![value_to_payload(scalar)],
    }
}

fn value_to_payload(value: Value) -> String {
    match value {
        Value::String(payload) => payload,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_images_become_empty() {
        assert!(normalize_images(None).is_empty());
        assert!(normalize_images(Some(Value::Null)).is_empty());
    }

    #[test]
    fn scalar_image_becomes_single_element() {
        assert_eq!(
            normalize_images(Some(json!("data:image/png;base64,AAA"))),
            vec!["data:image/png;base64,AAA".to_string()]
        );
        assert_eq!(normalize_images(Some(json!(42))), vec!["42".to_string()]);
    }

    #[test]
    fn array_passes_through_in_order() {
        assert_eq!(
            normalize_images(Some(json!(["a", "b", "c"]))),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(normalize_images(Some(json!([]))).is_empty());
    }

    #[test]
    fn deserializes_record_without_images() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "p-1",
            "createdAt": 1_700_000_000_000_i64,
            "name": "Bike",
            "price": "100",
            "description": "Red",
            "sellerUsername": "ana"
        }))
        .unwrap();

        let product = record.into_product();
        assert_eq!(product.id.as_str(), "p-1");
        assert!(product.images.is_empty());
    }

    #[test]
    fn deserializes_legacy_scalar_images() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "p-2",
            "createdAt": 5,
            "images": "single"
        }))
        .unwrap();

        assert_eq!(record.into_product().images, vec!["single".to_string()]);
    }
}
