//! Frozen product data embedded in order lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The product fields captured onto an order item at purchase time.
///
/// Stored as JSON on the order line. Catalog edits and even product
/// deletion must never alter it; the order shows what the customer bought
/// at the price they paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot() -> ProductSnapshot {
        ProductSnapshot {
            name: "Nimbus X1 Laptop".to_owned(),
            slug: "nimbus-x1-laptop".to_owned(),
            description: "14-inch ultraportable, 32GB RAM".to_owned(),
            price: "1299.00".parse().unwrap(),
            image: Some("https://cdn.techhub.example/nimbus-x1.jpg".to_owned()),
        }
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let original = serde_json::to_string(&snapshot()).unwrap();
        let parsed: ProductSnapshot = serde_json::from_str(&original).unwrap();
        let rewritten = serde_json::to_string(&parsed).unwrap();
        assert_eq!(original, rewritten);
    }

    #[test]
    fn test_stored_snapshot_survives_catalog_edits() {
        let stored = serde_json::to_string(&snapshot()).unwrap();

        // The catalog moves on; the stored line does not.
        let mut current = snapshot();
        current.name = "Nimbus X2 Laptop".to_owned();
        current.price = "1399.00".parse().unwrap();

        let frozen: ProductSnapshot = serde_json::from_str(&stored).unwrap();
        assert_eq!(frozen.name, "Nimbus X1 Laptop");
        assert_ne!(frozen.price, current.price);
    }

    #[test]
    fn test_price_serializes_as_string() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["price"], "1299.00");
    }
}
