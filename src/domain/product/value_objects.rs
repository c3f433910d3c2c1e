use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::errors::ProductError;

// ============================================================================
// Product Value Objects
// ============================================================================

pub const SHOE_SIZES: std::ops::RangeInclusive<u8> = 30..=50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Men,
    Women,
    Unisex,
    Kids,
}

/// Kind-specific fields, tagged by `kind` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProductKind {
    #[serde(rename_all = "camelCase")]
    Shoe {
        sizes: Vec<u8>,
        gender: Gender,
        material: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Accessory {
        category: String,
        dimensions: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub brand_id: Option<Uuid>,
    /// Price in VND
    pub price: i64,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl ProductDetails {
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if self.price <= 0 {
            return Err(ProductError::InvalidPrice(self.price));
        }

        match &self.kind {
            ProductKind::Shoe { sizes, .. } => {
                if sizes.is_empty() {
                    return Err(ProductError::NoSizes);
                }
                let mut seen = BTreeSet::new();
                for &size in sizes {
                    if !SHOE_SIZES.contains(&size) {
                        return Err(ProductError::SizeOutOfRange(size));
                    }
                    if !seen.insert(size) {
                        return Err(ProductError::DuplicateSize(size));
                    }
                }
            }
            ProductKind::Accessory { category, .. } => {
                if category.trim().is_empty() {
                    return Err(ProductError::EmptyCategory);
                }
            }
        }

        Ok(())
    }

    pub fn is_shoe(&self) -> bool {
        matches!(self.kind, ProductKind::Shoe { .. })
    }
}

/// A sellable variant of a product (one size of a shoe, one accessory SKU)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub barcode: String,
    pub size: Option<u8>,
    pub color: Option<String>,
    pub quantity: i32,
}

impl ProductItem {
    pub fn variant_label(&self) -> String {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => format!("{} / {}", size, color),
            (Some(size), None) => size.to_string(),
            (None, Some(color)) => color.clone(),
            (None, None) => self.sku.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.barcode.trim().is_empty() {
            return Err(ProductError::EmptyBarcode);
        }
        if let Some(size) = self.size {
            if !SHOE_SIZES.contains(&size) {
                return Err(ProductError::SizeOutOfRange(size));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderItem;

    fn shoe(sizes: Vec<u8>) -> ProductDetails {
        ProductDetails {
            name: "Biti's Hunter Street".to_string(),
            brand_id: None,
            price: 899_000,
            kind: ProductKind::Shoe {
                sizes,
                gender: Gender::Unisex,
                material: Some("Mesh".to_string()),
            },
        }
    }

    #[test]
    fn test_valid_shoe() {
        assert!(shoe(vec![39, 40, 41]).validate().is_ok());
        assert!(shoe(vec![39]).is_shoe());
    }

    #[test]
    fn test_shoe_size_rules() {
        assert_eq!(shoe(vec![]).validate(), Err(ProductError::NoSizes));
        assert_eq!(shoe(vec![40, 55]).validate(), Err(ProductError::SizeOutOfRange(55)));
        assert_eq!(shoe(vec![40, 41, 40]).validate(), Err(ProductError::DuplicateSize(40)));
    }

    #[test]
    fn test_accessory_rules() {
        let mut tote = ProductDetails {
            name: "Canvas tote".to_string(),
            brand_id: None,
            price: 150_000,
            kind: ProductKind::Accessory {
                category: "Bags".to_string(),
                dimensions: Some("40x35cm".to_string()),
            },
        };
        assert!(tote.validate().is_ok());
        assert!(!tote.is_shoe());

        tote.kind = ProductKind::Accessory { category: " ".to_string(), dimensions: None };
        assert_eq!(tote.validate(), Err(ProductError::EmptyCategory));

        tote.price = 0;
        assert_eq!(tote.validate(), Err(ProductError::InvalidPrice(0)));
    }

    #[test]
    fn test_kind_tag_selects_variant() {
        let json = r#"{
            "name": "Leather belt",
            "brandId": null,
            "price": 320000,
            "kind": "accessory",
            "category": "Belts",
            "dimensions": null
        }"#;

        let details: ProductDetails = serde_json::from_str(json).unwrap();
        assert!(matches!(details.kind, ProductKind::Accessory { ref category, .. } if category == "Belts"));

        let back = serde_json::to_value(shoe(vec![42])).unwrap();
        assert_eq!(back["kind"], "shoe");
        assert_eq!(back["sizes"][0], 42);
    }

    #[test]
    fn test_order_item_from_variant() {
        let variant = ProductItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "HUNTER-42-BLK".to_string(),
            barcode: "8935049500042".to_string(),
            size: Some(42),
            color: Some("Black".to_string()),
            quantity: 12,
        };
        assert!(variant.validate().is_ok());

        let item = OrderItem::for_product_item(&variant, "Biti's Hunter Street", 2);
        assert_eq!(item.name, "Biti's Hunter Street - 42 / Black");
        assert_eq!(item.barcode, variant.barcode);
        assert_eq!(item.product_item_id, variant.id);
    }
}
