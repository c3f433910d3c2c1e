use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::OrderItem;
use super::errors::ProductError;
use super::value_objects::{ProductDetails, ProductItem, ProductKind};

// ============================================================================
// Product Catalog - products and their sellable variants
// ============================================================================
//
// Order lines are resolved here: a line names a product item and a quantity,
// and the catalog supplies the display name and barcode the scan gate uses.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: ProductDetails,
    pub created_at: DateTime<Utc>,
}

/// Body of a new product item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItemDraft {
    pub sku: String,
    pub barcode: String,
    #[serde(default)]
    pub size: Option<u8>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub quantity: i32,
}

/// One requested line of a new order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<Uuid, Product>,
    items: HashMap<Uuid, ProductItem>,
}

#[derive(Debug, Default)]
pub struct ProductCatalog {
    state: RwLock<CatalogState>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_product(&self, mut details: ProductDetails) -> Result<Product, ProductError> {
        details.validate()?;
        details.name = details.name.trim().to_string();

        let product = Product { id: Uuid::new_v4(), details, created_at: Utc::now() };
        self.state.write().await.products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, name = %product.details.name, "Product added");
        Ok(product)
    }

    /// Adds a variant; shoes need one of their offered sizes, accessories none
    pub async fn add_item(&self, product_id: Uuid, draft: ProductItemDraft) -> Result<ProductItem, ProductError> {
        let mut state = self.state.write().await;
        let product = state.products.get(&product_id).ok_or(ProductError::UnknownProduct(product_id))?;

        match (&product.details.kind, draft.size) {
            (ProductKind::Shoe { .. }, None) => return Err(ProductError::SizeRequired),
            (ProductKind::Shoe { sizes, .. }, Some(size)) if !sizes.contains(&size) => {
                return Err(ProductError::SizeNotOffered(size));
            }
            (ProductKind::Accessory { .. }, Some(_)) => return Err(ProductError::SizeOnAccessory),
            _ => {}
        }
        if draft.quantity < 0 {
            return Err(ProductError::NegativeStock(draft.quantity));
        }

        let item = ProductItem {
            id: Uuid::new_v4(),
            product_id,
            sku: draft.sku.trim().to_string(),
            barcode: draft.barcode.trim().to_string(),
            size: draft.size,
            color: draft.color,
            quantity: draft.quantity,
        };
        item.validate()?;

        if state.items.values().any(|existing| existing.barcode == item.barcode) {
            return Err(ProductError::DuplicateBarcode(item.barcode));
        }

        state.items.insert(item.id, item.clone());
        tracing::info!(
            product_id = %product_id,
            product_item_id = %item.id,
            barcode = %item.barcode,
            "Product item added"
        );
        Ok(item)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, ProductError> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .cloned()
            .ok_or(ProductError::UnknownProduct(product_id))
    }

    /// Products sorted by name
    pub async fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.state.read().await.products.values().cloned().collect();
        products.sort_by(|a, b| a.details.name.cmp(&b.details.name));
        products
    }

    pub async fn items_for(&self, product_id: Uuid) -> Result<Vec<ProductItem>, ProductError> {
        let state = self.state.read().await;
        if !state.products.contains_key(&product_id) {
            return Err(ProductError::UnknownProduct(product_id));
        }

        let mut items: Vec<_> = state
            .items
            .values()
            .filter(|item| item.product_id == product_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(items)
    }

    /// Turns requested lines into order items; quantities are checked by the order
    pub async fn order_items(&self, lines: &[OrderLine]) -> Result<Vec<OrderItem>, ProductError> {
        let state = self.state.read().await;

        lines
            .iter()
            .map(|line| {
                let item = state
                    .items
                    .get(&line.product_item_id)
                    .ok_or(ProductError::UnknownProductItem(line.product_item_id))?;
                let product = state
                    .products
                    .get(&item.product_id)
                    .ok_or(ProductError::UnknownProduct(item.product_id))?;
                Ok(OrderItem::for_product_item(item, &product.details.name, line.quantity))
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Gender;

    fn sneaker() -> ProductDetails {
        ProductDetails {
            name: "  Adidas Samba OG ".to_string(),
            brand_id: None,
            price: 2_600_000,
            kind: ProductKind::Shoe { sizes: vec![40, 41, 42], gender: Gender::Unisex, material: None },
        }
    }

    fn belt() -> ProductDetails {
        ProductDetails {
            name: "Leather belt".to_string(),
            brand_id: None,
            price: 320_000,
            kind: ProductKind::Accessory { category: "Belts".to_string(), dimensions: None },
        }
    }

    fn draft(barcode: &str, size: Option<u8>) -> ProductItemDraft {
        ProductItemDraft {
            sku: format!("SKU-{}", barcode.trim()),
            barcode: barcode.to_string(),
            size,
            color: Some("White".to_string()),
            quantity: 5,
        }
    }

    #[tokio::test]
    async fn test_add_product_and_items() {
        let catalog = ProductCatalog::new();
        let product = catalog.add_product(sneaker()).await.unwrap();
        assert_eq!(product.details.name, "Adidas Samba OG");

        let item = catalog.add_item(product.id, draft(" 8935000041 ", Some(41))).await.unwrap();
        assert_eq!(item.barcode, "8935000041");
        assert_eq!(catalog.items_for(product.id).await.unwrap(), vec![item]);
        assert_eq!(catalog.list_products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_item_size_rules() {
        let catalog = ProductCatalog::new();
        let shoe = catalog.add_product(sneaker()).await.unwrap();
        let accessory = catalog.add_product(belt()).await.unwrap();

        assert_eq!(catalog.add_item(shoe.id, draft("S1", None)).await, Err(ProductError::SizeRequired));
        assert_eq!(catalog.add_item(shoe.id, draft("S1", Some(44))).await, Err(ProductError::SizeNotOffered(44)));
        assert_eq!(catalog.add_item(accessory.id, draft("B1", Some(40))).await, Err(ProductError::SizeOnAccessory));
        assert!(catalog.add_item(accessory.id, draft("B1", None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_barcodes_are_unique() {
        let catalog = ProductCatalog::new();
        let shoe = catalog.add_product(sneaker()).await.unwrap();
        catalog.add_item(shoe.id, draft("X1", Some(40))).await.unwrap();

        assert_eq!(
            catalog.add_item(shoe.id, draft("X1 ", Some(41))).await,
            Err(ProductError::DuplicateBarcode("X1".to_string()))
        );
        assert_eq!(catalog.add_item(shoe.id, draft("  ", Some(41))).await, Err(ProductError::EmptyBarcode));
    }

    #[tokio::test]
    async fn test_order_items_resolve_variants() {
        let catalog = ProductCatalog::new();
        let shoe = catalog.add_product(sneaker()).await.unwrap();
        let item = catalog.add_item(shoe.id, draft("X1", Some(42))).await.unwrap();

        let lines = [OrderLine { product_item_id: item.id, quantity: 2 }];
        let items = catalog.order_items(&lines).await.unwrap();
        assert_eq!(items[0].name, "Adidas Samba OG - 42 / White");
        assert_eq!(items[0].barcode, "X1");
        assert_eq!(items[0].quantity, 2);

        let missing = Uuid::new_v4();
        let lines = [OrderLine { product_item_id: missing, quantity: 1 }];
        assert_eq!(catalog.order_items(&lines).await, Err(ProductError::UnknownProductItem(missing)));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let catalog = ProductCatalog::new();
        let missing = Uuid::new_v4();
        assert_eq!(catalog.items_for(missing).await, Err(ProductError::UnknownProduct(missing)));
        assert_eq!(catalog.get_product(missing).await, Err(ProductError::UnknownProduct(missing)));
        assert_eq!(
            catalog.add_item(missing, draft("Z", None)).await,
            Err(ProductError::UnknownProduct(missing))
        );
    }
}
