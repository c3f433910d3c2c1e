use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductItem;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product variant being ordered
    pub product_item_id: Uuid,
    pub name: String,
    pub barcode: String,
    pub quantity: i32,
}

impl OrderItem {
    pub fn for_product_item(item: &ProductItem, product_name: &str, quantity: i32) -> Self {
        Self {
            product_item_id: item.id,
            name: format!("{} - {}", product_name, item.variant_label()),
            barcode: item.barcode.clone(),
            quantity,
        }
    }
}
