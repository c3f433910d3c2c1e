#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Price must be positive, got {0}")]
    InvalidPrice(i64),

    #[error("A shoe needs at least one size")]
    NoSizes,

    #[error("Shoe size {0} is outside 30..=50")]
    SizeOutOfRange(u8),

    #[error("Shoe size {0} is listed twice")]
    DuplicateSize(u8),

    #[error("Accessory category cannot be empty")]
    EmptyCategory,

    #[error("Barcode cannot be empty")]
    EmptyBarcode,

    #[error("Barcode {0} is already used by another product item")]
    DuplicateBarcode(String),

    #[error("Size {0} is not offered for this shoe")]
    SizeNotOffered(u8),

    #[error("A shoe item needs a size")]
    SizeRequired,

    #[error("Accessories are not sized")]
    SizeOnAccessory,

    #[error("Stock cannot be negative, got {0}")]
    NegativeStock(i32),

    #[error("Product not found: {0}")]
    UnknownProduct(uuid::Uuid),

    #[error("Product item not found: {0}")]
    UnknownProductItem(uuid::Uuid),
}

impl ProductError {
    /// Short label for API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ProductError::UnknownProduct(_) | ProductError::UnknownProductItem(_) => "product_not_found",
            ProductError::DuplicateBarcode(_) => "duplicate_barcode",
            _ => "invalid_product",
        }
    }
}
