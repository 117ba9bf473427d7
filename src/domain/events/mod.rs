//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: i32, name: String },
    Updated { product_id: i32 },
    Deleted { product_id: i32 },
    PriceChanged { product_id: i32, price: Decimal },
    StockAdjusted { product_id: i32, quantity: i32, stock: i32 },
    ImagesAdded { product_id: i32, count: usize },
    ImageRemoved { product_id: i32, image_id: i32 },
}

impl ProductEvent {
    /// NATS subject suffix for this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::PriceChanged { .. } => "price_changed",
            Self::StockAdjusted { .. } => "stock_adjusted",
            Self::ImagesAdded { .. } => "images_added",
            Self::ImageRemoved { .. } => "image_removed",
        }
    }

    pub fn product_id(&self) -> i32 {
        match self {
            Self::Created { product_id, .. } | Self::Updated { product_id } | Self::Deleted { product_id }
            | Self::PriceChanged { product_id, .. } | Self::StockAdjusted { product_id, .. }
            | Self::ImagesAdded { product_id, .. } | Self::ImageRemoved { product_id, .. } => *product_id,
        }
    }
}
