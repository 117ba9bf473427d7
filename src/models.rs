//! Request and view models exchanged with the catalog service.
//!
//! The `Validate` rules are transport policy: the HTTP handlers check them,
//! the service accepts any request its operations can carry out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{ImageUpload, Product, ProductImage};

#[derive(Clone, Debug, Validate)]
pub struct ProductCreateRequest {
    pub price: Decimal,
    pub original_price: Decimal,
    pub stock: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub detail: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

#[derive(Clone, Debug, Validate)]
pub struct ProductUpdateRequest {
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub detail: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProductPagedRequest {
    pub keyword: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[validate(range(min = 1))]
    pub page_index: u32,
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
}

#[derive(Clone, Debug, Validate)]
pub struct ProductImageUpdateRequest {
    pub image_id: i32,
    #[validate(length(max = 200))]
    pub caption: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductViewModel {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub stock: i32,
    pub view_count: i32,
    pub date_created: DateTime<Utc>,
    pub detail: String,
    pub description: String,
}

impl From<Product> for ProductViewModel {
    fn from(p: Product) -> Self {
        Self {
            id: p.id, name: p.name, price: p.price, original_price: p.original_price, stock: p.stock,
            view_count: p.view_count, date_created: p.date_created, detail: p.detail, description: p.description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductImageViewModel {
    pub id: i32,
    pub product_id: i32,
    pub caption: String,
    pub image_path: String,
    pub file_size: i64,
    pub is_default: bool,
    pub sort_order: i32,
    pub date_created: DateTime<Utc>,
}

impl From<ProductImage> for ProductImageViewModel {
    fn from(i: ProductImage) -> Self {
        Self {
            id: i.id, product_id: i.product_id, caption: i.caption, image_path: i.image_path, file_size: i.file_size,
            is_default: i.is_default, sort_order: i.sort_order, date_created: i.date_created,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub total_record: u64,
    pub items: Vec<T>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub id: i32,
    pub rows_affected: u64,
}
