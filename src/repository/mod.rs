//! Persistence port for catalog rows.
//!
//! Every method that writes returns the number of rows the commit changed.
//! Multi-row writes are committed atomically by each implementation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::{NewProduct, NewProductImage, Page, Product, ProductImage};
use crate::Result;

pub use memory::InMemoryCatalogRepository;
pub use postgres::PgCatalogRepository;

pub type DynCatalogRepository = Arc<dyn CatalogRepository + Send + Sync>;

/// Filters for a paged product search.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductQuery {
    /// Case-sensitive substring of the product name. Empty means no filter.
    pub keyword: Option<String>,
    /// Products must belong to one of these categories. Empty means any.
    pub category_ids: Vec<i32>,
    /// Without a category filter, also return products that have no category.
    pub include_uncategorized: bool,
    /// One row per product. Otherwise one row per matching category link.
    pub distinct: bool,
    pub page: Page,
}

impl ProductQuery {
    pub fn keyword(&self) -> Option<&str> { self.keyword.as_deref().filter(|k| !k.is_empty()) }
}

/// Image change committed together with a product row.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageWrite {
    Replace(ProductImage),
    Append(NewProductImage),
}

#[async_trait]
pub trait CatalogRepository {
    async fn find_product(&self, id: i32) -> Result<Option<Product>>;

    /// Inserts the product with its images, returning the new id and rows affected.
    async fn insert_product(&self, product: NewProduct, images: Vec<NewProductImage>) -> Result<(i32, u64)>;

    /// Writes name, detail and description only, plus the optional image change.
    async fn save_product(&self, product: &Product, image: Option<ImageWrite>) -> Result<u64>;

    async fn update_price(&self, id: i32, price: Decimal) -> Result<u64>;

    /// Adds `quantity` to the stored stock and returns the new value, `None` when no row matched.
    async fn adjust_stock(&self, id: i32, quantity: i32) -> Result<Option<i32>>;

    async fn increment_view_count(&self, id: i32) -> Result<u64>;

    /// Removes the product; category links and image rows go with it.
    async fn delete_product(&self, id: i32) -> Result<u64>;

    /// Total matching rows before paging, plus the requested page ordered by product id.
    async fn search_products(&self, query: &ProductQuery) -> Result<(u64, Vec<Product>)>;

    async fn find_default_image(&self, product_id: i32) -> Result<Option<ProductImage>>;

    /// Images of a product ordered by sort order, then id.
    async fn list_images(&self, product_id: i32) -> Result<Vec<ProductImage>>;

    async fn find_image(&self, image_id: i32) -> Result<Option<ProductImage>>;

    async fn insert_images(&self, product_id: i32, images: Vec<NewProductImage>) -> Result<u64>;

    /// Saves the image; when it is the default, its siblings lose the flag in the same commit.
    async fn save_image(&self, image: &ProductImage) -> Result<u64>;

    /// Deletes the image and optionally flags `promote` as the new default.
    async fn delete_image(&self, image_id: i32, promote: Option<i32>) -> Result<u64>;
}
