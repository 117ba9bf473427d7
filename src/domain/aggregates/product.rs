//! Product aggregate and its image gallery

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub price: Decimal,
    pub original_price: Decimal,
    pub stock: i32,
    pub view_count: i32,
    pub date_created: DateTime<Utc>,
    pub name: String,
    pub detail: String,
    pub description: String,
    pub is_featured: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub caption: String,
    pub image_path: String,
    pub file_size: i64,
    pub is_default: bool,
    pub sort_order: i32,
    pub date_created: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Category { pub id: i32, pub name: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProductInCategory { pub product_id: i32, pub category_id: i32 }

/// A product row that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub price: Decimal,
    pub original_price: Decimal,
    pub stock: i32,
    pub view_count: i32,
    pub date_created: DateTime<Utc>,
    pub name: String,
    pub detail: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewProductImage {
    pub caption: String,
    pub image_path: String,
    pub file_size: i64,
    pub is_default: bool,
    pub sort_order: i32,
    pub date_created: DateTime<Utc>,
}

impl NewProduct {
    pub fn create(price: Decimal, original_price: Decimal, stock: i32, name: impl Into<String>, detail: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            price, original_price, stock, view_count: 0, date_created: Utc::now(),
            name: name.into(), detail: detail.into(), description: description.into(),
        }
    }

    pub fn into_product(self, id: i32) -> Product {
        Product {
            id, price: self.price, original_price: self.original_price, stock: self.stock,
            view_count: self.view_count, date_created: self.date_created, name: self.name,
            detail: self.detail, description: self.description, is_featured: None,
        }
    }
}

impl NewProductImage {
    /// The cover image attached when a product is first created.
    pub fn cover(caption: impl Into<String>, image_path: impl Into<String>, file_size: i64) -> Self {
        Self::new(caption, image_path, file_size, true, 1)
    }

    pub fn new(caption: impl Into<String>, image_path: impl Into<String>, file_size: i64, is_default: bool, sort_order: i32) -> Self {
        Self { caption: caption.into(), image_path: image_path.into(), file_size, is_default, sort_order, date_created: Utc::now() }
    }

    pub fn into_image(self, id: i32, product_id: i32) -> ProductImage {
        ProductImage {
            id, product_id, caption: self.caption, image_path: self.image_path, file_size: self.file_size,
            is_default: self.is_default, sort_order: self.sort_order, date_created: self.date_created,
        }
    }
}

impl Product {
    pub fn rename(&mut self, name: impl Into<String>, detail: impl Into<String>, description: impl Into<String>) {
        self.name = name.into();
        self.detail = detail.into();
        self.description = description.into();
    }

    pub fn set_price(&mut self, new_price: Decimal) { self.price = new_price; }

    /// Stock is allowed to go negative; callers decide whether that is a problem.
    pub fn add_stock(&mut self, quantity: i32) -> Result<(), ProductError> {
        self.stock = self.stock.checked_add(quantity).ok_or(ProductError::StockOutOfRange)?;
        Ok(())
    }

    pub fn record_view(&mut self) { self.view_count = self.view_count.saturating_add(1); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { StockOutOfRange }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::StockOutOfRange => write!(f, "stock is out of range") }
    }
}

/// Sort order for the next image appended to a gallery.
pub fn next_sort_order(images: &[ProductImage]) -> i32 {
    images.iter().map(|i| i.sort_order).max().map_or(1, |max| max + 1)
}

pub fn default_image(images: &[ProductImage]) -> Option<&ProductImage> {
    images.iter().find(|i| i.is_default)
}

/// The image that takes over as default once `removed` leaves the gallery.
pub fn successor_default(images: &[ProductImage], removed: i32) -> Option<&ProductImage> {
    images.iter().filter(|i| i.id != removed).min_by_key(|i| (i.sort_order, i.id))
}

/// Orders a gallery the way it is displayed.
pub fn sort_gallery(images: &mut [ProductImage]) {
    images.sort_by_key(|i| (i.sort_order, i.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i32, sort_order: i32, is_default: bool) -> ProductImage {
        NewProductImage::new("caption", format!("{id}.png"), 10, is_default, sort_order).into_image(id, 1)
    }

    #[test]
    fn test_new_product_starts_unviewed() {
        let p = NewProduct::create(Decimal::new(1999, 2), Decimal::new(2500, 2), 3, "Lamp", "d", "desc").into_product(7);
        assert_eq!(p.id, 7);
        assert_eq!(p.view_count, 0);
        assert_eq!(p.is_featured, None);
    }

    #[test]
    fn test_stock_round_trip() {
        let mut p = NewProduct::create(Decimal::ONE, Decimal::ONE, 10, "P", "", "").into_product(1);
        p.add_stock(5).unwrap();
        p.add_stock(-5).unwrap();
        assert_eq!(p.stock, 10);
        p.add_stock(-12).unwrap();
        assert_eq!(p.stock, -2);
    }

    #[test]
    fn test_stock_overflow_is_rejected() {
        let mut p = NewProduct::create(Decimal::ONE, Decimal::ONE, i32::MAX - 1, "P", "", "").into_product(1);
        assert_eq!(p.add_stock(2), Err(ProductError::StockOutOfRange));
        assert_eq!(p.stock, i32::MAX - 1);
        p.add_stock(1).unwrap();
        assert_eq!(p.stock, i32::MAX);
    }

    #[test]
    fn test_cover_image() {
        let cover = NewProductImage::cover("Lamp", "a.png", 42);
        assert!(cover.is_default);
        assert_eq!(cover.sort_order, 1);
    }

    #[test]
    fn test_gallery_helpers() {
        let images = vec![image(1, 2, true), image(2, 1, false), image(3, 5, false)];
        assert_eq!(next_sort_order(&images), 6);
        assert_eq!(next_sort_order(&[]), 1);
        assert_eq!(default_image(&images).map(|i| i.id), Some(1));
        assert_eq!(successor_default(&images, 1).map(|i| i.id), Some(2));
        assert_eq!(successor_default(&images[..1], 1), None);
    }
}
