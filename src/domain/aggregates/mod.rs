//! Aggregates module
pub mod product;

pub use product::{Category, NewProduct, NewProductImage, Product, ProductError, ProductImage, ProductInCategory};
