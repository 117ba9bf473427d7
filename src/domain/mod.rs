//! Catalog domain: aggregates, value objects and events
pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::{Category, NewProduct, NewProductImage, Product, ProductError, ProductImage, ProductInCategory};
pub use events::ProductEvent;
pub use value_objects::{ImageUpload, Page, PageError, StorageKey};
