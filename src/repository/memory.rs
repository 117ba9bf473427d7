//! In-memory catalog store with the same query semantics as the PostgreSQL one.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{CatalogRepository, ImageWrite, ProductQuery};
use crate::domain::aggregates::product::sort_gallery;
use crate::domain::{Category, NewProduct, NewProductImage, Product, ProductImage, ProductInCategory};
use crate::Result;

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<i32, Product>,
    images: BTreeMap<i32, ProductImage>,
    categories: BTreeMap<i32, Category>,
    links: BTreeSet<(i32, i32)>,
    next_product: i32,
    next_image: i32,
    next_category: i32,
}

impl State {
    fn push_image(&mut self, product_id: i32, image: NewProductImage) -> u64 {
        self.next_image += 1;
        let id = self.next_image;
        self.images.insert(id, image.into_image(id, product_id));
        1
    }

    fn write_image(&mut self, image: &ProductImage) -> u64 {
        let mut rows = 0;
        if image.is_default {
            for sibling in self.images.values_mut().filter(|i| i.product_id == image.product_id && i.id != image.id && i.is_default) {
                sibling.is_default = false;
                rows += 1;
            }
        }
        if let Some(slot) = self.images.get_mut(&image.id) {
            *slot = image.clone();
            rows += 1;
        }
        rows
    }

    fn category_links(&self, product_id: i32, matching: impl Fn(i32) -> bool) -> usize {
        self.links.iter().filter(|&&(p, c)| p == product_id && self.categories.contains_key(&c) && matching(c)).count()
    }

    /// Number of result rows the product contributes to the search.
    fn result_rows(&self, product: &Product, query: &ProductQuery) -> usize {
        if let Some(keyword) = query.keyword() {
            if !product.name.contains(keyword) { return 0; }
        }
        let links = if query.category_ids.is_empty() {
            match self.category_links(product.id, |_| true) {
                0 => usize::from(query.include_uncategorized),
                n => n,
            }
        } else {
            self.category_links(product.id, |c| query.category_ids.contains(&c))
        };
        if query.distinct { links.min(1) } else { links }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    state: RwLock<State>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self { Self::default() }

    pub async fn add_category(&self, name: impl Into<String>) -> i32 {
        let mut state = self.state.write().await;
        state.next_category += 1;
        let id = state.next_category;
        state.categories.insert(id, Category { id, name: name.into() });
        id
    }

    pub async fn assign_category(&self, link: ProductInCategory) {
        self.state.write().await.links.insert((link.product_id, link.category_id));
    }

    pub async fn product_count(&self) -> usize { self.state.read().await.products.len() }

    pub async fn image_count(&self) -> usize { self.state.read().await.images.len() }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_product(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: NewProduct, images: Vec<NewProductImage>) -> Result<(i32, u64)> {
        let mut state = self.state.write().await;
        state.next_product += 1;
        let id = state.next_product;
        state.products.insert(id, product.into_product(id));
        let rows = images.into_iter().fold(1, |rows, image| rows + state.push_image(id, image));
        Ok((id, rows))
    }

    async fn save_product(&self, product: &Product, image: Option<ImageWrite>) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(slot) = state.products.get_mut(&product.id) else { return Ok(0) };
        slot.rename(product.name.clone(), product.detail.clone(), product.description.clone());
        let rows = match image {
            Some(ImageWrite::Replace(existing)) => state.write_image(&existing),
            Some(ImageWrite::Append(new)) => state.push_image(product.id, new),
            None => 0,
        };
        Ok(1 + rows)
    }

    async fn update_price(&self, id: i32, price: Decimal) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(&id) else { return Ok(0) };
        product.set_price(price);
        Ok(1)
    }

    async fn adjust_stock(&self, id: i32, quantity: i32) -> Result<Option<i32>> {
        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(&id) else { return Ok(None) };
        product.add_stock(quantity)?;
        Ok(Some(product.stock))
    }

    async fn increment_view_count(&self, id: i32) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(&id) else { return Ok(0) };
        product.record_view();
        Ok(1)
    }

    async fn delete_product(&self, id: i32) -> Result<u64> {
        let mut state = self.state.write().await;
        if state.products.remove(&id).is_none() { return Ok(0); }
        state.images.retain(|_, i| i.product_id != id);
        state.links.retain(|&(p, _)| p != id);
        Ok(1)
    }

    async fn search_products(&self, query: &ProductQuery) -> Result<(u64, Vec<Product>)> {
        let state = self.state.read().await;
        let matching: Vec<&Product> = state.products.values()
            .flat_map(|p| std::iter::repeat(p).take(state.result_rows(p, query)))
            .collect();
        let items = matching.iter()
            .skip(query.page.offset() as usize)
            .take(query.page.size() as usize)
            .map(|p| (*p).clone())
            .collect();
        Ok((matching.len() as u64, items))
    }

    async fn find_default_image(&self, product_id: i32) -> Result<Option<ProductImage>> {
        let mut images = self.list_images(product_id).await?;
        images.retain(|i| i.is_default);
        Ok(images.into_iter().next())
    }

    async fn list_images(&self, product_id: i32) -> Result<Vec<ProductImage>> {
        let state = self.state.read().await;
        let mut images: Vec<ProductImage> = state.images.values().filter(|i| i.product_id == product_id).cloned().collect();
        sort_gallery(&mut images);
        Ok(images)
    }

    async fn find_image(&self, image_id: i32) -> Result<Option<ProductImage>> {
        Ok(self.state.read().await.images.get(&image_id).cloned())
    }

    async fn insert_images(&self, product_id: i32, images: Vec<NewProductImage>) -> Result<u64> {
        let mut state = self.state.write().await;
        Ok(images.into_iter().map(|image| state.push_image(product_id, image)).sum())
    }

    async fn save_image(&self, image: &ProductImage) -> Result<u64> {
        Ok(self.state.write().await.write_image(image))
    }

    async fn delete_image(&self, image_id: i32, promote: Option<i32>) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut rows = u64::from(state.images.remove(&image_id).is_some());
        if let Some(next) = promote {
            if let Some(image) = state.images.get_mut(&next) {
                image.is_default = true;
                rows += 1;
            }
        }
        Ok(rows)
    }
}
