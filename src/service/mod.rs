//! Product catalog service
//!
//! Owns the product lifecycle. Image bytes go to a [`FileStorage`], rows go to
//! a [`CatalogRepository`]. Stored files are not part of the row commit: a
//! failed commit removes the files written for it, and a replaced cover image
//! is removed once the new one is committed.
//!
//! [`FileStorage`]: crate::storage::FileStorage
//! [`CatalogRepository`]: crate::repository::CatalogRepository

use crate::config::CatalogOptions;
use crate::domain::aggregates::product::{default_image, next_sort_order, successor_default};
use crate::domain::{ImageUpload, NewProduct, NewProductImage, Page, Product, ProductEvent, ProductImage, StorageKey};
use crate::events::EventPublisher;
use crate::models::{
    CreatedProduct, PagedResult, ProductCreateRequest, ProductImageUpdateRequest, ProductImageViewModel,
    ProductPagedRequest, ProductUpdateRequest, ProductViewModel,
};
use crate::repository::{DynCatalogRepository, ImageWrite, ProductQuery};
use crate::storage::DynFileStorage;
use crate::{CatalogError, Result};


pub struct ProductCatalogService {
    repository: DynCatalogRepository,
    storage: DynFileStorage,
    options: CatalogOptions,
    events: EventPublisher,
}

impl ProductCatalogService {
    pub fn new(repository: DynCatalogRepository, storage: DynFileStorage, options: CatalogOptions) -> Self {
        Self { repository, storage, options, events: EventPublisher::disabled() }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn image_url(&self, image_path: &str) -> String { self.storage.file_url(image_path) }

    async fn require_product(&self, product_id: i32) -> Result<Product> {
        self.repository.find_product(product_id).await?.ok_or(CatalogError::ProductNotFound(product_id))
    }

    async fn require_image(&self, image_id: i32) -> Result<ProductImage> {
        self.repository.find_image(image_id).await?.ok_or(CatalogError::ImageNotFound(image_id))
    }

    async fn store_upload(&self, upload: &ImageUpload) -> Result<String> {
        let key = StorageKey::generate(upload);
        self.storage.save_file(upload.bytes(), key.as_str()).await?;
        Ok(key.into_string())
    }

    /// Best-effort removal of files no row refers to.
    async fn remove_orphans(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete_file(path).await {
                tracing::warn!(path = %path, error = %e, "failed to remove orphaned image file");
            }
        }
    }

    #[tracing::instrument(skip_all, fields(name = %request.name))]
    pub async fn create(&self, request: ProductCreateRequest) -> Result<CreatedProduct> {
        let ProductCreateRequest { price, original_price, stock, name, detail, description, image } = request;

        let mut images = Vec::new();
        if let Some(upload) = &image {
            let path = self.store_upload(upload).await?;
            images.push(NewProductImage::cover(name.clone(), path, upload.len()));
        }
        let written: Vec<String> = images.iter().map(|i| i.image_path.clone()).collect();

        let product = NewProduct::create(price, original_price, stock, name.clone(), detail, description);
        let (id, rows_affected) = match self.repository.insert_product(product, images).await {
            Ok(done) => done,
            Err(e) => {
                self.remove_orphans(&written).await;
                return Err(e);
            }
        };
        tracing::info!(product_id = id, rows_affected, "product created");
        self.events.publish(ProductEvent::Created { product_id: id, name }).await;
        Ok(CreatedProduct { id, rows_affected })
    }

    #[tracing::instrument(skip_all, fields(product_id = request.id))]
    pub async fn update(&self, request: ProductUpdateRequest) -> Result<u64> {
        let ProductUpdateRequest { id, name, detail, description, image } = request;
        let mut product = self.require_product(id).await?;
        product.rename(name, detail, description);

        let mut written = Vec::new();
        let mut superseded = Vec::new();
        let image_write = match &image {
            None => None,
            Some(upload) => match self.repository.find_default_image(id).await? {
                Some(mut current) => {
                    let path = self.store_upload(upload).await?;
                    written.push(path.clone());
                    superseded.push(std::mem::replace(&mut current.image_path, path));
                    current.file_size = upload.len();
                    Some(ImageWrite::Replace(current))
                }
                None if self.options.create_image_if_absent => {
                    let gallery = self.repository.list_images(id).await?;
                    let path = self.store_upload(upload).await?;
                    written.push(path.clone());
                    Some(ImageWrite::Append(NewProductImage::new(product.name.clone(), path, upload.len(), true, next_sort_order(&gallery))))
                }
                None => {
                    tracing::debug!("product has no default image, upload ignored");
                    None
                }
            },
        };

        let rows = match self.repository.save_product(&product, image_write).await {
            Ok(rows) => rows,
            Err(e) => {
                self.remove_orphans(&written).await;
                return Err(e);
            }
        };
        self.remove_orphans(&superseded).await;
        tracing::info!(rows_affected = rows, "product updated");
        self.events.publish(ProductEvent::Updated { product_id: id }).await;
        Ok(rows)
    }

    /// Stored files are deleted before the row; a storage failure aborts before the row is touched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, product_id: i32) -> Result<u64> {
        self.require_product(product_id).await?;
        for image in self.repository.list_images(product_id).await? {
            self.storage.delete_file(&image.image_path).await?;
        }
        let rows = self.repository.delete_product(product_id).await?;
        tracing::info!(rows_affected = rows, "product deleted");
        self.events.publish(ProductEvent::Deleted { product_id }).await;
        Ok(rows)
    }

    pub async fn get_by_id(&self, product_id: i32) -> Result<ProductViewModel> {
        Ok(self.require_product(product_id).await?.into())
    }

    pub async fn get_all_paging(&self, request: ProductPagedRequest) -> Result<PagedResult<ProductViewModel>> {
        let query = ProductQuery {
            page: Page::new(request.page_index, request.page_size)?,
            keyword: request.keyword,
            category_ids: request.category_ids,
            include_uncategorized: self.options.include_uncategorized,
            distinct: self.options.distinct_products,
        };
        let (total_record, products) = self.repository.search_products(&query).await?;
        tracing::debug!(total_record, returned = products.len(), "product page");
        Ok(PagedResult { total_record, items: products.into_iter().map(ProductViewModel::from).collect() })
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_price(&self, product_id: i32, new_price: rust_decimal::Decimal) -> Result<bool> {
        self.require_product(product_id).await?;
        let rows = self.repository.update_price(product_id, new_price).await?;
        self.events.publish(ProductEvent::PriceChanged { product_id, price: new_price }).await;
        Ok(rows > 0)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_stock(&self, product_id: i32, add_quantity: i32) -> Result<bool> {
        self.require_product(product_id).await?;
        let Some(stock) = self.repository.adjust_stock(product_id, add_quantity).await? else { return Ok(false) };
        self.events.publish(ProductEvent::StockAdjusted { product_id, quantity: add_quantity, stock }).await;
        Ok(true)
    }

    pub async fn add_view_count(&self, product_id: i32) -> Result<()> {
        self.require_product(product_id).await?;
        self.repository.increment_view_count(product_id).await?;
        Ok(())
    }

    /// Appends images after the current last one. The first becomes default when the product has none.
    #[tracing::instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn add_images(&self, product_id: i32, uploads: Vec<ImageUpload>) -> Result<u64> {
        if uploads.is_empty() {
            return Err(CatalogError::Validation("no images supplied".into()));
        }
        let product = self.require_product(product_id).await?;
        let gallery = self.repository.list_images(product_id).await?;
        let first_sort = next_sort_order(&gallery);
        let needs_default = default_image(&gallery).is_none();

        let mut images = Vec::with_capacity(uploads.len());
        for (offset, upload) in (0..).zip(&uploads) {
            let path = match self.store_upload(upload).await {
                Ok(path) => path,
                Err(e) => {
                    let written: Vec<String> = images.iter().map(|i: &NewProductImage| i.image_path.clone()).collect();
                    self.remove_orphans(&written).await;
                    return Err(e);
                }
            };
            images.push(NewProductImage::new(product.name.clone(), path, upload.len(), needs_default && offset == 0, first_sort + offset));
        }
        let written: Vec<String> = images.iter().map(|i| i.image_path.clone()).collect();

        let rows = match self.repository.insert_images(product_id, images).await {
            Ok(rows) => rows,
            Err(e) => {
                self.remove_orphans(&written).await;
                return Err(e);
            }
        };
        self.events.publish(ProductEvent::ImagesAdded { product_id, count: written.len() }).await;
        Ok(rows)
    }

    pub async fn get_list_image(&self, product_id: i32) -> Result<Vec<ProductImageViewModel>> {
        self.require_product(product_id).await?;
        let images = self.repository.list_images(product_id).await?;
        Ok(images.into_iter().map(ProductImageViewModel::from).collect())
    }

    /// Making an image the default takes the flag away from its siblings in the same commit.
    pub async fn update_image(&self, request: ProductImageUpdateRequest) -> Result<u64> {
        let mut image = self.require_image(request.image_id).await?;
        image.caption = request.caption;
        image.is_default = request.is_default;
        self.repository.save_image(&image).await
    }

    /// Removing the default image promotes the next one in sort order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_image(&self, image_id: i32) -> Result<u64> {
        let image = self.require_image(image_id).await?;
        let promote = if image.is_default {
            let gallery = self.repository.list_images(image.product_id).await?;
            successor_default(&gallery, image.id).map(|next| next.id)
        } else {
            None
        };
        self.storage.delete_file(&image.image_path).await?;
        let rows = self.repository.delete_image(image.id, promote).await?;
        self.events.publish(ProductEvent::ImageRemoved { product_id: image.product_id, image_id }).await;
        Ok(rows)
    }
}
