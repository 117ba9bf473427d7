use axum::{extract::{Multipart, Path, Query, State}, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::form::ProductForm;
use super::AppState;
use crate::models::{
    CreatedProduct, PagedResult, ProductCreateRequest, ProductImageUpdateRequest, ProductImageViewModel,
    ProductPagedRequest, ProductUpdateRequest, ProductViewModel,
};
use crate::{CatalogError, Result};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub keyword: Option<String>,
    /// Comma separated category ids.
    pub category_ids: Option<String>,
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    fn into_request(self) -> Result<ProductPagedRequest> {
        let category_ids = self.category_ids.as_deref().unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| id.parse().map_err(|_| CatalogError::Validation(format!("Invalid category id '{id}'"))))
            .collect::<Result<Vec<i32>>>()?;
        Ok(ProductPagedRequest {
            keyword: self.keyword,
            category_ids,
            page_index: self.page_index.unwrap_or(1),
            page_size: self.page_size.unwrap_or(20),
        })
    }
}

#[derive(Debug, Serialize)] pub struct RowsAffected { pub rows_affected: u64 }
#[derive(Debug, Serialize)] pub struct Updated { pub updated: bool }
#[derive(Debug, Deserialize)] pub struct PriceRequest { pub new_price: Decimal }
#[derive(Debug, Deserialize)] pub struct StockRequest { pub add_quantity: i32 }
#[derive(Debug, Deserialize)] pub struct ImageUpdateBody { #[serde(default)] pub caption: String, #[serde(default)] pub is_default: bool }

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<PagedResult<ProductViewModel>>> {
    let request = p.into_request()?;
    request.validate()?;
    Ok(Json(s.catalog.get_all_paging(request).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<i32>) -> Result<Json<ProductViewModel>> {
    Ok(Json(s.catalog.get_by_id(id).await?))
}

pub async fn create_product(State(s): State<AppState>, multipart: Multipart) -> Result<(StatusCode, Json<CreatedProduct>)> {
    let mut form = ProductForm::read(multipart).await?;
    let request = ProductCreateRequest {
        price: form.decimal("price")?,
        original_price: form.decimal("original_price")?,
        stock: form.int("stock")?,
        name: form.text("name"),
        detail: form.text("detail"),
        description: form.text("description"),
        image: form.take_image(),
    };
    request.validate()?;
    Ok((StatusCode::CREATED, Json(s.catalog.create(request).await?)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<i32>, multipart: Multipart) -> Result<Json<RowsAffected>> {
    let mut form = ProductForm::read(multipart).await?;
    let request = ProductUpdateRequest {
        id,
        name: form.text("name"),
        detail: form.text("detail"),
        description: form.text("description"),
        image: form.take_image(),
    };
    request.validate()?;
    Ok(Json(RowsAffected { rows_affected: s.catalog.update(request).await? }))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<i32>) -> Result<Json<RowsAffected>> {
    Ok(Json(RowsAffected { rows_affected: s.catalog.delete(id).await? }))
}

pub async fn update_price(State(s): State<AppState>, Path(id): Path<i32>, Json(r): Json<PriceRequest>) -> Result<Json<Updated>> {
    Ok(Json(Updated { updated: s.catalog.update_price(id, r.new_price).await? }))
}

pub async fn update_stock(State(s): State<AppState>, Path(id): Path<i32>, Json(r): Json<StockRequest>) -> Result<Json<Updated>> {
    Ok(Json(Updated { updated: s.catalog.update_stock(id, r.add_quantity).await? }))
}

pub async fn add_view(State(s): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    s.catalog.add_view_count(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_images(State(s): State<AppState>, Path(id): Path<i32>) -> Result<Json<Vec<ProductImageViewModel>>> {
    Ok(Json(s.catalog.get_list_image(id).await?))
}

pub async fn add_images(State(s): State<AppState>, Path(id): Path<i32>, multipart: Multipart) -> Result<(StatusCode, Json<RowsAffected>)> {
    let images = ProductForm::read(multipart).await?.into_images();
    Ok((StatusCode::CREATED, Json(RowsAffected { rows_affected: s.catalog.add_images(id, images).await? })))
}

pub async fn update_image(State(s): State<AppState>, Path(image_id): Path<i32>, Json(r): Json<ImageUpdateBody>) -> Result<Json<RowsAffected>> {
    let request = ProductImageUpdateRequest { image_id, caption: r.caption, is_default: r.is_default };
    request.validate()?;
    Ok(Json(RowsAffected { rows_affected: s.catalog.update_image(request).await? }))
}

pub async fn remove_image(State(s): State<AppState>, Path(image_id): Path<i32>) -> Result<Json<RowsAffected>> {
    Ok(Json(RowsAffected { rows_affected: s.catalog.remove_image(image_id).await? }))
}
