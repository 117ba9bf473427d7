//! HTTP surface for the catalog service.

mod form;
mod handlers;

use axum::{http::StatusCode, response::{IntoResponse, Response}, routing::{get, patch, post, put}, Json, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::service::ProductCatalogService;
use crate::storage::USER_CONTENT_PREFIX;
use crate::CatalogError;

/// Upper bound for a multipart request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ProductCatalogService>,
}

pub fn router(state: AppState, storage_root: &Path) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "catalog-service"})) }))
        .route("/api/v1/products", get(handlers::list_products).post(handlers::create_product))
        .route("/api/v1/products/:id", get(handlers::get_product).put(handlers::update_product).delete(handlers::delete_product))
        .route("/api/v1/products/:id/price", patch(handlers::update_price))
        .route("/api/v1/products/:id/stock", patch(handlers::update_stock))
        .route("/api/v1/products/:id/views", post(handlers::add_view))
        .route("/api/v1/products/:id/images", get(handlers::list_images).post(handlers::add_images))
        .route("/api/v1/images/:image_id", put(handlers::update_image).delete(handlers::remove_image))
        .nest_service(USER_CONTENT_PREFIX, ServeDir::new(storage_root))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ProductNotFound(_) | Self::ImageNotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Storage(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}
