//! Catalog Service - product catalog admin backend

use anyhow::Result;
use catalog_service::events::EventPublisher;
use catalog_service::http::{router, AppState};
use catalog_service::repository::PgCatalogRepository;
use catalog_service::storage::LocalFileStorage;
use catalog_service::{AppConfig, ProductCatalogService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let storage = LocalFileStorage::new(config.storage_root.clone()).await?;
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;

    let catalog = ProductCatalogService::new(Arc::new(PgCatalogRepository::new(db)), Arc::new(storage), config.catalog).with_events(events);
    let app = router(AppState { catalog: Arc::new(catalog) }, &config.storage_root);

    tracing::info!("Catalog service listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
