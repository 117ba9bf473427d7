//! Publishes product events to NATS when a client is configured.

use crate::domain::ProductEvent;

const SUBJECT_PREFIX: &str = "catalog.product";

#[derive(Clone, Debug, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "NATS unavailable, product events will only be logged");
                Self::disabled()
            }
        }
    }

    pub fn subject(event: &ProductEvent) -> String { format!("{SUBJECT_PREFIX}.{}", event.kind()) }

    /// Delivery failures are logged and never fail the calling operation.
    pub async fn publish(&self, event: ProductEvent) {
        tracing::debug!(product_id = event.product_id(), kind = event.kind(), "product event");
        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode product event");
                return;
            }
        };
        if let Err(e) = client.publish(Self::subject(&event), payload.into()).await {
            tracing::warn!(error = %e, kind = event.kind(), "failed to publish product event");
        }
    }
}
