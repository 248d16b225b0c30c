//! HTTP client for a running inventory service.
//!
//! Lets the detection adapter push its upserts through the public API instead
//! of writing to the database directly.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::dto::{CostInput, UpsertItem, UpsertItemRequest, AUTO_STATUS, EXPIRY_FORMAT};
use crate::entities::inventory_item::Model as InventoryModel;
use crate::errors::{ErrorResponse, ServiceError};
use crate::repositories::inventory_repository::StatusRule;
use crate::services::detection::InventoryUpsert;
use crate::services::reconciliation::UpsertOutcome;

#[derive(Deserialize)]
struct Envelope {
    data: Option<InventoryModel>,
}

#[derive(Clone, Debug)]
pub struct HttpInventoryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpInventoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ServiceError::ValidationError(format!("invalid base url '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::ValidationError(format!(
                "base url '{}' cannot carry a path",
                base_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/api/inventory/add/{name}` with the name percent-encoded
    fn add_url(&self, name: &str) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InternalError("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["api", "inventory", "add", name]);
        Ok(url)
    }

    #[instrument(skip(self, item), fields(name = %item.name, quantity = item.quantity))]
    pub async fn add_or_merge(&self, item: UpsertItem) -> Result<UpsertOutcome, ServiceError> {
        let url = self.add_url(&item.name)?;
        let body = UpsertItemRequest {
            quantity: Some(item.quantity),
            cost: Some(CostInput::Text(item.cost)),
            expiry: Some(item.expiry.format(EXPIRY_FORMAT).to_string()),
            status: Some(match item.status {
                StatusRule::Fixed(status) => status.as_str().to_string(),
                StatusRule::FromMergedQuantity => AUTO_STATUS.to_string(),
            }),
        };

        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("inventory api: {}", e)))?;

        let status = response.status();
        debug!(%status, "inventory api responded");
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|err| err.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(match status {
                StatusCode::BAD_REQUEST => ServiceError::ValidationError(message),
                StatusCode::NOT_FOUND => ServiceError::NotFound(message),
                _ => ServiceError::ExternalServiceError(message),
            });
        }

        let envelope: Envelope = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("unreadable inventory response: {}", e))
        })?;
        let item = envelope.data.ok_or_else(|| {
            ServiceError::ExternalServiceError("inventory response carried no item".into())
        })?;

        Ok(UpsertOutcome {
            item,
            created: status == StatusCode::CREATED,
        })
    }
}

#[async_trait]
impl InventoryUpsert for HttpInventoryClient {
    async fn upsert(&self, item: UpsertItem) -> Result<UpsertOutcome, ServiceError> {
        self.add_or_merge(item).await
    }
}
