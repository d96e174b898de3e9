//! HTTP implementation of the [`CheckoutApi`] port

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::domain::charge_point::Evse;
use crate::domain::location::Location;
use crate::domain::ports::CheckoutApi;
use crate::domain::receipt::{ReceiptData, ReceiptEnvelope};
use crate::domain::session::{CheckoutCreated, CheckoutRequest, Session};
use crate::domain::tariff::Tariff;
use crate::shared::errors::{ApiError, ApiResult};

/// REST client for the charging backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("No response from {}: {}", url, e);
            ApiError::Network
        })?;
        Self::decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!("No response from {}: {}", url, e);
            ApiError::Network
        })?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let raw = response.text().await.map_err(|_| ApiError::Network)?;
                serde_json::from_str(&raw).map_err(|e| ApiError::Decode(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                detail: Self::error_detail(response).await,
            }),
            status => Err(ApiError::Api {
                status: status.as_u16(),
                detail: Self::error_detail(response).await,
            }),
        }
    }

    /// Error bodies usually carry a `detail` field; anything else is taken
    /// verbatim.
    async fn error_detail(response: reqwest::Response) -> String {
        let raw = response.text().await.unwrap_or_default();
        serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(|detail| detail.as_str())
                    .map(str::to_owned)
            })
            .unwrap_or(raw)
    }
}

#[async_trait]
impl CheckoutApi for ApiClient {
    async fn get_evse(&self, evse_id: &str) -> ApiResult<Evse> {
        self.get_json(&format!("evses/{evse_id}")).await
    }

    async fn get_location(&self, id: i64) -> ApiResult<Location> {
        self.get_json(&format!("locations/{id}")).await
    }

    async fn get_tariff(&self, id: i64) -> ApiResult<Tariff> {
        self.get_json(&format!("tariffs/{id}")).await
    }

    async fn create_checkout(&self, request: &CheckoutRequest) -> ApiResult<CheckoutCreated> {
        self.post_json("checkouts/", request).await
    }

    async fn get_session(&self, session_id: i64) -> ApiResult<Session> {
        self.get_json(&format!("checkouts/{session_id}")).await
    }

    async fn get_receipt(&self, session_id: i64) -> ApiResult<ReceiptData> {
        let envelope: ReceiptEnvelope = self.get_json(&format!("receipts/{session_id}")).await?;
        match envelope.data {
            Some(data) => Ok(data),
            // The backend answers 200 with a message instead of a body
            // when the receipt is not ready.
            None => Err(ApiError::NotFound {
                detail: envelope
                    .message
                    .unwrap_or_else(|| "Receipt not found".to_string()),
            }),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
