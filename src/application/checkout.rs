//! Checkout initiation
//!
//! Validates the user's input, builds the payment redirect URLs and
//! creates the checkout on the backend. The returned URL is where the
//! user completes the payment; afterwards the provider sends them to the
//! success URL, which lands in the charging view.

use tracing::info;
use validator::Validate;

use crate::domain::ports::SharedCheckoutApi;
use crate::domain::session::{CheckoutCreated, CheckoutRequest};
use crate::shared::errors::{FlowError, FlowResult};

pub struct CheckoutService {
    api: SharedCheckoutApi,
    public_base_url: String,
}

impl CheckoutService {
    pub fn new(api: SharedCheckoutApi, public_base_url: impl Into<String>) -> Self {
        Self {
            api,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Start a checkout for the given charge point. The payment terms must
    /// be accepted first; the error message is a translation key rendered
    /// inline by the caller.
    pub async fn start(&self, evse_id: &str, accepted_terms: bool) -> FlowResult<CheckoutCreated> {
        if !accepted_terms {
            return Err(FlowError::Validation(
                "checkout-error-tanotaccepted".to_string(),
            ));
        }

        let request = CheckoutRequest {
            evse_id: evse_id.to_string(),
            success_url: format!("{}/charging/{}", self.public_base_url, evse_id),
            cancel_url: format!("{}/checkout/{}", self.public_base_url, evse_id),
        };
        request
            .validate()
            .map_err(|e| FlowError::Validation(e.to_string()))?;

        let created = self.api.create_checkout(&request).await?;
        info!(evse_id, url = %created.url, "Checkout created");
        Ok(created)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::domain::charge_point::Evse;
    use crate::domain::location::Location;
    use crate::domain::receipt::ReceiptData;
    use crate::domain::session::Session;
    use crate::domain::tariff::Tariff;
    use crate::shared::errors::ApiResult;
    use crate::CheckoutApi;

    #[derive(Default)]
    struct RecordingApi {
        calls: AtomicUsize,
        last_request: Mutex<Option<CheckoutRequest>>,
    }

    #[async_trait]
    impl CheckoutApi for RecordingApi {
        async fn get_evse(&self, _evse_id: &str) -> ApiResult<Evse> {
            unimplemented!("not used by checkout")
        }

        async fn get_location(&self, _id: i64) -> ApiResult<Location> {
            unimplemented!("not used by checkout")
        }

        async fn get_tariff(&self, _id: i64) -> ApiResult<Tariff> {
            unimplemented!("not used by checkout")
        }

        async fn create_checkout(&self, request: &CheckoutRequest) -> ApiResult<CheckoutCreated> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(CheckoutCreated {
                id: Some(42),
                url: "https://pay.example/s/42".to_string(),
            })
        }

        async fn get_session(&self, _session_id: i64) -> ApiResult<Session> {
            unimplemented!("not used by checkout")
        }

        async fn get_receipt(&self, _session_id: i64) -> ApiResult<ReceiptData> {
            unimplemented!("not used by checkout")
        }
    }

    #[tokio::test]
    async fn builds_redirect_urls_from_the_public_base() {
        let api = Arc::new(RecordingApi::default());
        let service = CheckoutService::new(api.clone(), "https://pay.example/");

        let created = service.start("DE*AMP*E0001", true).await.unwrap();
        assert_eq!(created.url, "https://pay.example/s/42");

        let request = api.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.success_url,
            "https://pay.example/charging/DE*AMP*E0001"
        );
        assert_eq!(
            request.cancel_url,
            "https://pay.example/checkout/DE*AMP*E0001"
        );
        assert_eq!(request.evse_id, "DE*AMP*E0001");
    }

    #[tokio::test]
    async fn unaccepted_terms_stop_before_any_request() {
        let api = Arc::new(RecordingApi::default());
        let service = CheckoutService::new(api.clone(), "https://pay.example");

        let err = service.start("DE*AMP*E0001", false).await.unwrap_err();
        match err {
            FlowError::Validation(key) => assert_eq!(key, "checkout-error-tanotaccepted"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_public_base_fails_validation() {
        let api = Arc::new(RecordingApi::default());
        let service = CheckoutService::new(api.clone(), "not a base url");

        let err = service.start("DE*AMP*E0001", true).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}
