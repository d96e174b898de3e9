//! Location resolution
//!
//! Turns a scanned EVSE identifier into the merged bundle the checkout and
//! charging views render: the EVSE, its first connector, the location and
//! the connector's tariff.

use tracing::{debug, info};

use crate::domain::location::LocationBundle;
use crate::domain::ports::SharedCheckoutApi;
use crate::shared::errors::{ApiError, ApiResult};

pub struct LocationResolver {
    api: SharedCheckoutApi,
}

impl LocationResolver {
    pub fn new(api: SharedCheckoutApi) -> Self {
        Self { api }
    }

    /// Resolve a charge point. Any missing link in the chain (EVSE,
    /// connector, location, tariff) surfaces as `NotFound`, which sends
    /// the caller back to the entry screen.
    pub async fn resolve(&self, evse_id: &str) -> ApiResult<LocationBundle> {
        debug!(evse_id, "Resolving charge point");
        let evse = self.api.get_evse(evse_id).await?;

        let connector = evse
            .connectors
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Connector not found"))?;

        let location = self.api.get_location(evse.location_id).await?;

        let tariff_id = connector
            .tariff_id
            .ok_or_else(|| ApiError::not_found("Tariff not found"))?;
        let mut tariff = self.api.get_tariff(tariff_id).await?;
        // The bundle carries no internal ids.
        tariff.id = None;

        info!(evse_id = %evse.evse_id, "Charge point resolved");
        Ok(LocationBundle {
            evse_id: evse.evse_id,
            connector_id: connector.connector_id,
            power_type: connector.power_type,
            max_voltage: connector.max_voltage,
            max_amperage: connector.max_amperage,
            address: location.address,
            postal_code: location.postal_code,
            city: location.city,
            state: location.state,
            country: location.country,
            operator: location.operator.map(|op| op.name),
            payment_terms_conditions: location.payment_terms_conditions,
            tariff,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::charge_point::Evse;
    use crate::domain::location::Location;
    use crate::domain::receipt::ReceiptData;
    use crate::domain::session::{CheckoutCreated, CheckoutRequest, Session};
    use crate::domain::tariff::Tariff;
    use crate::CheckoutApi;

    struct FakeApi {
        evse: ApiResult<Evse>,
    }

    fn sample_evse(connectors: serde_json::Value) -> Evse {
        serde_json::from_value(json!({
            "id": 7,
            "evse_id": "DE*AMP*E0001",
            "status": "Available",
            "location_id": 2,
            "connectors": connectors
        }))
        .unwrap()
    }

    #[async_trait]
    impl CheckoutApi for FakeApi {
        async fn get_evse(&self, _evse_id: &str) -> ApiResult<Evse> {
            match &self.evse {
                Ok(evse) => Ok(evse.clone()),
                Err(ApiError::NotFound { detail }) => Err(ApiError::not_found(detail.clone())),
                Err(_) => Err(ApiError::Network),
            }
        }

        async fn get_location(&self, id: i64) -> ApiResult<Location> {
            assert_eq!(id, 2);
            Ok(serde_json::from_value(json!({
                "id": 2,
                "location_id": "LOC-0002",
                "address": "Hauptstrasse 12",
                "city": "Berlin",
                "operator": { "id": 1, "name": "Ampay Energy" }
            }))
            .unwrap())
        }

        async fn get_tariff(&self, id: i64) -> ApiResult<Tariff> {
            assert_eq!(id, 3);
            Ok(serde_json::from_value(json!({
                "id": 3,
                "price_kwh": 0.40,
                "currency": "EUR",
                "tax_rate": 19.0
            }))
            .unwrap())
        }

        async fn create_checkout(&self, _request: &CheckoutRequest) -> ApiResult<CheckoutCreated> {
            unimplemented!("not used by the resolver")
        }

        async fn get_session(&self, _session_id: i64) -> ApiResult<Session> {
            unimplemented!("not used by the resolver")
        }

        async fn get_receipt(&self, _session_id: i64) -> ApiResult<ReceiptData> {
            unimplemented!("not used by the resolver")
        }
    }

    #[tokio::test]
    async fn resolves_the_full_bundle() {
        let api = Arc::new(FakeApi {
            evse: Ok(sample_evse(json!([{
                "id": 11,
                "connector_id": "1",
                "power_type": "AC_3_PHASE",
                "max_voltage": 400,
                "max_amperage": 16,
                "tariff_id": 3
            }]))),
        });

        let bundle = LocationResolver::new(api).resolve("DE*AMP*E0001").await.unwrap();
        assert_eq!(bundle.evse_id, "DE*AMP*E0001");
        assert_eq!(bundle.connector_id, "1");
        assert_eq!(bundle.operator.as_deref(), Some("Ampay Energy"));
        assert_eq!(bundle.tariff.currency, "EUR");
        // Internal ids do not survive the merge.
        assert_eq!(bundle.tariff.id, None);
        assert_eq!(bundle.max_power_kw(), Some(11.09));
    }

    #[tokio::test]
    async fn evse_without_connectors_is_not_found() {
        let api = Arc::new(FakeApi {
            evse: Ok(sample_evse(json!([]))),
        });

        let err = LocationResolver::new(api).resolve("DE*AMP*E0001").await.unwrap_err();
        match err {
            ApiError::NotFound { detail } => assert_eq!(detail, "Connector not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connector_without_tariff_is_not_found() {
        let api = Arc::new(FakeApi {
            evse: Ok(sample_evse(json!([{
                "id": 11,
                "connector_id": "1",
                "power_type": "DC"
            }]))),
        });

        let err = LocationResolver::new(api).resolve("DE*AMP*E0001").await.unwrap_err();
        match err {
            ApiError::NotFound { detail } => assert_eq!(detail, "Tariff not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_evse_propagates() {
        let api = Arc::new(FakeApi {
            evse: Err(ApiError::not_found("EVSE not found")),
        });

        let err = LocationResolver::new(api).resolve("NOPE").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
