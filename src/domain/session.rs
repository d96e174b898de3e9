//! Checkout and charging session wire models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::time;

/// Charge point's answer to the remote start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RemoteRequestStatus {
    Accepted,
    Rejected,
    /// Anything the backend may add later; treated like a rejection.
    #[serde(other)]
    Unknown,
}

/// Body of `POST checkouts/`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub evse_id: String,
    #[validate(url)]
    pub success_url: String,
    #[validate(url)]
    pub cancel_url: String,
}

/// Response of `POST checkouts/`: where the user pays.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutCreated {
    #[serde(default)]
    pub id: Option<i64>,
    /// Payment provider URL the user is redirected to.
    pub url: String,
}

/// One polled snapshot of a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub remote_request_status: Option<RemoteRequestStatus>,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub transaction_start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub transaction_end_time: Option<DateTime<Utc>>,
    /// Energy delivered so far, kWh.
    #[serde(default)]
    pub transaction_kwh: Option<f64>,
    /// Momentary charging power, kW.
    #[serde(default)]
    pub power_active_import: Option<f64>,
    /// Vehicle state of charge in percent, when the charge point reports it.
    #[serde(default)]
    pub transaction_soc: Option<f64>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
}

impl Session {
    /// Only an explicit `Accepted` counts; an absent status means the
    /// charge point never confirmed the start.
    pub fn is_accepted(&self) -> bool {
        self.remote_request_status == Some(RemoteRequestStatus::Accepted)
    }
}

/// Cost snapshot attached to a session or receipt. All `*_costs` figures
/// are integers in minor currency units (cents).
#[derive(Debug, Clone, Deserialize)]
pub struct Pricing {
    pub currency: String,
    #[serde(default)]
    pub tax_rate: i64,
    #[serde(default)]
    pub payment_fee: i64,
    #[serde(default)]
    pub energy_consumption_kwh: Option<f64>,
    #[serde(default)]
    pub energy_costs: Option<i64>,
    #[serde(default)]
    pub time_consumption_min: Option<f64>,
    #[serde(default)]
    pub time_costs: Option<i64>,
    #[serde(default)]
    pub session_consumption: Option<i64>,
    #[serde(default)]
    pub session_costs: Option<i64>,
    /// Non-zero only in tax reverse-charge scenarios.
    #[serde(default)]
    pub payment_costs_tax_rate: i64,
    #[serde(default)]
    pub total_costs_net: i64,
    #[serde(default)]
    pub tax_costs: i64,
    #[serde(default)]
    pub total_costs_gross: i64,
    #[serde(default)]
    pub payment_costs_gross: i64,
    #[serde(default)]
    pub payment_costs_net: i64,
    /// Pricing recomputed from the pre-authorized amount; present on
    /// receipts whose authorized amount supersedes the metered total.
    #[serde(default)]
    pub from_auth: Option<Box<Pricing>>,
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn charging_session_deserializes() {
        let session: Session = serde_json::from_value(json!({
            "id": 77,
            "payment_intent_id": "pi_123",
            "connector_id": 11,
            "tariff_id": 3,
            "remote_request_status": "Accepted",
            "transaction_start_time": "2024-05-02T09:30:12",
            "transaction_kwh": 5.2,
            "power_active_import": 10.8,
            "transaction_soc": 64.0
        }))
        .unwrap();

        assert!(session.is_accepted());
        assert!(session.transaction_start_time.is_some());
        assert!(session.transaction_end_time.is_none());
        assert_eq!(session.transaction_kwh, Some(5.2));
    }

    #[test]
    fn absent_status_is_not_accepted() {
        let session: Session = serde_json::from_value(json!({ "id": 77 })).unwrap();
        assert!(!session.is_accepted());
    }

    #[test]
    fn unknown_status_is_not_accepted() {
        let session: Session = serde_json::from_value(json!({
            "id": 77,
            "remote_request_status": "Scheduled"
        }))
        .unwrap();
        assert_eq!(
            session.remote_request_status,
            Some(RemoteRequestStatus::Unknown)
        );
        assert!(!session.is_accepted());
    }

    #[test]
    fn pricing_defaults_missing_figures_to_zero() {
        let pricing: Pricing = serde_json::from_value(json!({
            "currency": "EUR"
        }))
        .unwrap();
        assert_eq!(pricing.total_costs_gross, 0);
        assert_eq!(pricing.tax_rate, 0);
        assert!(pricing.energy_costs.is_none());
        assert!(pricing.from_auth.is_none());
    }

    #[test]
    fn nested_from_auth_pricing() {
        let pricing: Pricing = serde_json::from_value(json!({
            "currency": "EUR",
            "total_costs_gross": 982,
            "from_auth": {
                "currency": "EUR",
                "total_costs_gross": 900
            }
        }))
        .unwrap();
        assert_eq!(pricing.from_auth.unwrap().total_costs_gross, 900);
    }

    #[test]
    fn checkout_request_validates_urls() {
        let good = CheckoutRequest {
            evse_id: "DE*AMP*E0001".to_string(),
            success_url: "https://pay.example/charging/DE*AMP*E0001".to_string(),
            cancel_url: "https://pay.example/checkout/DE*AMP*E0001".to_string(),
        };
        assert!(good.validate().is_ok());

        let bad = CheckoutRequest {
            evse_id: String::new(),
            success_url: "not a url".to_string(),
            cancel_url: "also not".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
