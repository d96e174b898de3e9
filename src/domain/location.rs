//! Location and operator wire models plus the merged charge point bundle

use serde::Deserialize;

use crate::domain::charge_point::{power_kw, PowerType};
use crate::domain::tariff::Tariff;

/// Operator of a location.
#[derive(Debug, Clone, Deserialize)]
pub struct Operator {
    pub id: i64,
    pub name: String,
}

/// Site a charge point belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub id: i64,
    pub location_id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub operator: Option<Operator>,
    /// Operator's payment terms, when the backend provides them.
    #[serde(default)]
    pub payment_terms_conditions: Option<String>,
}

/// Everything the checkout and charging views need about one charge point,
/// merged from the EVSE, its first connector, the location and the tariff.
/// Internal numeric identifiers are stripped during the merge.
#[derive(Debug, Clone)]
pub struct LocationBundle {
    pub evse_id: String,
    pub connector_id: String,
    pub power_type: PowerType,
    pub max_voltage: Option<i32>,
    pub max_amperage: Option<i32>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Operator display name.
    pub operator: Option<String>,
    pub payment_terms_conditions: Option<String>,
    pub tariff: Tariff,
}

impl LocationBundle {
    /// Maximum connector power in kW, when the electrical limits are known.
    pub fn max_power_kw(&self) -> Option<f64> {
        match (self.max_voltage, self.max_amperage) {
            (Some(voltage), Some(amperage)) => {
                Some(power_kw(voltage as f64, amperage as f64, self.power_type))
            }
            _ => None,
        }
    }

    /// Single-line address in the checkout view's order. Missing parts
    /// render as gaps, matching the backend's optional address fields.
    pub fn address_line(&self) -> String {
        let part = |value: &Option<String>| value.clone().unwrap_or_default();
        format!(
            "{}, {} {}, {} {}",
            part(&self.address),
            part(&self.postal_code),
            part(&self.city),
            part(&self.state),
            part(&self.country),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tariff() -> Tariff {
        serde_json::from_value(json!({
            "price_kwh": 0.40,
            "price_minute": 0.05,
            "price_session": 1.0,
            "currency": "EUR",
            "tax_rate": 19.0,
            "authorization_amount": 25.0
        }))
        .unwrap()
    }

    fn sample_bundle() -> LocationBundle {
        LocationBundle {
            evse_id: "DE*AMP*E0001".to_string(),
            connector_id: "1".to_string(),
            power_type: PowerType::Ac3Phase,
            max_voltage: Some(400),
            max_amperage: Some(32),
            address: Some("Hauptstrasse 12".to_string()),
            postal_code: Some("10115".to_string()),
            city: Some("Berlin".to_string()),
            state: None,
            country: Some("Germany".to_string()),
            operator: Some("Ampay Energy".to_string()),
            payment_terms_conditions: None,
            tariff: sample_tariff(),
        }
    }

    #[test]
    fn location_deserializes_with_nested_operator() {
        let location: Location = serde_json::from_value(json!({
            "id": 2,
            "location_id": "LOC-0002",
            "address": "Hauptstrasse 12",
            "postal_code": "10115",
            "city": "Berlin",
            "country": "Germany",
            "operator": { "id": 1, "name": "Ampay Energy" }
        }))
        .unwrap();

        assert_eq!(location.operator.unwrap().name, "Ampay Energy");
        assert!(location.state.is_none());
        assert!(location.payment_terms_conditions.is_none());
    }

    #[test]
    fn bundle_power_from_connector_limits() {
        // sqrt(3) * 400 V * 32 A = 22.17 kW
        assert_eq!(sample_bundle().max_power_kw(), Some(22.17));
    }

    #[test]
    fn address_line_keeps_field_order() {
        assert_eq!(
            sample_bundle().address_line(),
            "Hauptstrasse 12, 10115 Berlin,  Germany"
        );
    }
}
