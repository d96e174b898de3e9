//! Tariff wire model and price helpers

use serde::Deserialize;

/// Pricing rules attached to a connector. Unit prices are net amounts in
/// major currency units.
#[derive(Debug, Clone, Deserialize)]
pub struct Tariff {
    /// Internal id; stripped when the tariff is merged into a bundle.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub price_kwh: Option<f64>,
    /// Per-minute price. The backend spells the field `price_minute`.
    #[serde(default, alias = "price_minute")]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_session: Option<f64>,
    pub currency: String,
    /// VAT percentage applied to all unit prices.
    pub tax_rate: f64,
    /// Amount reserved on the payment method before charging starts.
    #[serde(default)]
    pub authorization_amount: Option<f64>,
}

impl Tariff {
    /// Net unit price converted to gross (incl. VAT), rounded to two
    /// decimals.
    pub fn gross_price(&self, net: f64) -> f64 {
        let gross = net * (1.0 + self.tax_rate / 100.0);
        (gross * 100.0).round() / 100.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tariff() -> Tariff {
        serde_json::from_value(json!({
            "id": 3,
            "price_kwh": 0.40,
            "price_minute": 0.05,
            "price_session": 1.0,
            "currency": "EUR",
            "tax_rate": 19.0,
            "authorization_amount": 25.0
        }))
        .unwrap()
    }

    #[test]
    fn gross_price_applies_vat() {
        let tariff = sample_tariff();
        // 0.40 * 1.19 = 0.476 -> 0.48
        assert_eq!(tariff.gross_price(0.40), 0.48);
        assert_eq!(tariff.gross_price(0.05), 0.06);
        assert_eq!(tariff.gross_price(1.0), 1.19);
    }

    #[test]
    fn gross_price_without_tax_is_net() {
        let mut tariff = sample_tariff();
        tariff.tax_rate = 0.0;
        assert_eq!(tariff.gross_price(0.40), 0.40);
    }

    #[test]
    fn accepts_both_minute_price_spellings() {
        let wire = sample_tariff();
        assert_eq!(wire.price_min, Some(0.05));

        let client: Tariff = serde_json::from_value(json!({
            "price_min": 0.07,
            "currency": "EUR",
            "tax_rate": 19.0
        }))
        .unwrap();
        assert_eq!(client.price_min, Some(0.07));
        assert!(client.price_session.is_none());
    }

    #[test]
    fn free_tariff_needs_only_currency_and_tax() {
        let tariff: Tariff = serde_json::from_value(json!({
            "currency": "EUR",
            "tax_rate": 0.0
        }))
        .unwrap();
        assert!(tariff.price_kwh.is_none());
        assert!(tariff.authorization_amount.is_none());
    }
}
