//! Receipt wire models and the derived display summary
//!
//! All monetary figures on the receipt come from the backend's final
//! pricing as integer cents; nothing is recomputed from the tariff. The
//! only derived quantities are the duration clock, the meter readings in
//! kWh and the VAT difference.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::domain::ocmf;
use crate::domain::session::Pricing;
use crate::shared::{format, time};

/// `GET receipts/{id}` envelope: either the receipt or a message.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptEnvelope {
    #[serde(default)]
    pub data: Option<ReceiptData>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Receipt payload as served by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptData {
    pub id: i64,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connector: Option<ReceiptConnector>,
    #[serde(default)]
    pub operator: Option<ReceiptOperator>,
    #[serde(default)]
    pub location: Option<ReceiptLocation>,
    /// Tariff unit prices the session was billed with.
    #[serde(default)]
    pub pricing: Option<UnitPrices>,
    pub session: ReceiptSession,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConnector {
    #[serde(default)]
    pub evse_id: Option<String>,
}

/// The receipt names the operator `fullname`, unlike the location record.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptOperator {
    #[serde(default)]
    pub fullname: Option<String>,
}

/// Receipt addresses are street-structured, unlike the location record.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptLocation {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub street_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitPrices {
    #[serde(default)]
    pub price_kwh: Option<f64>,
    #[serde(default, alias = "price_minute")]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_session: Option<f64>,
}

/// Metering-relevant slice of the closed session.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptSession {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "time::utc_option::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    /// Meter reading at start, Wh.
    #[serde(default)]
    pub meter_start: Option<i64>,
    /// Meter reading at stop, Wh.
    #[serde(default)]
    pub meter_stop: Option<i64>,
    #[serde(default)]
    pub final_pricing: Option<Pricing>,
    /// Raw OCPP transaction data, scanned for signed metering values.
    #[serde(default)]
    pub transaction_data: Option<serde_json::Value>,
}

/// One line of the receipt's cost table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Measured quantity: `1` for the session line, the kWh figure for
    /// energy, the duration clock for time.
    pub quantity: String,
    /// Net unit price in major units.
    pub unit_price: Option<Decimal>,
    /// Net line total in major units.
    pub net_amount: Decimal,
}

/// Everything the receipt view renders, derived in one pass.
#[derive(Debug, Clone)]
pub struct ReceiptSummary {
    pub receipt_id: i64,
    pub session_id: Option<i64>,
    pub evse_id: Option<String>,
    pub operator: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub address_line: String,
    pub currency: String,
    pub session_line: ReceiptLine,
    pub energy_line: ReceiptLine,
    pub time_line: ReceiptLine,
    pub total_net: Decimal,
    /// VAT percentage the totals were taxed with.
    pub tax_rate: i64,
    pub vat: Decimal,
    pub total_gross: Decimal,
    /// Present when the pre-authorized amount supersedes the metered total.
    pub discount: Option<Decimal>,
    /// What the user actually pays.
    pub final_total: Decimal,
    pub meter_start_kwh: Option<Decimal>,
    pub meter_stop_kwh: Option<Decimal>,
    /// Decoded signed metering record, when the session carries one.
    pub ocmf: Option<String>,
}

impl ReceiptSummary {
    pub fn derive(data: &ReceiptData) -> Self {
        let pricing = data.session.final_pricing.as_ref();
        let unit_prices = data.pricing.as_ref();

        let cents = |minor: i64| Decimal::new(minor, 2);
        let unit = |value: Option<f64>| value.and_then(Decimal::from_f64);

        let session_line = ReceiptLine {
            quantity: "1".to_string(),
            unit_price: unit(unit_prices.and_then(|p| p.price_session)),
            net_amount: cents(pricing.and_then(|p| p.session_costs).unwrap_or(0)),
        };

        let energy_line = ReceiptLine {
            quantity: pricing
                .and_then(|p| p.energy_consumption_kwh)
                .map(|kwh| kwh.to_string())
                .unwrap_or_default(),
            unit_price: unit(unit_prices.and_then(|p| p.price_kwh)),
            net_amount: cents(pricing.and_then(|p| p.energy_costs).unwrap_or(0)),
        };

        let duration = match (data.session.start_time, data.session.end_time) {
            (Some(start), Some(end)) => {
                format::format_hms(end.signed_duration_since(start).num_seconds())
            }
            _ => "00:00:00".to_string(),
        };
        let time_line = ReceiptLine {
            quantity: duration,
            unit_price: unit(unit_prices.and_then(|p| p.price_min)),
            net_amount: cents(pricing.and_then(|p| p.time_costs).unwrap_or(0)),
        };

        let total_net = cents(pricing.map(|p| p.total_costs_net).unwrap_or(0));
        let total_gross = cents(pricing.map(|p| p.total_costs_gross).unwrap_or(0));
        // VAT is the gross/net difference, never recomputed from the rate.
        let vat = total_gross - total_net;

        let from_auth = pricing.and_then(|p| p.from_auth.as_deref());
        let discount = from_auth.map(|auth| total_gross - cents(auth.total_costs_gross));
        let final_total = from_auth
            .map(|auth| cents(auth.total_costs_gross))
            .unwrap_or(total_gross);

        let meter_kwh = |wh: Option<i64>| {
            wh.map(|wh| {
                Decimal::new(wh, 3)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            })
        };

        Self {
            receipt_id: data.id,
            session_id: data.session.id,
            evse_id: data.connector.as_ref().and_then(|c| c.evse_id.clone()),
            operator: data.operator.as_ref().and_then(|o| o.fullname.clone()),
            start_time: data.start_time,
            end_time: data.end_time,
            address_line: address_line(data.location.as_ref()),
            currency: pricing.map(|p| p.currency.clone()).unwrap_or_default(),
            session_line,
            energy_line,
            time_line,
            total_net,
            tax_rate: pricing.map(|p| p.tax_rate).unwrap_or(0),
            vat,
            total_gross,
            discount,
            final_total,
            meter_start_kwh: meter_kwh(data.session.meter_start),
            meter_stop_kwh: meter_kwh(data.session.meter_stop),
            ocmf: data.session.transaction_data.as_ref().and_then(ocmf::extract),
        }
    }
}

fn address_line(location: Option<&ReceiptLocation>) -> String {
    let Some(location) = location else {
        return String::new();
    };
    let part = |value: &Option<String>| value.clone().unwrap_or_default();
    format!(
        "{} {}, {} {}, {}",
        part(&location.street),
        part(&location.street_number),
        part(&location.postal_code),
        part(&location.city),
        part(&location.country),
    )
}

// ── Tests ──────────────────────────────────────────────────────────────
