//! Client-side cost estimation
//!
//! Mirrors the backend's transaction summary so the charging view can show
//! a running estimate while a polled session carries no pricing snapshot
//! yet. All figures are exact decimals in major currency units.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Inputs of a running-cost estimate, taken from the tariff and the last
/// session snapshot.
#[derive(Debug, Clone)]
pub struct CostInput {
    pub kwh: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub currency: String,
    /// VAT percentage.
    pub tax_rate: f64,
    /// Payment provider fee percentage on the net total.
    pub payment_fee: f64,
    pub price_kwh: Option<f64>,
    pub price_min: Option<f64>,
    pub price_session: Option<f64>,
}

/// Cost components of a charging session.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSummary {
    pub currency: String,
    /// `None` when either the energy or its unit price is unknown.
    pub energy_costs: Option<Decimal>,
    pub time_consumption_min: Decimal,
    pub time_costs: Option<Decimal>,
    /// Every charging session counts as exactly one session.
    pub session_consumption: i64,
    pub session_costs: Option<Decimal>,
    pub total_costs_net: Decimal,
    pub tax_costs: Decimal,
    pub total_costs_gross: Decimal,
    pub payment_costs_net: Decimal,
    pub payment_costs_gross: Decimal,
}

impl CostSummary {
    /// Derive all cost components at `now`. A session without an end time
    /// is priced up to `now`; a session that never started consumed no
    /// time.
    pub fn derive(input: &CostInput, now: DateTime<Utc>) -> Self {
        let hundred = Decimal::from(100);

        let energy_costs = match (input.kwh, input.price_kwh) {
            (Some(kwh), Some(price)) => Some(dec(price) * dec(kwh)),
            _ => None,
        };

        let time_consumption_min = match input.start_time {
            None => Decimal::ZERO,
            Some(start) => {
                let end = input.end_time.unwrap_or(now);
                let millis = end.signed_duration_since(start).num_milliseconds();
                Decimal::from(millis) / Decimal::from(60_000)
            }
        };

        let time_costs = input
            .price_min
            .map(|price| dec(price) * time_consumption_min);

        let session_costs = input.price_session.map(dec);

        let mut total_costs_net = Decimal::ZERO;
        for component in [energy_costs, time_costs, session_costs].into_iter().flatten() {
            total_costs_net += component;
        }

        let tax_costs = total_costs_net * dec(input.tax_rate) / hundred;
        let total_costs_gross = total_costs_net + tax_costs;

        // The payment fee itself is currently taxed at 0%, so its net and
        // gross amounts coincide.
        let payment_costs_net = total_costs_net * dec(input.payment_fee) / hundred;
        let payment_costs_gross = payment_costs_net;

        Self {
            currency: input.currency.clone(),
            energy_costs,
            time_consumption_min,
            time_costs,
            session_consumption: 1,
            session_costs,
            total_costs_net,
            tax_costs,
            total_costs_gross,
            payment_costs_net,
            payment_costs_gross,
        }
    }
}

fn dec(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

// ── Tests ──────────────────────────────────────────────────────────────
