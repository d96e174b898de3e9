//! Charge point (EVSE) wire models and connector power maths

use serde::Deserialize;

/// Charge point availability as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EvseStatus {
    Available,
    Occupied,
    Reserved,
    Unavailable,
    Faulted,
}

impl std::fmt::Display for EvseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Occupied => write!(f, "Occupied"),
            Self::Reserved => write!(f, "Reserved"),
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Faulted => write!(f, "Faulted"),
        }
    }
}

/// Connector current kind; decides the power formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PowerType {
    #[serde(rename = "AC_1_PHASE")]
    Ac1Phase,
    #[serde(rename = "AC_3_PHASE")]
    Ac3Phase,
    #[serde(rename = "DC")]
    Dc,
}

impl std::fmt::Display for PowerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ac1Phase => write!(f, "AC_1_PHASE"),
            Self::Ac3Phase => write!(f, "AC_3_PHASE"),
            Self::Dc => write!(f, "DC"),
        }
    }
}

/// Physical connector of an EVSE.
#[derive(Debug, Clone, Deserialize)]
pub struct Connector {
    pub id: i64,
    pub connector_id: String,
    pub power_type: PowerType,
    #[serde(default)]
    pub max_voltage: Option<i32>,
    #[serde(default)]
    pub max_amperage: Option<i32>,
    #[serde(default)]
    pub tariff_id: Option<i64>,
}

impl Connector {
    /// Maximum deliverable power in kW, when the connector reports its
    /// electrical limits.
    pub fn max_power_kw(&self) -> Option<f64> {
        match (self.max_voltage, self.max_amperage) {
            (Some(voltage), Some(amperage)) => {
                Some(power_kw(voltage as f64, amperage as f64, self.power_type))
            }
            _ => None,
        }
    }
}

/// Charge point record. `evse_id` is the public identifier printed on the
/// station and encoded in its QR code.
#[derive(Debug, Clone, Deserialize)]
pub struct Evse {
    pub id: i64,
    pub evse_id: String,
    #[serde(default)]
    pub ocpp_evse_id: Option<i64>,
    pub status: EvseStatus,
    pub location_id: i64,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

/// Deliverable power in kW for the given voltage, current and phase layout,
/// rounded to two decimals. Three-phase AC uses the √3 line factor.
pub fn power_kw(voltage: f64, amperage: f64, power_type: PowerType) -> f64 {
    let raw = match power_type {
        PowerType::Ac3Phase => 3.0_f64.sqrt() * voltage * amperage / 1000.0,
        _ => voltage * amperage / 1000.0,
    };
    // The epsilon nudge keeps x.xx5 products from landing just below the
    // rounding midpoint after the float multiplication.
    ((raw + f64::EPSILON) * 100.0).round() / 100.0
}

// ── Tests ──────────────────────────────────────────────────────────────
