//! Display formatting for the terminal views

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Duration clock, `HH:MM:SS`. Hours keep counting past 24 instead of
/// wrapping into days; negative input clamps to zero.
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// `DD-MM-YYYY HH:MM:SS` stamp shown on the "last update" line.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%d-%m-%Y %H:%M:%S").to_string()
}

/// `YYYY-MM-DD HH:MM:SS` stamp used on the receipt.
pub fn format_datetime(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Money amount with exactly two decimals.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Currency symbol for the currencies the views know about; the ISO code
/// itself for anything else.
pub fn currency_symbol(currency: &str) -> &str {
    match currency {
        "EUR" => "€",
        "USD" => "$",
        other => other,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3600 + 23 * 60 + 5), "01:23:05");
    }

    #[test]
    fn clock_does_not_wrap_after_a_day() {
        // 26h 10m 5s
        assert_eq!(format_hms(26 * 3600 + 10 * 60 + 5), "26:10:05");
    }

    #[test]
    fn clock_clamps_negative_durations() {
        assert_eq!(format_hms(-42), "00:00:00");
    }

    #[test]
    fn timestamp_formats() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 2, 9, 5, 7).unwrap();
        assert_eq!(format_timestamp(ts), "02-05-2024 09:05:07");
        assert_eq!(format_datetime(ts), "2024-05-02 09:05:07");
    }

    #[test]
    fn amounts_always_show_two_decimals() {
        assert_eq!(format_amount(Decimal::new(982, 2)), "9.82");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn known_currency_symbols() {
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("CHF"), "CHF");
    }
}
