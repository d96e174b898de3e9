//! Lenient UTC timestamp parsing
//!
//! The backend serializes timestamps as naive ISO 8601 (no offset); older
//! payloads carry a full RFC 3339 offset. Both are accepted and naive
//! values are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a backend timestamp, with or without an offset.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional timestamp fields.
///
/// Use as `#[serde(default, deserialize_with = "time::utc_option::deserialize")]`.
pub mod utc_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(raw) => super::parse_utc(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_utc("2024-05-02T11:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap());
    }

    #[test]
    fn parses_naive_as_utc() {
        let parsed = parse_utc("2024-05-02T09:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap());
    }

    #[test]
    fn parses_fractional_seconds() {
        let parsed = parse_utc("2024-05-02T09:30:00.250000").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc("yesterday").is_none());
        assert!(parse_utc("").is_none());
    }

    #[test]
    fn optional_field_roundtrip() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "utc_option::deserialize")]
            at: Option<DateTime<Utc>>,
        }

        let present: Probe = serde_json::from_str(r#"{"at": "2024-05-02T09:30:00"}"#).unwrap();
        assert!(present.at.is_some());

        let null: Probe = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(null.at.is_none());

        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert!(absent.at.is_none());

        let invalid = serde_json::from_str::<Probe>(r#"{"at": "soon"}"#);
        assert!(invalid.is_err());
    }
}
