//! Signed metering data (OCMF) extraction
//!
//! Charge points embed an OCMF record, hex-encoded plain text starting
//! with `OCMF`, in the `SignedData` sampled values of the OCPP transaction
//! data. The structured scan walks that nesting; when a payload does not
//! have the expected shape, a raw text scan over the serialized structure
//! recovers the record instead.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Hex spelling of the ASCII prefix `OCMF`.
const OCMF_HEX_PREFIX: &str = "4f434d46";

/// Extract the OCMF record from raw OCPP transaction data. When several
/// sampled values carry one, the last wins.
pub fn extract(transaction_data: &Value) -> Option<String> {
    match scan_sampled_values(transaction_data) {
        Ok(found) => found,
        Err(UnexpectedShape) => {
            debug!("Transaction data not in the expected shape, falling back to a raw scan");
            fallback_scan(transaction_data)
        }
    }
}

struct UnexpectedShape;

/// Walk `[{ "sampled_value": [{ "format": "SignedData", "value": <hex> }] }]`.
/// Entries without the `sampled_value` array and hex that does not decode
/// make the whole payload unexpected.
fn scan_sampled_values(transaction_data: &Value) -> Result<Option<String>, UnexpectedShape> {
    let entries = transaction_data.as_array().ok_or(UnexpectedShape)?;
    let mut found = None;

    for entry in entries {
        let sampled = entry
            .get("sampled_value")
            .and_then(Value::as_array)
            .ok_or(UnexpectedShape)?;
        for sample in sampled {
            if sample.get("format").and_then(Value::as_str) != Some("SignedData") {
                continue;
            }
            let Some(raw) = sample.get("value").and_then(Value::as_str) else {
                continue;
            };
            if !raw.contains(OCMF_HEX_PREFIX) {
                continue;
            }
            found = Some(decode_hex_text(raw).ok_or(UnexpectedShape)?);
        }
    }

    Ok(found)
}

/// Pairwise hex decode, each byte taken as one character.
fn decode_hex_text(raw: &str) -> Option<String> {
    let bytes = hex::decode(raw).ok()?;
    Some(bytes.into_iter().map(|b| b as char).collect())
}

/// Last resort: serialize the whole payload and pick the record out of the
/// text. The record usually sits inside a JSON string, so its quotes may
/// be escaped; the unescape afterwards makes both paths agree.
fn fallback_scan(transaction_data: &Value) -> Option<String> {
    let raw = serde_json::to_string(transaction_data).ok()?;
    let pattern = Regex::new(r#"OCMF\|.*?\|.*?\{\\?"SD\\?":\\?".*?\\?"\}"#).ok()?;
    let matched = pattern.find(&raw)?;
    Some(matched.as_str().replace("\\\"", "\""))
}

// ── Tests ──────────────────────────────────────────────────────────────
