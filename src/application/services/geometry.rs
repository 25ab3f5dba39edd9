//! Geometry extraction
//!
//! Pulls a usable ecliptic longitude out of arbitrarily shaped records:
//! flat degree fields, nested ecliptic sub-objects, degree–minute–second
//! sub-fields, or DMS-formatted text. Absence is `None`, never 0°.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::wrap360;

/// Flat candidate fields tried, in priority order, on a point-like record.
const DEGREE_FIELDS: [&str; 5] = ["longitude", "lon", "abs_pos", "value", "position"];

/// Cusp-flavored fields, tried after the plain degree fields.
const CUSP_FIELDS: [&str; 2] = ["cusp", "cusp_longitude"];

/// Tolerant DMS pattern: optional sign, integer or decimal degrees with an
/// optional `°`, then optional minutes and seconds, each with their unit
/// mark. `34°12'05"`, `-12.5`, `7° 30'` all match.
fn dms_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*([+-])?\s*(\d+(?:[.,]\d+)?)\s*°?\s*(?:(\d+(?:[.,]\d+)?)\s*['’m])?\s*(?:(\d+(?:[.,]\d+)?)\s*["”s])?"#,
        )
        .expect("DMS pattern is valid")
    })
}

/// Parse an angle from a JSON scalar: a finite number, DMS text, or a
/// locale-tolerant plain decimal (comma accepted as decimal separator).
/// The result is *not* wrapped; separations and orbs need the raw value.
pub fn parse_angle(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_angle_text(s),
        _ => None,
    }
}

/// Parse an angle from text. See [`parse_angle`].
pub fn parse_angle_text(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(caps) = dms_pattern().captures(s) {
        if let Some(deg) = caps.get(2).and_then(|m| parse_decimal(m.as_str())) {
            let minutes = caps.get(3).and_then(|m| parse_decimal(m.as_str())).unwrap_or(0.0);
            let seconds = caps.get(4).and_then(|m| parse_decimal(m.as_str())).unwrap_or(0.0);
            let magnitude = deg + minutes / 60.0 + seconds / 3600.0;
            let signed = if caps.get(1).map(|m| m.as_str()) == Some("-") {
                -magnitude
            } else {
                magnitude
            };
            if signed.is_finite() {
                return Some(signed);
            }
        }
    }
    parse_decimal(s)
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Extract an ecliptic longitude from a record, normalized into `[0,360)`.
///
/// Scalars parse directly. Objects are probed field by field in a fixed
/// priority order; the first candidate yielding a finite value wins.
pub fn longitude_of(record: &Value) -> Option<f64> {
    let raw = match record {
        Value::Number(_) | Value::String(_) => parse_angle(record),
        Value::Object(map) => {
            let flat = DEGREE_FIELDS
                .iter()
                .filter_map(|f| map.get(*f))
                .find_map(parse_angle);
            flat.or_else(|| {
                map.get("ecliptic").and_then(|e| {
                    e.get("lon").or_else(|| e.get("longitude")).and_then(parse_angle)
                })
            })
            .or_else(|| CUSP_FIELDS.iter().filter_map(|f| map.get(*f)).find_map(parse_angle))
            .or_else(|| dms_fields(map))
        }
        _ => None,
    };
    raw.map(wrap360)
}

/// Degree–minute–second sub-fields (`degrees`/`deg`, `minutes`/`min`,
/// `seconds`/`sec`). Degrees are required; absent sub-units default to 0.
fn dms_fields(map: &serde_json::Map<String, Value>) -> Option<f64> {
    let degrees = map.get("degrees").or_else(|| map.get("deg")).and_then(parse_angle)?;
    let minutes = map
        .get("minutes")
        .or_else(|| map.get("min"))
        .and_then(parse_angle)
        .unwrap_or(0.0);
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("sec"))
        .and_then(parse_angle)
        .unwrap_or(0.0);
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}
