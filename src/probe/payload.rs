//! Parsing of the `general_info.json` self-description.

use serde_json::Value;

use crate::directory::ServerInfo;
use crate::error_handling::{ProbeError, ProbeErrorType};
use crate::geo::GeoPoint;

/// Parses a `general_info.json` body.
///
/// The body must be a JSON object with non-empty string `city` and `state`.
/// Numeric `latitude` and `longitude` are picked up when both are present and
/// in range; anything else about them is ignored.
pub fn parse_general_info(body: &[u8]) -> Result<ServerInfo, ProbeError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProbeError::new(ProbeErrorType::Decode, e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ProbeError::new(
            ProbeErrorType::MalformedPayload,
            "expected a JSON object",
        ));
    };

    let city = required_text(&fields, "city")?;
    let state = required_text(&fields, "state")?;

    let location = match (
        fields.get("latitude").and_then(Value::as_f64),
        fields.get("longitude").and_then(Value::as_f64),
    ) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok(),
        _ => None,
    };

    Ok(ServerInfo {
        city,
        state,
        location,
    })
}

fn required_text(
    fields: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<String, ProbeError> {
    match fields.get(name).and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ProbeError::new(
            ProbeErrorType::MalformedPayload,
            format!("missing or empty {name}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_city_and_state() {
        let info = parse_general_info(br#"{"city": "Nashville", "state": "TN"}"#).unwrap();
        assert_eq!(info.city, "Nashville");
        assert_eq!(info.state, "TN");
        assert_eq!(info.location, None);
    }

    #[test]
    fn test_parse_optional_location() {
        let info = parse_general_info(
            br#"{"city": "Nashville", "state": "TN", "latitude": 36.17, "longitude": -86.78}"#,
        )
        .unwrap();
        assert_eq!(info.location, Some(GeoPoint::new(36.17, -86.78).unwrap()));

        // Out-of-range coordinates are dropped, not fatal
        let info = parse_general_info(
            br#"{"city": "Nashville", "state": "TN", "latitude": 136.0, "longitude": -86.78}"#,
        )
        .unwrap();
        assert_eq!(info.location, None);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = parse_general_info(br#"{"city": "Nashville"}"#).unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::MalformedPayload);

        let err = parse_general_info(br#"{"city": "", "state": "TN"}"#).unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::MalformedPayload);

        let err = parse_general_info(br#"{"city": 12, "state": "TN"}"#).unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::MalformedPayload);

        let err = parse_general_info(br#"["Nashville", "TN"]"#).unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::MalformedPayload);
    }

    #[test]
    fn test_unparsable_body_is_decode_error() {
        let err = parse_general_info(b"<html>It works!</html>").unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::Decode);
    }
}
