/// Core data types for the weather-station console.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains the wire-format display records, the normalized internal
/// observation, and the crate-wide error type — no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Normalized observation
// ---------------------------------------------------------------------------

/// A single normalized station observation, as held in the history buffer.
///
/// Measurements are stored in the units the upstream feed reports them in
/// (SI); conversion to display units happens in `conditions`. Every
/// measurement may be absent — NWS stations routinely drop individual
/// sensors from an observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station: String,
    pub timestamp: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub pressure_pa: Option<f64>,
}

// ---------------------------------------------------------------------------
// Display records (wire format of the station API)
// ---------------------------------------------------------------------------

/// The current-conditions record served by `GET /api/current`.
///
/// Field names match the JSON wire format exactly. All fields are optional:
/// a fresh deployment with no history yet serves `{}`, and any individual
/// measurement may be null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub timestamp_local: Option<String>,
    pub station: Option<String>,
    #[serde(rename = "temperature_F")]
    pub temperature_f: Option<f64>,
    #[serde(rename = "dry_bulb_F")]
    pub dry_bulb_f: Option<f64>,
    #[serde(rename = "wet_bulb_F")]
    pub wet_bulb_f: Option<f64>,
    pub humidity_percent: Option<f64>,
    #[serde(rename = "pressure_inHg")]
    pub pressure_inhg: Option<f64>,
}

/// One row of the rolling history served by `GET /api/history`.
///
/// Row order is defined by the producer (oldest to newest); the client
/// renders in the order received and never re-sorts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub timestamp_local: Option<String>,
    #[serde(rename = "temperature_F")]
    pub temperature_f: Option<f64>,
    #[serde(rename = "dry_bulb_F")]
    pub dry_bulb_f: Option<f64>,
    #[serde(rename = "wet_bulb_F")]
    pub wet_bulb_f: Option<f64>,
    pub humidity_percent: Option<f64>,
    #[serde(rename = "pressure_inHg")]
    pub pressure_inhg: Option<f64>,
}

/// One refresh cycle's worth of data, applied to the screen atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub current: CurrentConditions,
    pub history: Vec<HistoryRow>,
    /// Set when the current reading is older than the configured staleness
    /// threshold. Only computable for sources that expose raw timestamps.
    pub stale: bool,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or shaping observation data.
#[derive(Debug, PartialEq)]
pub enum WxError {
    /// Non-2xx HTTP response, carrying the status code.
    HttpError(u16),
    /// The request itself failed (DNS, connect, timeout).
    Transport(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The source answered but held no usable observations.
    NoDataAvailable(String),
    /// The system clipboard rejected the write.
    Clipboard(String),
}

impl std::fmt::Display for WxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WxError::HttpError(code) => write!(f, "HTTP error: {}", code),
            WxError::Transport(msg) => write!(f, "Request failed: {}", msg),
            WxError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            WxError::NoDataAvailable(what) => write!(f, "No data available: {}", what),
            WxError::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
        }
    }
}

impl std::error::Error for WxError {}

impl From<reqwest::Error> for WxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WxError::ParseError(err.to_string())
        } else {
            WxError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_carries_status_code() {
        let err = WxError::HttpError(503);
        assert_eq!(err.to_string(), "HTTP error: 503");
    }

    #[test]
    fn test_current_conditions_wire_names_round_trip() {
        let json = r#"{
            "timestamp_local": "2025-09-05 14:08 CDT",
            "station": "KMPR",
            "temperature_F": 72.5,
            "dry_bulb_F": 72.5,
            "wet_bulb_F": 61.2,
            "humidity_percent": 54.0,
            "pressure_inHg": 29.92
        }"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(current.station.as_deref(), Some("KMPR"));
        assert_eq!(current.dry_bulb_f, Some(72.5));
        assert_eq!(current.pressure_inhg, Some(29.92));

        let back = serde_json::to_value(&current).unwrap();
        assert!(back.get("temperature_F").is_some(), "capital-F wire name must survive");
        assert!(back.get("pressure_inHg").is_some(), "inHg wire name must survive");
    }

    #[test]
    fn test_empty_object_deserializes_with_all_fields_absent() {
        // A deployment with no observations yet serves {} from /api/current.
        let current: CurrentConditions = serde_json::from_str("{}").unwrap();
        assert_eq!(current, CurrentConditions::default());
    }

    #[test]
    fn test_null_fields_deserialize_to_none() {
        let json = r#"{"timestamp_local": null, "station": "KMPR", "temperature_F": null}"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(current.timestamp_local, None);
        assert_eq!(current.temperature_f, None);
        assert_eq!(current.station.as_deref(), Some("KMPR"));
    }
}
