/// Client for the weather station's own HTTP API.
///
/// Three read-only endpoints, consumed as served:
///   GET /api/current      → CurrentConditions (JSON object)
///   GET /api/history      → Vec<HistoryRow> (JSON array, server-ordered)
///   GET /api/history.csv  → CSV body, copied verbatim to the clipboard
///
/// Every request bypasses intermediary caches (`Cache-Control: no-store`)
/// so a manual refresh always reflects the feed, and any non-2xx status
/// becomes `WxError::HttpError` carrying the code. No retries.

use crate::model::{CurrentConditions, HistoryRow, WxError};

pub struct StationApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl StationApiClient {
    pub fn new(base_url: &str) -> Result<Self, WxError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| WxError::Transport(e.to_string()))?;
        Ok(StationApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Cache-bypassing GET, failing on any non-2xx status.
    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, WxError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Cache-Control", "no-store")
            .send()?;

        if !response.status().is_success() {
            return Err(WxError::HttpError(response.status().as_u16()));
        }
        Ok(response)
    }

    pub fn fetch_current(&self) -> Result<CurrentConditions, WxError> {
        let body = self.get("/api/current")?.text()?;
        parse_current(&body)
    }

    pub fn fetch_history(&self) -> Result<Vec<HistoryRow>, WxError> {
        let body = self.get("/api/history")?.text()?;
        parse_history(&body)
    }

    /// The CSV body as served — byte-for-byte what lands on the clipboard.
    pub fn fetch_history_csv(&self) -> Result<String, WxError> {
        self.get("/api/history.csv")?.text().map_err(WxError::from)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// ---------------------------------------------------------------------------
// Body parsing
// ---------------------------------------------------------------------------

pub fn parse_current(body: &str) -> Result<CurrentConditions, WxError> {
    serde_json::from_str(body).map_err(|e| WxError::ParseError(e.to_string()))
}

pub fn parse_history(body: &str) -> Result<Vec<HistoryRow>, WxError> {
    serde_json::from_str(body).map_err(|e| WxError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_with_all_fields() {
        let body = r#"{
            "timestamp_local": "2025-09-05 14:08 CDT",
            "station": "KMPR",
            "temperature_F": 73.0,
            "dry_bulb_F": 73.0,
            "wet_bulb_F": 61.4,
            "humidity_percent": 52.0,
            "pressure_inHg": 29.91
        }"#;
        let current = parse_current(body).unwrap();
        assert_eq!(current.station.as_deref(), Some("KMPR"));
        assert_eq!(current.wet_bulb_f, Some(61.4));
    }

    #[test]
    fn test_parse_current_empty_object() {
        // The server answers {} before its first successful poll.
        let current = parse_current("{}").unwrap();
        assert_eq!(current, CurrentConditions::default());
    }

    #[test]
    fn test_parse_history_preserves_server_order() {
        let body = r#"[
            {"timestamp_local": "2025-09-05 12:08", "temperature_F": 71.1},
            {"timestamp_local": "2025-09-05 13:08", "temperature_F": 72.3},
            {"timestamp_local": "2025-09-05 11:08", "temperature_F": 70.2}
        ]"#;
        let rows = parse_history(body).unwrap();
        assert_eq!(rows.len(), 3);
        // Whatever order the server chose is the order we keep.
        assert_eq!(rows[0].timestamp_local.as_deref(), Some("2025-09-05 12:08"));
        assert_eq!(rows[2].timestamp_local.as_deref(), Some("2025-09-05 11:08"));
    }

    #[test]
    fn test_parse_history_empty_array() {
        let rows = parse_history("[]").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_history_rows_with_nulls() {
        let body = r#"[{"timestamp_local": "2025-09-05 12:08", "temperature_F": null,
                        "dry_bulb_F": null, "wet_bulb_F": null,
                        "humidity_percent": null, "pressure_inHg": null}]"#;
        let rows = parse_history(body).unwrap();
        assert_eq!(rows[0].temperature_f, None);
        assert_eq!(rows[0].pressure_inhg, None);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(matches!(parse_current("<html>"), Err(WxError::ParseError(_))));
        assert!(matches!(parse_history("{}"), Err(WxError::ParseError(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = StationApiClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }
}
