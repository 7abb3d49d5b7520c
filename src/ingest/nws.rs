/// NWS (National Weather Service) observations API client.
///
/// Retrieves station observations from api.weather.gov for the current
/// reading and the rolling history backfill.
///
/// API documentation: https://www.weather.gov/documentation/services-web-api
/// Relevant endpoints:
///   /stations/{id}/observations/latest
///   /stations/{id}/observations?start&end&limit
///
/// NWS requires a User-Agent string with contact info per their policy;
/// it is threaded through from config on every request.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::model::{Observation, WxError};
use crate::units;

/// Page size for windowed observation queries. 1000 is the documented safe
/// maximum; larger requests get truncated server-side.
const WINDOW_PAGE_LIMIT: u32 = 1000;

// ============================================================================
// NWS API Response Structures
// ============================================================================

/// A measured quantity with its WMO unit code. `value` is null whenever the
/// sensor dropped out of that observation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    pub unit_code: Option<String>,
    pub value: Option<f64>,
}

/// The `properties` object of a GeoJSON observation feature, trimmed to the
/// fields this tool consumes. Temperatures arrive in °C, pressure in Pa.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationProperties {
    pub timestamp: Option<String>,
    #[serde(default)]
    pub temperature: QuantitativeValue,
    #[serde(default)]
    pub dewpoint: QuantitativeValue,
    #[serde(default)]
    pub relative_humidity: QuantitativeValue,
    #[serde(default)]
    pub barometric_pressure: QuantitativeValue,
    #[serde(default)]
    pub sea_level_pressure: QuantitativeValue,
}

#[derive(Debug, Deserialize)]
pub struct ObservationFeature {
    pub properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
struct CollectionLink {
    rel: Option<String>,
    href: Option<String>,
}

/// A paginated observation window. `links` carries a `rel: "next"` entry
/// while more pages remain.
#[derive(Debug, Deserialize)]
struct ObservationCollection {
    #[serde(default)]
    features: Vec<ObservationFeature>,
    #[serde(default)]
    links: Vec<CollectionLink>,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Build the blocking HTTP client used for all NWS requests.
pub fn build_client() -> Result<reqwest::blocking::Client, WxError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| WxError::Transport(e.to_string()))
}

/// Fetch the latest observation for the configured station.
pub fn fetch_latest(
    client: &reqwest::blocking::Client,
    config: &Config,
) -> Result<Observation, WxError> {
    let url = format!(
        "{}/stations/{}/observations/latest",
        config.nws_base_url, config.station
    );

    let response = client
        .get(&url)
        .header("User-Agent", &config.nws_user_agent)
        .header("Accept", "application/geo+json")
        .send()?;

    if !response.status().is_success() {
        return Err(WxError::HttpError(response.status().as_u16()));
    }

    let feature: ObservationFeature = response
        .json()
        .map_err(|e| WxError::ParseError(e.to_string()))?;

    parse_properties(feature.properties, &config.station)
}

/// Fetch all observations between `start` and `end`, following pagination
/// links until exhausted. The merged result is sorted oldest → newest.
pub fn fetch_window(
    client: &reqwest::blocking::Client,
    config: &Config,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Observation>, WxError> {
    let mut url = format!(
        "{}/stations/{}/observations?start={}&end={}&limit={}",
        config.nws_base_url,
        config.station,
        to_rfc3339_seconds(start),
        to_rfc3339_seconds(end),
        WINDOW_PAGE_LIMIT,
    );

    let mut observations = Vec::new();
    loop {
        let response = client
            .get(&url)
            .header("User-Agent", &config.nws_user_agent)
            .header("Accept", "application/geo+json")
            .send()?;

        if !response.status().is_success() {
            return Err(WxError::HttpError(response.status().as_u16()));
        }

        let page: ObservationCollection = response
            .json()
            .map_err(|e| WxError::ParseError(e.to_string()))?;

        for feature in page.features {
            // Observations without a parseable timestamp cannot live in the
            // history window; skip them rather than failing the backfill.
            if let Ok(obs) = parse_properties(feature.properties, &config.station) {
                observations.push(obs);
            }
        }

        // Pagination: follow the "next" link if present. The href already
        // carries the query parameters.
        let next = page
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("next"))
            .and_then(|l| l.href.clone());
        match next {
            Some(next_url) => url = next_url,
            None => break,
        }
    }

    observations.sort_by_key(|o| o.timestamp);
    Ok(observations)
}

/// Fetch the configured retention window ending now. Startup backfill.
pub fn fetch_backfill(
    client: &reqwest::blocking::Client,
    config: &Config,
) -> Result<Vec<Observation>, WxError> {
    let end = Utc::now();
    let start = end - Duration::hours(config.history_hours);
    fetch_window(client, config, start, end)
}

// ============================================================================
// Parsing
// ============================================================================

/// RFC 3339 at second precision, e.g. `2025-09-05T14:08:00Z`. The NWS
/// window endpoint rejects fractional-second bounds.
fn to_rfc3339_seconds(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Map observation properties to a normalized `Observation`.
///
/// Prefers `barometricPressure`, falling back to `seaLevelPressure`, and
/// derives relative humidity from the dewpoint when the feed omits it.
pub fn parse_properties(
    props: ObservationProperties,
    station: &str,
) -> Result<Observation, WxError> {
    let raw_ts = props
        .timestamp
        .ok_or_else(|| WxError::ParseError("observation has no timestamp".to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| WxError::ParseError(format!("bad observation timestamp '{}': {}", raw_ts, e)))?
        .with_timezone(&Utc);

    let temperature_c = props.temperature.value;
    let dewpoint_c = props.dewpoint.value;
    let humidity_percent = props
        .relative_humidity
        .value
        .or_else(|| units::rh_from_t_and_td(temperature_c, dewpoint_c));
    let pressure_pa = props
        .barometric_pressure
        .value
        .or(props.sea_level_pressure.value);

    Ok(Observation {
        station: station.to_string(),
        timestamp,
        temperature_c,
        dewpoint_c,
        humidity_percent,
        pressure_pa,
    })
}

// ============================================================================
// Tests
// ============================================================================
