/// Runtime configuration.
///
/// Settings are resolved in three layers, later layers winning:
///   1. built-in defaults
///   2. the TOML config file (`wxmon.toml` by default)
///   3. environment variables (`.env` is loaded first via dotenv)
///
/// The environment contract matches the original deployment: `NWS_STATION`
/// selects the station and `NWS_USER_AGENT` sets the contact string the
/// NWS API policy requires.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

use crate::stations;

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Which backend supplies observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Consume the station's own HTTP API (/api/current, /api/history, …).
    StationApi,
    /// Poll api.weather.gov directly and derive display records locally.
    Nws,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: SourceKind,
    pub station: String,
    pub nws_base_url: String,
    pub nws_user_agent: String,
    pub api_base_url: String,
    pub poll_minutes: u64,
    pub history_hours: i64,
    pub stale_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceKind::Nws,
            station: stations::DEFAULT_STATION.to_string(),
            nws_base_url: "https://api.weather.gov".to_string(),
            // NWS requires a User-Agent with contact info per their policy.
            nws_user_agent: "wxmon-console (contact@example.com)".to_string(),
            api_base_url: "http://127.0.0.1:8000".to_string(),
            poll_minutes: 5,
            history_hours: 48,
            stale_minutes: 75,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file layer
// ---------------------------------------------------------------------------

/// Raw shape of the config file; every key optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    source: Option<String>,
    station: Option<String>,
    nws_base_url: Option<String>,
    nws_user_agent: Option<String>,
    api_base_url: Option<String>,
    poll_minutes: Option<u64>,
    history_hours: Option<i64>,
    stale_minutes: Option<u64>,
}

pub fn parse_source_kind(raw: &str) -> Result<SourceKind, Box<dyn Error>> {
    match raw {
        "nws" => Ok(SourceKind::Nws),
        "station-api" | "station_api" | "api" => Ok(SourceKind::StationApi),
        other => Err(format!("unknown source '{}' (expected 'nws' or 'station-api')", other).into()),
    }
}

impl Config {
    /// Load configuration from `path`, layered over defaults and under the
    /// environment. A missing file is not an error — defaults apply.
    pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
        let mut config = Config::default();

        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let file: FileConfig = toml::from_str(&raw)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            config.apply_file(file)?;
        }

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<(), Box<dyn Error>> {
        if let Some(raw) = file.source {
            self.source = parse_source_kind(&raw)?;
        }
        if let Some(v) = file.station {
            self.station = v;
        }
        if let Some(v) = file.nws_base_url {
            self.nws_base_url = v;
        }
        if let Some(v) = file.nws_user_agent {
            self.nws_user_agent = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.poll_minutes {
            self.poll_minutes = v;
        }
        if let Some(v) = file.history_hours {
            self.history_hours = v;
        }
        if let Some(v) = file.stale_minutes {
            self.stale_minutes = v;
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), Box<dyn Error>> {
        if let Ok(v) = std::env::var("NWS_STATION") {
            if !v.is_empty() {
                self.station = v;
            }
        }
        if let Ok(v) = std::env::var("NWS_USER_AGENT") {
            if !v.is_empty() {
                self.nws_user_agent = v;
            }
        }
        if let Ok(v) = std::env::var("WXMON_API_URL") {
            if !v.is_empty() {
                self.api_base_url = v;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !stations::is_valid_station_id(&self.station) {
            return Err(format!("'{}' does not look like a station identifier", self.station).into());
        }
        if self.poll_minutes == 0 {
            return Err("poll_minutes must be at least 1".into());
        }
        if self.history_hours <= 0 {
            return Err("history_hours must be positive".into());
        }
        Ok(())
    }
}
