/// Observation sources and the refresh cycle.
///
/// A `Source` produces one `Snapshot` per refresh. Two backends exist:
///
/// - `StationApi` fetches `/api/current` and `/api/history` as a
///   fan-out/fan-in pair — both requests run concurrently and the cycle
///   completes only when both have joined. The two records populate
///   disjoint screen regions, so no ordering between them is needed.
/// - `NwsDirect` polls api.weather.gov, maintains the rolling history
///   buffer locally (48h backfill on first refresh), and derives the same
///   display records the station API would serve.
///
/// A refresh that fails leaves no partial state behind; the caller keeps
/// whatever snapshot it already had.

use chrono::Utc;

use crate::config::{Config, SourceKind};
use crate::conditions;
use crate::history::HistoryBuffer;
use crate::ingest::{nws, station_api::StationApiClient};
use crate::logging;
use crate::model::{Snapshot, WxError};
use crate::staleness;

pub enum Source {
    StationApi(StationApiClient),
    NwsDirect(NwsFeed),
}

impl Source {
    pub fn from_config(config: &Config) -> Result<Source, WxError> {
        match config.source {
            SourceKind::StationApi => {
                Ok(Source::StationApi(StationApiClient::new(&config.api_base_url)?))
            }
            SourceKind::Nws => Ok(Source::NwsDirect(NwsFeed::new(config.clone())?)),
        }
    }

    /// Run one refresh cycle and return the snapshot to display.
    pub fn refresh(&mut self) -> Result<Snapshot, WxError> {
        match self {
            Source::StationApi(api) => {
                // Fan out the two loaders, join both before applying either.
                let (current, history) = std::thread::scope(|s| {
                    let current = s.spawn(|| api.fetch_current());
                    let history = s.spawn(|| api.fetch_history());
                    (join_fetch(current), join_fetch(history))
                });
                Ok(Snapshot {
                    current: current?,
                    history: history?,
                    // The API serves pre-formatted local timestamps; raw
                    // observation times are not available on this path.
                    stale: false,
                })
            }
            Source::NwsDirect(feed) => feed.refresh(),
        }
    }

    /// The history CSV text for the clipboard action. Reflects the feed as
    /// served (station API) or the buffer as currently held (direct NWS).
    pub fn history_csv(&mut self) -> Result<String, WxError> {
        match self {
            Source::StationApi(api) => api.fetch_history_csv(),
            Source::NwsDirect(feed) => Ok(feed.history_csv()),
        }
    }

    pub fn log_source(&self) -> logging::DataSource {
        match self {
            Source::StationApi(_) => logging::DataSource::StationApi,
            Source::NwsDirect(_) => logging::DataSource::Nws,
        }
    }

    pub fn station_label(&self) -> String {
        match self {
            Source::StationApi(api) => api.base_url().to_string(),
            Source::NwsDirect(feed) => feed.config.station.clone(),
        }
    }
}

fn join_fetch<T>(handle: std::thread::ScopedJoinHandle<'_, Result<T, WxError>>) -> Result<T, WxError> {
    handle
        .join()
        .map_err(|_| WxError::Transport("fetch thread panicked".to_string()))?
}

// ---------------------------------------------------------------------------
// Direct NWS feed
// ---------------------------------------------------------------------------

pub struct NwsFeed {
    client: reqwest::blocking::Client,
    config: Config,
    buffer: HistoryBuffer,
    backfilled: bool,
}

impl NwsFeed {
    pub fn new(config: Config) -> Result<Self, WxError> {
        let client = nws::build_client()?;
        let buffer = HistoryBuffer::new(config.history_hours);
        Ok(NwsFeed {
            client,
            config,
            buffer,
            backfilled: false,
        })
    }

    fn refresh(&mut self) -> Result<Snapshot, WxError> {
        let now = Utc::now();

        // First refresh seeds the retention window; later refreshes only
        // poll the latest observation.
        if !self.backfilled {
            let fetched = nws::fetch_backfill(&self.client, &self.config)?;
            let count = fetched.len();
            self.buffer.backfill_at(fetched, now);
            logging::log_backfill_summary(
                &self.config.station,
                self.config.history_hours,
                count,
                self.buffer.len(),
            );
            self.backfilled = true;
        } else {
            let latest = nws::fetch_latest(&self.client, &self.config)?;
            self.buffer.push_latest_at(latest, now);
        }

        Ok(self.snapshot_at(now))
    }

    fn snapshot_at(&self, now: chrono::DateTime<Utc>) -> Snapshot {
        let current = match self.buffer.latest() {
            Some(obs) => conditions::current_from(obs),
            // No observations yet: the empty record, every field blank.
            None => Default::default(),
        };
        let stale = self
            .buffer
            .latest()
            .map(|obs| staleness::is_stale_at(obs.timestamp, self.config.stale_minutes, now))
            .unwrap_or(false);
        let history = self
            .buffer
            .as_slice()
            .iter()
            .map(conditions::history_row_from)
            .collect();
        Snapshot {
            current,
            history,
            stale,
        }
    }

    fn history_csv(&self) -> String {
        let rows: Vec<_> = self
            .buffer
            .as_slice()
            .iter()
            .map(conditions::history_row_from)
            .collect();
        conditions::history_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use chrono::{Duration, TimeZone};

    fn feed_with_buffer(observations: Vec<Observation>) -> NwsFeed {
        let config = Config::default();
        let mut feed = NwsFeed::new(config).expect("client builds");
        let now = fixed_now();
        feed.buffer.backfill_at(observations, now);
        feed
    }

    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 5, 18, 0, 0).unwrap()
    }

    fn obs_minutes_ago(minutes: i64) -> Observation {
        Observation {
            station: "KMPR".to_string(),
            timestamp: fixed_now() - Duration::minutes(minutes),
            temperature_c: Some(20.0),
            dewpoint_c: Some(10.0),
            humidity_percent: Some(52.0),
            pressure_pa: Some(101_325.0),
        }
    }

    #[test]
    fn test_empty_feed_snapshot_is_blank_not_an_error() {
        let feed = feed_with_buffer(vec![]);
        let snapshot = feed.snapshot_at(fixed_now());
        assert_eq!(snapshot.current, Default::default());
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.stale);
    }

    #[test]
    fn test_snapshot_current_comes_from_newest_observation() {
        let feed = feed_with_buffer(vec![obs_minutes_ago(60), obs_minutes_ago(10)]);
        let snapshot = feed.snapshot_at(fixed_now());
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.current.station.as_deref(), Some("KMPR"));
        assert_eq!(snapshot.current.temperature_f, Some(68.0));
        assert!(!snapshot.stale, "10-minute-old reading is fresh");
    }

    #[test]
    fn test_snapshot_marks_stale_reading() {
        let feed = feed_with_buffer(vec![obs_minutes_ago(200)]);
        let snapshot = feed.snapshot_at(fixed_now());
        assert!(snapshot.stale, "200-minute-old reading exceeds the 75-minute default");
    }

    #[test]
    fn test_local_csv_matches_snapshot_rows() {
        let feed = feed_with_buffer(vec![obs_minutes_ago(30), obs_minutes_ago(10)]);
        let csv = feed.history_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], conditions::CSV_HEADER);
        assert_eq!(lines.len(), 3, "header plus one line per buffered observation");
    }
}
