/// Rolling in-memory observation history.
///
/// Holds observations oldest → newest and enforces a retention window on
/// every mutation. Nothing is persisted; a restart re-backfills from the
/// upstream feed.
///
/// # Clock injection
/// Mutating methods take `now: DateTime<Utc>` rather than calling
/// `Utc::now()` internally, so retention behavior is deterministic in tests.

use chrono::{DateTime, Duration, Utc};

use crate::model::Observation;

pub struct HistoryBuffer {
    observations: Vec<Observation>,
    retention: Duration,
}

impl HistoryBuffer {
    pub fn new(retention_hours: i64) -> Self {
        HistoryBuffer {
            observations: Vec::new(),
            retention: Duration::hours(retention_hours),
        }
    }

    /// Replace the buffer contents wholesale, then prune. Used on startup
    /// backfill. Input is expected oldest → newest (the ingest layer sorts
    /// paginated windows before returning them).
    pub fn backfill_at(&mut self, observations: Vec<Observation>, now: DateTime<Utc>) {
        self.observations = observations;
        self.prune_at(now);
    }

    /// Append a freshly polled observation, deduplicating on timestamp:
    /// the feed's `latest` endpoint returns the same observation until the
    /// station reports again. Returns `true` if the observation was kept.
    pub fn push_latest_at(&mut self, observation: Observation, now: DateTime<Utc>) -> bool {
        if self.latest().map(|o| o.timestamp) == Some(observation.timestamp) {
            return false;
        }
        self.observations.push(observation);
        self.prune_at(now);
        true
    }

    /// Drop observations older than the retention window. A reading exactly
    /// at the window edge is kept.
    pub fn prune_at(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        self.observations.retain(|o| o.timestamp >= cutoff);
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs_at(timestamp: DateTime<Utc>) -> Observation {
        Observation {
            station: "KMPR".to_string(),
            timestamp,
            temperature_c: Some(22.0),
            dewpoint_c: Some(12.0),
            humidity_percent: Some(53.0),
            pressure_pa: Some(101_325.0),
        }
    }

    /// A fixed "now" used across all tests: 2025-09-05 18:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 5, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_push_keeps_new_timestamp() {
        let mut buffer = HistoryBuffer::new(48);
        let kept = buffer.push_latest_at(obs_at(fixed_now()), fixed_now());
        assert!(kept);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_push_drops_repeated_timestamp() {
        // `latest` returns the same observation until the station updates;
        // polling every 5 minutes must not duplicate rows.
        let mut buffer = HistoryBuffer::new(48);
        let ts = fixed_now() - Duration::minutes(3);
        assert!(buffer.push_latest_at(obs_at(ts), fixed_now()));
        assert!(!buffer.push_latest_at(obs_at(ts), fixed_now()));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_prune_drops_only_expired_rows() {
        let mut buffer = HistoryBuffer::new(48);
        let now = fixed_now();
        buffer.backfill_at(
            vec![
                obs_at(now - Duration::hours(50)),
                obs_at(now - Duration::hours(47)),
                obs_at(now - Duration::hours(1)),
            ],
            now,
        );
        assert_eq!(buffer.len(), 2, "the 50h-old row should be pruned");
        assert_eq!(buffer.as_slice()[0].timestamp, now - Duration::hours(47));
    }

    #[test]
    fn test_row_exactly_at_window_edge_is_kept() {
        let mut buffer = HistoryBuffer::new(48);
        let now = fixed_now();
        buffer.backfill_at(vec![obs_at(now - Duration::hours(48))], now);
        assert_eq!(buffer.len(), 1, "edge row is within the window, not past it");
    }

    #[test]
    fn test_latest_is_newest_row() {
        let mut buffer = HistoryBuffer::new(48);
        let now = fixed_now();
        buffer.backfill_at(
            vec![obs_at(now - Duration::hours(2)), obs_at(now - Duration::hours(1))],
            now,
        );
        assert_eq!(buffer.latest().unwrap().timestamp, now - Duration::hours(1));
    }

    #[test]
    fn test_backfill_replaces_existing_contents() {
        let mut buffer = HistoryBuffer::new(48);
        let now = fixed_now();
        buffer.push_latest_at(obs_at(now - Duration::hours(5)), now);
        buffer.backfill_at(vec![obs_at(now - Duration::hours(1))], now);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().timestamp, now - Duration::hours(1));
    }
}
