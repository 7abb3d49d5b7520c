/// Observation staleness detection.
///
/// AWOS stations normally report every 5–20 minutes. A current reading
/// that is much older than the poll cadence means the station or the feed
/// has gone quiet, which is not obvious from an otherwise healthy screen.
/// The stamp line carries a stale marker when this check trips.
///
/// # Clock injection
/// `is_stale_at` accepts a `now: DateTime<Utc>` parameter rather than
/// calling `Utc::now()` internally, keeping the check deterministic in
/// tests.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Returns `true` if `observed` is older than `max_age_minutes` relative
/// to `now`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
///
/// An observation timestamped in the future (clock skew between the
/// station and this host) is never stale.
pub fn is_stale_at(observed: DateTime<Utc>, max_age_minutes: u64, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(observed);
    if age < chrono::Duration::zero() {
        return false;
    }
    age.num_minutes() as u64 > max_age_minutes
}

/// Convenience wrapper that uses the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(observed: DateTime<Utc>, max_age_minutes: u64) -> bool {
    is_stale_at(observed, max_age_minutes, Utc::now())
}
