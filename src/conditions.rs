/// Shaping normalized observations into display records.
///
/// This is where SI feed units become display units, wet-bulb is derived,
/// timestamps are localized, and the history CSV is serialized. The station
/// API performs the same shaping server-side; in direct-NWS mode this
/// module produces identical records locally.
///
/// Rounding: temperatures to 1 decimal, humidity to whole percent,
/// pressure to 2 decimals.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::{CurrentConditions, HistoryRow, Observation};
use crate::units;

/// Column order of the history table and CSV. Fixed; renderers and the CSV
/// writer must agree with it.
pub const CSV_HEADER: &str =
    "timestamp_local,temperature_F,dry_bulb_F,wet_bulb_F,humidity_percent,pressure_inHg";

// ---------------------------------------------------------------------------
// Record shaping
// ---------------------------------------------------------------------------

/// Shape the latest observation into the current-conditions record, in the
/// host's local timezone.
pub fn current_from(obs: &Observation) -> CurrentConditions {
    current_from_tz(obs, &Local)
}

/// Timezone-parameterized variant for deterministic tests.
pub fn current_from_tz<Tz: TimeZone>(obs: &Observation, tz: &Tz) -> CurrentConditions
where
    Tz::Offset: std::fmt::Display,
{
    let (dry_f, wet_f, humidity, pressure) = derive_measurements(obs);
    CurrentConditions {
        timestamp_local: Some(format_stamp(obs.timestamp, tz, true)),
        station: Some(obs.station.clone()),
        temperature_f: dry_f,
        dry_bulb_f: dry_f,
        wet_bulb_f: wet_f,
        humidity_percent: humidity,
        pressure_inhg: pressure,
    }
}

/// Shape one observation into a history row (local time, no zone suffix).
pub fn history_row_from(obs: &Observation) -> HistoryRow {
    history_row_from_tz(obs, &Local)
}

pub fn history_row_from_tz<Tz: TimeZone>(obs: &Observation, tz: &Tz) -> HistoryRow
where
    Tz::Offset: std::fmt::Display,
{
    let (dry_f, wet_f, humidity, pressure) = derive_measurements(obs);
    HistoryRow {
        timestamp_local: Some(format_stamp(obs.timestamp, tz, false)),
        temperature_f: dry_f,
        dry_bulb_f: dry_f,
        wet_bulb_f: wet_f,
        humidity_percent: humidity,
        pressure_inhg: pressure,
    }
}

/// The shared derivation: °F dry bulb, Stull wet bulb (needs both
/// temperature and humidity), rounded humidity, inHg pressure.
fn derive_measurements(
    obs: &Observation,
) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    let dry_f = units::c_to_f(obs.temperature_c).map(|v| units::round_to(v, 1));
    let wet_f = units::c_to_f(units::wet_bulb_stull_c(
        obs.temperature_c,
        obs.humidity_percent,
    ))
    .map(|v| units::round_to(v, 1));
    let humidity = obs.humidity_percent.map(|v| units::round_to(v, 0));
    let pressure = units::pa_to_inhg(obs.pressure_pa).map(|v| units::round_to(v, 2));
    (dry_f, wet_f, humidity, pressure)
}

fn format_stamp<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz, with_zone: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = ts.with_timezone(tz);
    if with_zone {
        local.format("%Y-%m-%d %H:%M %Z").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

// ---------------------------------------------------------------------------
// CSV serialization
// ---------------------------------------------------------------------------

/// Serialize history rows as CSV: fixed header, one line per row, blank
/// cells for missing values, no trailing newline.
pub fn history_csv(rows: &[HistoryRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in rows {
        lines.push(format!(
            "{},{},{},{},{},{}",
            row.timestamp_local.as_deref().unwrap_or(""),
            fmt_cell(row.temperature_f, 1),
            fmt_cell(row.dry_bulb_f, 1),
            fmt_cell(row.wet_bulb_f, 1),
            fmt_cell(row.humidity_percent, 0),
            fmt_cell(row.pressure_inhg, 2),
        ));
    }
    lines.join("\n")
}

fn fmt_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn cdt() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn obs() -> Observation {
        Observation {
            station: "KMPR".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 9, 5, 19, 8, 0).unwrap(),
            temperature_c: Some(22.8),
            dewpoint_c: Some(12.2),
            humidity_percent: Some(51.4),
            pressure_pa: Some(101_250.0),
        }
    }

    #[test]
    fn test_current_record_values_and_rounding() {
        let current = current_from_tz(&obs(), &cdt());
        assert_eq!(current.station.as_deref(), Some("KMPR"));
        // 22.8 °C → 73.04 °F → 73.0 after rounding.
        assert_eq!(current.temperature_f, Some(73.0));
        assert_eq!(current.dry_bulb_f, Some(73.0));
        // Humidity rounds to whole percent.
        assert_eq!(current.humidity_percent, Some(51.0));
        // 101250 Pa → 29.898… inHg → 29.90.
        assert_eq!(current.pressure_inhg, Some(29.9));
        let wet = current.wet_bulb_f.expect("wet bulb derivable from temp + RH");
        assert!(wet < 73.0, "wet bulb must sit below dry bulb, got {}", wet);
    }

    #[test]
    fn test_current_stamp_is_localized_with_zone() {
        let current = current_from_tz(&obs(), &cdt());
        // 19:08 UTC at UTC-5 is 14:08 local; %Z renders the offset.
        assert_eq!(current.timestamp_local.as_deref(), Some("2025-09-05 14:08 -05:00"));
    }

    #[test]
    fn test_history_stamp_has_no_zone_suffix() {
        let row = history_row_from_tz(&obs(), &cdt());
        assert_eq!(row.timestamp_local.as_deref(), Some("2025-09-05 14:08"));
    }

    #[test]
    fn test_missing_measurements_stay_missing() {
        let mut o = obs();
        o.temperature_c = None;
        o.pressure_pa = None;
        let current = current_from_tz(&o, &cdt());
        assert_eq!(current.temperature_f, None);
        assert_eq!(current.dry_bulb_f, None);
        assert_eq!(current.wet_bulb_f, None, "no wet bulb without temperature");
        assert_eq!(current.pressure_inhg, None);
        // Humidity survives on its own.
        assert_eq!(current.humidity_percent, Some(51.0));
    }

    #[test]
    fn test_csv_header_and_cells() {
        let rows = vec![history_row_from_tz(&obs(), &cdt())];
        let csv = history_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("2025-09-05 14:08,73.0,73.0,61.4,51,29.90"));
        assert_eq!(lines.next(), None, "no trailing newline");
    }

    #[test]
    fn test_csv_blank_cells_for_missing_values() {
        let row = HistoryRow {
            timestamp_local: Some("2025-09-05 14:08".to_string()),
            ..HistoryRow::default()
        };
        let csv = history_csv(&[row]);
        assert_eq!(csv.lines().nth(1), Some("2025-09-05 14:08,,,,,"));
    }

    #[test]
    fn test_csv_of_empty_history_is_header_only() {
        assert_eq!(history_csv(&[]), CSV_HEADER);
    }
}
