/// Offline replay of an exported history CSV.
///
/// When the live feed is unavailable, point `--replay` at a file produced
/// by the CSV copy action and the screen renders from it instead of the
/// network. Useful for development and for eyeballing an old export.

use std::error::Error;
use std::path::Path;

use crate::model::{CurrentConditions, HistoryRow, Snapshot};

/// Load and parse an exported `history.csv`.
pub fn load_history_csv(path: &Path) -> Result<Vec<HistoryRow>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(parse_history_csv(&text))
}

/// Parse CSV text in the export format. The header line and blank lines
/// are skipped, as are rows with fewer than the six expected cells.
pub fn parse_history_csv(text: &str) -> Vec<HistoryRow> {
    let mut rows = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if i == 0 || line.trim().is_empty() {
            continue; // Skip header or empty lines
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 6 {
            continue; // Skip incomplete rows
        }

        // Blank cells mean the measurement was missing.
        let parse_field = |s: &str| -> Option<f64> {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        };

        let timestamp_local = {
            let trimmed = fields[0].trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        rows.push(HistoryRow {
            timestamp_local,
            temperature_f: parse_field(fields[1]),
            dry_bulb_f: parse_field(fields[2]),
            wet_bulb_f: parse_field(fields[3]),
            humidity_percent: parse_field(fields[4]),
            pressure_inhg: parse_field(fields[5]),
        });
    }

    rows
}

/// Build a displayable snapshot from replayed rows: the newest row stands
/// in for the current reading.
pub fn snapshot_from_rows(rows: Vec<HistoryRow>, station: &str) -> Snapshot {
    let current = match rows.last() {
        Some(row) => CurrentConditions {
            timestamp_local: row.timestamp_local.clone(),
            station: Some(station.to_string()),
            temperature_f: row.temperature_f,
            dry_bulb_f: row.dry_bulb_f,
            wet_bulb_f: row.wet_bulb_f,
            humidity_percent: row.humidity_percent,
            pressure_inhg: row.pressure_inhg,
        },
        None => CurrentConditions::default(),
    };

    Snapshot {
        current,
        history: rows,
        stale: false,
    }
}
