/// Text rendering for the console screen.
///
/// Everything here is pure string production so the display contract is
/// testable without a terminal; `ui` owns actually putting these lines on
/// screen. Missing values render as blanks, never as a "null" placeholder,
/// and unit suffixes are always present.

use crate::model::{CurrentConditions, HistoryRow};

/// Label shown on the copy action when idle.
pub const COPY_LABEL_IDLE: &str = "[c] copy CSV";
/// Label shown briefly after a successful clipboard write.
pub const COPY_LABEL_DONE: &str = "[c] copied!";

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Render a JSON number the way a browser template would interpolate it:
/// `73.0` → "73", `72.5` → "72.5", absent → "".
fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Current-conditions panel
// ---------------------------------------------------------------------------

/// The details panel: one line per measurement, value then unit suffix.
pub fn render_current_panel(current: &CurrentConditions) -> Vec<String> {
    vec![
        format!("Dry bulb   {} °F", fmt_value(current.dry_bulb_f)),
        format!("Wet bulb   {} °F", fmt_value(current.wet_bulb_f)),
        format!("Humidity   {} %", fmt_value(current.humidity_percent)),
        format!("Pressure   {} inHg", fmt_value(current.pressure_inhg)),
    ]
}

/// The timestamp/station stamp line under the panel.
pub fn render_stamp(current: &CurrentConditions, stale: bool) -> String {
    let marker = if stale { "  [STALE]" } else { "" };
    format!(
        "Updated {} · {}{}",
        current.timestamp_local.as_deref().unwrap_or(""),
        current.station.as_deref().unwrap_or(""),
        marker,
    )
}

// ---------------------------------------------------------------------------
// History table
// ---------------------------------------------------------------------------

const COLUMN_WIDTHS: [usize; 6] = [18, 8, 10, 10, 10, 10];

/// The six cells of one history row, in the fixed column order:
/// timestamp, temperature, dry bulb, wet bulb, humidity, pressure.
pub fn row_cells(row: &HistoryRow) -> [String; 6] {
    [
        row.timestamp_local.clone().unwrap_or_default(),
        fmt_value(row.temperature_f),
        fmt_value(row.dry_bulb_f),
        fmt_value(row.wet_bulb_f),
        fmt_value(row.humidity_percent),
        fmt_value(row.pressure_inhg),
    ]
}

pub fn history_header() -> String {
    layout_row(&[
        "Local time".to_string(),
        "Temp °F".to_string(),
        "Dry °F".to_string(),
        "Wet °F".to_string(),
        "Hum %".to_string(),
        "inHg".to_string(),
    ])
}

/// One rendered line per history row; an empty history renders no lines.
pub fn render_history_rows(rows: &[HistoryRow]) -> Vec<String> {
    rows.iter().map(|row| layout_row(&row_cells(row))).collect()
}

fn layout_row(cells: &[String; 6]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        line.push_str(&format!("{:<width$}", cell, width = width));
    }
    line.trim_end().to_string()
}
