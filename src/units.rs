/// Unit conversions and derived meteorological quantities.
///
/// All helpers are total over missing inputs: `None` in, `None` out, so
/// callers can pipe optional sensor fields straight through.

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Celsius to Fahrenheit.
pub fn c_to_f(celsius: Option<f64>) -> Option<f64> {
    celsius.map(|c| c * 9.0 / 5.0 + 32.0)
}

/// Pascals to inches of mercury.
pub fn pa_to_inhg(pascals: Option<f64>) -> Option<f64> {
    pascals.map(|pa| pa / 3386.389)
}

/// Clamp a value into `[lo, hi]`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Derived quantities
// ---------------------------------------------------------------------------

/// Relative humidity (%) from temperature and dewpoint (°C), via the
/// Magnus formula. The result is clamped to [0, 100] — rounding in the
/// saturation terms can push a fog-point reading fractionally past 100%.
pub fn rh_from_t_and_td(temp_c: Option<f64>, dewpoint_c: Option<f64>) -> Option<f64> {
    let (t, td) = (temp_c?, dewpoint_c?);
    const A: f64 = 17.625;
    const B: f64 = 243.04;
    let es = (A * t / (B + t)).exp();
    let e = (A * td / (B + td)).exp();
    Some(clamp(100.0 * (e / es), 0.0, 100.0))
}

/// Wet-bulb temperature (°C) from temperature (°C) and relative humidity
/// (%), using the Stull (2011) approximation.
///
/// The fit is valid for roughly -20..50 °C and 5..99% RH; humidity is
/// clamped into that range before evaluation.
pub fn wet_bulb_stull_c(temp_c: Option<f64>, rh_percent: Option<f64>) -> Option<f64> {
    let t = temp_c?;
    let rh = clamp(rh_percent?, 5.0, 99.0);
    let tw = t * (0.151977 * (rh + 8.313659).sqrt()).atan()
        + (t + rh).atan()
        - (rh - 1.676331).atan()
        + 0.00391838 * rh.powf(1.5) * (0.023101 * rh).atan()
        - 4.686035;
    Some(tw)
}
