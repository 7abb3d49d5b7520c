//! Data Source Verification Module
//!
//! Probes the configured source against the live APIs to determine which
//! endpoints are accessible and returning data. Run this before pointing a
//! long-lived console at a new station or deployment.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::config::{Config, SourceKind};
use crate::ingest::{nws, station_api::StationApiClient};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpointVerification {
    pub endpoint: String,
    pub status: VerificationStatus,
    pub sample_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NwsVerification {
    pub station: String,
    pub status: VerificationStatus,
    pub latest_available: bool,
    pub fields_available: Vec<String>,
    pub window_sample_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub api_results: Vec<ApiEndpointVerification>,
    pub nws_results: Vec<NwsVerification>,
    pub summary: VerificationSummary,
}

// ============================================================================
// Station API Verification
// ============================================================================

/// Probe one station API endpoint and count the samples it yields.
fn verify_api_endpoint(
    client: &StationApiClient,
    endpoint: &str,
) -> ApiEndpointVerification {
    let mut result = ApiEndpointVerification {
        endpoint: endpoint.to_string(),
        status: VerificationStatus::Failed,
        sample_count: 0,
        error_message: None,
    };

    let outcome = match endpoint {
        "/api/current" => client.fetch_current().map(|current| {
            // Count the populated measurement fields.
            [
                current.temperature_f,
                current.dry_bulb_f,
                current.wet_bulb_f,
                current.humidity_percent,
                current.pressure_inhg,
            ]
            .iter()
            .filter(|v| v.is_some())
            .count()
        }),
        "/api/history" => client.fetch_history().map(|rows| rows.len()),
        "/api/history.csv" => client
            .fetch_history_csv()
            .map(|csv| csv.lines().count().saturating_sub(1)),
        other => {
            result.error_message = Some(format!("unknown endpoint {}", other));
            return result;
        }
    };

    match outcome {
        Ok(count) => {
            result.sample_count = count;
            result.status = if count > 0 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

pub fn verify_station_api(config: &Config) -> Vec<ApiEndpointVerification> {
    match StationApiClient::new(&config.api_base_url) {
        Ok(client) => ["/api/current", "/api/history", "/api/history.csv"]
            .into_iter()
            .map(|endpoint| verify_api_endpoint(&client, endpoint))
            .collect(),
        Err(e) => vec![ApiEndpointVerification {
            endpoint: config.api_base_url.clone(),
            status: VerificationStatus::Failed,
            sample_count: 0,
            error_message: Some(e.to_string()),
        }],
    }
}

// ============================================================================
// NWS Verification
// ============================================================================

pub fn verify_nws_station(config: &Config) -> NwsVerification {
    let mut result = NwsVerification {
        station: config.station.clone(),
        status: VerificationStatus::Failed,
        latest_available: false,
        fields_available: Vec::new(),
        window_sample_count: 0,
        error_message: None,
    };

    let client = match nws::build_client() {
        Ok(client) => client,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };

    // Test 1: latest observation, and which measurements it populates.
    match nws::fetch_latest(&client, config) {
        Ok(obs) => {
            result.latest_available = true;
            if obs.temperature_c.is_some() {
                result.fields_available.push("temperature".to_string());
            }
            if obs.dewpoint_c.is_some() {
                result.fields_available.push("dewpoint".to_string());
            }
            if obs.humidity_percent.is_some() {
                result.fields_available.push("humidity".to_string());
            }
            if obs.pressure_pa.is_some() {
                result.fields_available.push("pressure".to_string());
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    // Test 2: a short observation window, to confirm backfill will work.
    let end = Utc::now();
    let begin = end - Duration::hours(4);
    match nws::fetch_window(&client, config, begin, end) {
        Ok(observations) => {
            result.window_sample_count = observations.len();
        }
        Err(e) => {
            if result.error_message.is_none() {
                result.error_message = Some(e.to_string());
            }
        }
    }

    result.status = if result.latest_available && result.window_sample_count > 0 {
        VerificationStatus::Success
    } else if result.latest_available || result.window_sample_count > 0 {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Failed
    };

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(config: &Config) -> Result<VerificationReport, Box<dyn Error>> {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        api_results: Vec::new(),
        nws_results: Vec::new(),
        summary: VerificationSummary {
            total: 0,
            working: 0,
            failed: 0,
        },
    };

    match config.source {
        SourceKind::StationApi => {
            println!("Verifying station API at {} ...", config.api_base_url);
            for result in verify_station_api(config) {
                match result.status {
                    VerificationStatus::Success => {
                        println!("  {} ... OK ({} samples)", result.endpoint, result.sample_count);
                        report.summary.working += 1;
                    }
                    VerificationStatus::PartialSuccess => {
                        println!("  {} ... responsive but empty", result.endpoint);
                        report.summary.working += 1;
                    }
                    VerificationStatus::Failed => {
                        println!(
                            "  {} ... FAILED: {}",
                            result.endpoint,
                            result.error_message.as_deref().unwrap_or("unknown")
                        );
                        report.summary.failed += 1;
                    }
                }
                report.summary.total += 1;
                report.api_results.push(result);
            }
        }
        SourceKind::Nws => {
            println!("Verifying NWS station {} ...", config.station);
            let result = verify_nws_station(config);
            match result.status {
                VerificationStatus::Success => {
                    println!(
                        "  {} ... OK ({} observations in 4h window, fields: {})",
                        result.station,
                        result.window_sample_count,
                        result.fields_available.join(", ")
                    );
                    report.summary.working += 1;
                }
                VerificationStatus::PartialSuccess => {
                    println!(
                        "  {} ... partial (latest: {}, window: {} observations)",
                        result.station, result.latest_available, result.window_sample_count
                    );
                    report.summary.working += 1;
                }
                VerificationStatus::Failed => {
                    println!(
                        "  {} ... FAILED: {}",
                        result.station,
                        result.error_message.as_deref().unwrap_or("unknown")
                    );
                    report.summary.failed += 1;
                }
            }
            report.summary.total += 1;
            report.nws_results.push(result);
        }
    }

    Ok(report)
}

pub fn print_summary(report: &VerificationReport) {
    println!();
    println!("VERIFICATION SUMMARY");
    println!(
        "  Probes: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "  Overall success rate: {:.1}% ({}/{})",
        success_rate, report.summary.working, report.summary.total
    );
}
