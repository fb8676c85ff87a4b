//! Metrics definitions for the access service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `access_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP verbs
//! - `endpoint`: normalized paths (identifiers collapsed to placeholders)
//! - `status` / `status_code`: HTTP status
//! - `outcome`: the six redemption outcomes
//! - `reason`: creation failure reasons, bounded by code

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::services::token_generator::is_valid_meeting_code;

/// Initialize the Prometheus metrics recorder and return the handle for
/// serving metrics via HTTP. Must be called before any metrics are
/// recorded.
///
/// # Errors
///
/// Returns an error if the recorder fails to install (e.g. already
/// installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("access_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("access_session".to_string()),
            &[0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set session operation buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `access_http_requests_total`, `access_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("access_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("access_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// Session Lifecycle Metrics
// ============================================================================

/// Record a session creation attempt.
///
/// Metric: `access_session_creations_total`,
/// `access_session_creation_duration_seconds`
/// Labels: `status` (success/error), `reason` (bounded, error only)
pub fn record_session_creation(status: &str, reason: Option<&str>, duration: Duration) {
    counter!("access_session_creations_total",
        "status" => status.to_string(),
        "reason" => reason.unwrap_or("none").to_string()
    )
    .increment(1);

    histogram!("access_session_creation_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a redemption attempt by its effective outcome.
///
/// Metric: `access_redemptions_total`,
/// `access_session_redemption_duration_seconds`
/// Labels: `outcome` (six values)
pub fn record_redemption(outcome: &str, duration: Duration) {
    counter!("access_redemptions_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!("access_session_redemption_duration_seconds",
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Categorize HTTP status code into success/error/timeout.
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion.
///
/// Access tokens and meeting codes in paths are replaced with a
/// placeholder; a token-valued label would be both unbounded and a
/// credential leak into the metrics pipeline.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/ready" | "/metrics" | "/api/v1/sessions" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Normalize paths with dynamic segments.
fn normalize_dynamic_endpoint(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .map(|segment| {
            if is_identifier_segment(segment) {
                ":identifier"
            } else {
                segment
            }
        })
        .collect();

    normalized.join("/")
}

/// Heuristic for identifier-shaped path segments: meeting codes, hex
/// tokens, or anything long and opaque.
fn is_identifier_segment(segment: &str) -> bool {
    if is_valid_meeting_code(segment) {
        return true;
    }
    segment.len() >= 32 && segment.chars().all(|c| c.is_ascii_alphanumeric())
}
