//! Prometheus metrics endpoint handler.
//!
//! # Security
//!
//! This endpoint is unauthenticated to allow Prometheus to scrape
//! metrics. No tokens, codes or PII are exposed: endpoint labels are
//! normalized before recording and only bounded-cardinality labels exist.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus-formatted metrics for scraping.
/// This is an operational endpoint, not versioned under /api/v1.
#[tracing::instrument(skip_all, name = "access.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
