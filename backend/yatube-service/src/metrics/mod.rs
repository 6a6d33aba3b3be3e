//! Prometheus metrics for yatube-service.
//!
//! HTTP collectors are fed by `MetricsMiddleware`; write counters are bumped
//! by the services after a successful store write.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_http_requests_total",
        "Total HTTP requests",
        &["method", "route", "status"]
    )
    .unwrap();
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "yatube_http_request_duration_seconds",
        "HTTP request latency",
        &["method", "route"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();
    pub static ref WRITE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_write_operations_total",
        "Successful writes by resource and action",
        &["resource", "action"]
    )
    .unwrap();
    pub static ref PERMISSION_DENIALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_permission_denials_total",
        "Writes rejected because the requester is not the author",
        &["resource"]
    )
    .unwrap();
}

pub fn record_write(resource: &str, action: &str) {
    WRITE_OPERATIONS_TOTAL
        .with_label_values(&[resource, action])
        .inc();
}

pub fn record_permission_denied(resource: &str) {
    PERMISSION_DENIALS_TOTAL
        .with_label_values(&[resource])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
