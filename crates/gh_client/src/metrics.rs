use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gh_client_requests_total",
        "GitHub REST requests by endpoint kind and outcome",
        &["endpoint", "outcome"]
    )
    .expect("gh client requests metric")
});

pub static REQUEST_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "gh_client_request_latency_seconds",
        "GitHub REST request latency by endpoint kind",
        &["endpoint"]
    )
    .expect("gh client latency metric")
});
