use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "viewer_searches_total",
        "Profile searches by outcome",
        &["outcome"]
    )
    .expect("viewer searches metric")
});

pub static SEARCH_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "viewer_search_duration_seconds",
        "Wall time of a profile pipeline run"
    )
    .expect("viewer search duration metric")
});

pub static SEARCH_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "viewer_search_in_flight",
        "1 while a profile pipeline is running"
    )
    .expect("viewer in-flight metric")
});
