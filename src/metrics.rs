// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
pub enum Unit {}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! histogram {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_gauge {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_histogram {
    ($name:expr, $desc:expr) => {};
}

/// Initializes the descriptions for all the metrics of the aggregator.
/// This should be called once at startup.
pub fn describe_metrics() {
    describe_histogram!(
        "stat_source_fetch_latency_ms",
        "Latency of a single stat source call in milliseconds, by source."
    );
    describe_counter!(
        "stat_source_failures_total",
        "Total failed stat source calls, by source and kind."
    );
    describe_counter!(
        "pair_stats_skipped_tokens_total",
        "Tokens whose TVL and vault fee were not derived, by reason."
    );
    describe_histogram!(
        "pair_stats_aggregation_ms",
        "Duration of a full pair stats aggregation in milliseconds."
    );
    describe_gauge!("pair_stats_count", "Pair stats produced by the last aggregation.");
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub fn record_source_latency(source: &str, duration: std::time::Duration) {
    histogram!("stat_source_fetch_latency_ms", duration.as_millis() as f64,
               "source" => source.to_string());
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub fn increment_source_failure(source: &str, kind: &str) {
    counter!("stat_source_failures_total", 1,
             "source" => source.to_string(),
             "kind" => kind.to_string());
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub fn increment_skipped_token(reason: &str) {
    counter!("pair_stats_skipped_tokens_total", 1, "reason" => reason.to_string());
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub fn record_aggregation(duration: std::time::Duration, pair_count: usize) {
    histogram!("pair_stats_aggregation_ms", duration.as_millis() as f64);
    gauge!("pair_stats_count", pair_count as f64);
}
