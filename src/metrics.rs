use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

fn init_metric_descriptions() {
    describe_counter!("nordflytt_requests_total", "Total number of API requests");
    describe_histogram!(
        "nordflytt_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_counter!("nordflytt_quotes_total", "Price quotes produced, by discount tier");
    describe_histogram!("nordflytt_quote_value_kr", "Quoted total price in kronor");
    describe_counter!(
        "nordflytt_validation_errors_total",
        "Rejected requests, by offending field"
    );
    describe_counter!("nordflytt_tickets_total", "Support tickets created");
    describe_counter!(
        "nordflytt_store_errors_total",
        "Failed store operations, by operation"
    );
    describe_gauge!("nordflytt_api_info", "Service version information");

    gauge!("nordflytt_api_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished request
pub fn record_request(endpoint: &str, status: u16, duration: Duration) {
    counter!(
        "nordflytt_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "nordflytt_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a produced quote
///
/// `discount_tier` is the percentage as a label ("20", "15", ...) or "none".
pub fn record_quote(discount_tier: &str, total_price: i64) {
    counter!(
        "nordflytt_quotes_total",
        "discount_tier" => discount_tier.to_string(),
    )
    .increment(1);

    histogram!("nordflytt_quote_value_kr").record(total_price as f64);
}

pub fn record_validation_error(field: &str) {
    counter!(
        "nordflytt_validation_errors_total",
        "field" => field.to_string(),
    )
    .increment(1);
}

pub fn record_ticket(issue_type: &str, priority: &str) {
    counter!(
        "nordflytt_tickets_total",
        "issue_type" => issue_type.to_string(),
        "priority" => priority.to_string(),
    )
    .increment(1);
}

pub fn record_store_error(operation: &str) {
    counter!(
        "nordflytt_store_errors_total",
        "operation" => operation.to_string(),
    )
    .increment(1);
}

/// Label for a discount rate: 0.2 -> "20", 0.0 -> "none"
pub fn discount_tier_label(rate: f64) -> String {
    if rate <= 0.0 {
        "none".to_string()
    } else {
        format!("{}", (rate * 100.0).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_tier_label() {
        assert_eq!(discount_tier_label(0.0), "none");
        assert_eq!(discount_tier_label(0.05), "5");
        assert_eq!(discount_tier_label(0.15), "15");
        assert_eq!(discount_tier_label(0.2), "20");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // No global recorder in unit tests; the macros must not panic
        record_request("calculate-price", 200, Duration::from_millis(12));
        record_quote("none", 3318);
        record_validation_error("volume_m3");
        record_ticket("general", "low");
        record_store_error("find_customer");
    }
}
