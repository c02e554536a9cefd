// Metrics module for observability
// Describes every metric family the process emits and installs the
// Prometheus recorder rendered by `/metrics`

use std::time::Instant;

use anyhow::Context;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder as the global metrics sink
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Initialize all metric descriptions
/// Should be called once at application startup, after the recorder is installed
pub fn init_metrics() {
    // HTTP request metrics
    describe_counter!(
        "apiary_http_requests_total",
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        "apiary_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    // gRPC metrics
    describe_counter!(
        "apiary_grpc_requests_total",
        "Total number of gRPC calls handled"
    );

    // Bus metrics
    describe_counter!(
        "apiary_bus_published_total",
        "Total number of messages published to the bus"
    );
    describe_counter!(
        "apiary_bus_publish_errors_total",
        "Total number of failed bus publications"
    );
    describe_counter!(
        "apiary_bus_consumed_total",
        "Total number of bus deliveries processed"
    );

    // Cache metrics
    describe_counter!(
        "apiary_cache_refresh_total",
        "Total number of successful cache refresh ticks"
    );
    describe_counter!(
        "apiary_cache_errors_total",
        "Total number of cache worker errors"
    );

    tracing::info!("Metrics initialized");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!("apiary_http_requests_total", "method" => method.to_string(), "path" => path.to_string(), "status" => status.to_string()).increment(1);
    histogram!("apiary_http_request_duration_seconds", "method" => method.to_string(), "path" => path.to_string()).record(duration_secs);
}

/// Record a gRPC call and its status code
pub fn record_grpc_request(method: &'static str, code: tonic::Code) {
    counter!("apiary_grpc_requests_total", "method" => method, "code" => format!("{:?}", code))
        .increment(1);
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let elapsed = timer.elapsed_secs();
        assert!(elapsed >= 0.01);
        assert!(elapsed < 1.0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/api/hive/{id}", 200, 0.01);
        record_grpc_request("GetAvgTemperature", tonic::Code::Ok);
    }
}
