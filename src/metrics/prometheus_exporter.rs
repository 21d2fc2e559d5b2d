// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Prometheus collectors for the service and its HTTP surface.

use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry, register_int_counter_with_registry, CounterVec, Encoder,
    Gauge, HistogramTimer, HistogramVec, IntCounter, Registry, TextEncoder,
};
use std::sync::Arc;

/// Collectors registered on a private registry, so several instances
/// (one per test, say) never clash.
#[derive(Clone)]
pub struct PrometheusCollector {
    registry: Arc<Registry>,
    health_checks: IntCounter,
    ready_checks: IntCounter,
    http_requests_total: CounterVec,
    http_request_duration_seconds: HistogramVec,
    model_inference_inprogress: Gauge,
}

impl PrometheusCollector {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let health_checks = register_int_counter_with_registry!(
            "petra_health_checks_total",
            "Number of health checks",
            registry.clone()
        )?;

        let ready_checks = register_int_counter_with_registry!(
            "petra_ready_checks_total",
            "Number of readiness checks",
            registry.clone()
        )?;

        let http_requests_total = register_counter_vec_with_registry!(
            "http_requests_total",
            "HTTP requests",
            &["method", "path", "status"],
            registry.clone()
        )?;

        let http_request_duration_seconds = register_histogram_vec_with_registry!(
            "http_request_duration_seconds",
            "HTTP request duration seconds",
            &["method", "path"],
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )?;

        let model_inference_inprogress = register_gauge_with_registry!(
            "model_inference_inprogress",
            "In-progress model inference requests",
            registry.clone()
        )?;

        Ok(Self {
            registry,
            health_checks,
            ready_checks,
            http_requests_total,
            http_request_duration_seconds,
            model_inference_inprogress,
        })
    }

    pub fn record_health_check(&self) {
        self.health_checks.inc();
    }

    pub fn record_ready_check(&self) {
        self.ready_checks.inc();
    }

    pub fn record_http_request(&self, method: &str, path: &str, status_code: u16) {
        self.http_requests_total
            .with_label_values(&[method, path, &status_code.to_string()])
            .inc();
    }

    pub fn start_http_request_timer(&self, method: &str, path: &str) -> HistogramTimer {
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .start_timer()
    }

    /// Tracks one embedding computation for as long as the guard lives.
    pub fn inference_guard(&self) -> InferenceGuard {
        self.model_inference_inprogress.inc();
        InferenceGuard {
            gauge: self.model_inference_inprogress.clone(),
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Renders every collector in the text exposition format.
    pub fn encode(&self) -> Result<(String, String), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        let body = String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not UTF-8: {}", e)))?;
        Ok((encoder.format_type().to_string(), body))
    }
}

pub struct InferenceGuard {
    gauge: Gauge,
}

impl Drop for InferenceGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let collector = PrometheusCollector::new().unwrap();
        collector.record_health_check();
        collector.record_health_check();
        collector.record_ready_check();

        let (content_type, body) = collector.encode().unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("petra_health_checks_total 2"));
        assert!(body.contains("petra_ready_checks_total 1"));
    }

    #[test]
    fn test_http_metrics_are_labelled() {
        let collector = PrometheusCollector::new().unwrap();
        collector.record_http_request("GET", "/health", 200);
        collector
            .start_http_request_timer("GET", "/health")
            .observe_duration();

        let (_, body) = collector.encode().unwrap();
        assert!(body.contains(r#"http_requests_total{method="GET",path="/health",status="200"} 1"#));
        assert!(body.contains("http_request_duration_seconds_bucket"));
    }

    #[test]
    fn test_independent_registries() {
        let a = PrometheusCollector::new().unwrap();
        let b = PrometheusCollector::new().unwrap();
        a.record_health_check();

        let (_, body) = b.encode().unwrap();
        assert!(body.contains("petra_health_checks_total 0"));
    }

    #[test]
    fn test_inference_guard_restores_gauge() {
        let collector = PrometheusCollector::new().unwrap();
        {
            let _guard = collector.inference_guard();
            let (_, body) = collector.encode().unwrap();
            assert!(body.contains("model_inference_inprogress 1"));
        }
        let (_, body) = collector.encode().unwrap();
        assert!(body.contains("model_inference_inprogress 0"));
    }
}
