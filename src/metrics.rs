//! Prometheus metrics collection for route-arbiter.
//!
//! Tracks handler lifecycle transitions performed by the registry:
//!
//! - `route_activations_total` / `route_deactivations_total` - handler setup/teardown calls
//! - `route_activation_failures_total{error}` - setup calls that failed
//! - `route_deactivation_failures_total{error}` - teardown calls that failed
//! - `route_shadowed_total` - bindings placed behind a higher-priority binding
//! - `route_registrations` - bindings currently registered (gauge)
//! - `route_active_paths` - `(context, path)` pairs with an active binding (gauge)
//! - `route_activation_duration_seconds` - setup latency histogram
//!
//! Recording before [`init`] is a no-op.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

static INIT: Once = Once::new();

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Successful handler setup calls.
pub static ACTIVATIONS: OnceLock<IntCounter> = OnceLock::new();

/// Handler teardown calls.
pub static DEACTIVATIONS: OnceLock<IntCounter> = OnceLock::new();

/// Failed handler setup calls by error kind.
pub static ACTIVATION_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed handler teardown calls by error kind.
pub static DEACTIVATION_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Shadowing transitions (new shadowed binding or demoted head).
pub static SHADOWED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Bindings currently registered.
pub static REGISTRATIONS: OnceLock<IntGauge> = OnceLock::new();

/// Paths with an active binding.
pub static ACTIVE_PATHS: OnceLock<IntGauge> = OnceLock::new();

/// Handler setup latency.
pub static ACTIVATION_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers metrics.
pub fn init() {
    INIT.call_once(|| {
        let r = registry();

        // Helper macro to register metric
        macro_rules! register {
            ($metric:ident, $init:expr) => {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            };
        }

        register!(ACTIVATIONS, IntCounter::new("route_activations_total", "Handler setup calls that succeeded"));
        register!(DEACTIVATIONS, IntCounter::new("route_deactivations_total", "Handler teardown calls"));
        register!(ACTIVATION_FAILURES, IntCounterVec::new(Opts::new("route_activation_failures_total", "Handler setup calls that failed"), &["error"]));
        register!(DEACTIVATION_FAILURES, IntCounterVec::new(Opts::new("route_deactivation_failures_total", "Handler teardown calls that failed"), &["error"]));
        register!(SHADOWED, IntCounter::new("route_shadowed_total", "Bindings shadowed by a higher-priority binding"));
        register!(REGISTRATIONS, IntGauge::new("route_registrations", "Bindings currently registered"));
        register!(ACTIVE_PATHS, IntGauge::new("route_active_paths", "Paths with an active binding"));
        register!(ACTIVATION_LATENCY, Histogram::with_opts(
            HistogramOpts::new("route_activation_duration_seconds", "Handler setup latency")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])));
    });
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for lifecycle metric updates
// ============================================================================

#[inline]
pub fn record_activation() {
    if let Some(c) = ACTIVATIONS.get() {
        c.inc();
    }
}

#[inline]
pub fn record_activation_failure(error: &str) {
    if let Some(c) = ACTIVATION_FAILURES.get() {
        c.with_label_values(&[error]).inc();
    }
}

#[inline]
pub fn record_activation_latency(duration_secs: f64) {
    if let Some(h) = ACTIVATION_LATENCY.get() {
        h.observe(duration_secs);
    }
}

#[inline]
pub fn record_deactivation() {
    if let Some(c) = DEACTIVATIONS.get() {
        c.inc();
    }
}

#[inline]
pub fn record_deactivation_failure(error: &str) {
    if let Some(c) = DEACTIVATION_FAILURES.get() {
        c.with_label_values(&[error]).inc();
    }
}

#[inline]
pub fn record_shadowed() {
    if let Some(c) = SHADOWED.get() {
        c.inc();
    }
}

/// Adjust the registration gauge by `delta`.
#[inline]
pub fn add_registrations(delta: i64) {
    if let Some(g) = REGISTRATIONS.get() {
        g.add(delta);
    }
}

/// Adjust the active path gauge by `delta`.
#[inline]
pub fn add_active_paths(delta: i64) {
    if let Some(g) = ACTIVE_PATHS.get() {
        g.add(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_activation();
        record_activation_failure("setup");
        record_shadowed();

        let output = gather_text();
        assert!(output.contains("route_activations_total"));
        assert!(output.contains("route_activation_failures_total"));
        assert!(output.contains("route_shadowed_total"));
    }
}
