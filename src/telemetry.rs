//! Telemetry utilities for activation timing and registry spans.

use std::time::{Duration, Instant};

/// Guard for timing a handler activation and recording metrics.
///
/// Records activation latency when dropped, and warns when the call took
/// longer than the configured threshold.
pub struct ActivationTimer<'a> {
    path: &'a str,
    slow_after: Duration,
    start: Instant,
}

impl<'a> ActivationTimer<'a> {
    /// Start timing an activation on `path`.
    pub fn new(path: &'a str, slow_after: Duration) -> Self {
        Self {
            path,
            slow_after,
            start: Instant::now(),
        }
    }
}

impl Drop for ActivationTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        crate::metrics::record_activation_latency(elapsed.as_secs_f64());
        if !self.slow_after.is_zero() && elapsed > self.slow_after {
            tracing::warn!(
                path = %self.path,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow handler activation"
            );
        }
    }
}

/// Standardized span constructors for registry observability.
pub mod spans {
    use crate::registry::{ContextId, RegistrationId};
    use tracing::{Span, debug_span};

    /// Create a span for an add operation.
    pub fn add(id: RegistrationId, context: ContextId, ranking: i32) -> Span {
        debug_span!("registry.add", registration = %id, context = %context, ranking)
    }

    /// Create a span for a remove operation.
    pub fn remove(id: RegistrationId, destroy: bool) -> Span {
        debug_span!("registry.remove", registration = %id, destroy)
    }

    /// Create a span for an explicit activation retry.
    pub fn retry(id: RegistrationId) -> Span {
        debug_span!("registry.retry", registration = %id)
    }
}
