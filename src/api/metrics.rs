//! HTTP Metrics
//!
//! Request counters, latency histogram and in-flight gauge, registered on
//! the same registry as the cache counters.

use std::fmt;
use std::time::{Duration, Instant};

use prometheus::{Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry};

#[derive(Clone)]
pub struct HttpMetrics {
    requests: IntCounterVec,
    duration: Histogram,
    in_flight: IntGauge,
}

impl fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

impl HttpMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of requests processed"),
            &["status"],
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "Duration of HTTP requests in seconds",
        ))?;
        let in_flight = IntGauge::new(
            "http_current_requests",
            "Current number of requests in process",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            requests,
            duration,
            in_flight,
        })
    }

    /// Marks a request as in flight until the returned guard is dropped.
    pub fn request_started(&self) -> InFlightRequest {
        self.in_flight.inc();
        InFlightRequest {
            metrics: self.clone(),
            started: Instant::now(),
        }
    }

    fn record(&self, status: u16, elapsed: Duration) {
        self.requests
            .with_label_values(&[status.to_string().as_str()])
            .inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub fn requests_with_status(&self, status: u16) -> u64 {
        self.requests
            .with_label_values(&[status.to_string().as_str()])
            .get()
    }

    pub fn in_flight(&self) -> i64 {
        self.in_flight.get()
    }
}

/// A request counted in `http_current_requests`.
///
/// The gauge is decremented on drop, including when the request future is
/// dropped before a response exists.
#[must_use = "dropping the guard ends the request immediately"]
pub struct InFlightRequest {
    metrics: HttpMetrics,
    started: Instant,
}

impl InFlightRequest {
    /// Records the response status and latency.
    pub fn finish(self, status: u16) {
        self.metrics.record(status, self.started.elapsed());
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        self.metrics.in_flight.dec();
    }
}
