//! Request outcome and latency tracking for the inference service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept for percentile estimates
const LATENCY_WINDOW: usize = 10_000;

/// Outcome of one `/predict` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

/// Metrics collector shared by all request handlers
pub struct ServiceMetrics {
    pub predictions_ok: AtomicU64,
    pub client_errors: AtomicU64,
    pub server_errors: AtomicU64,
    /// Handling times of successful predictions (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Successful predictions per workout type
    predicted_labels: RwLock<HashMap<String, u64>>,
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions_ok: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            predicted_labels: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, outcome: Outcome) {
        match outcome {
            Outcome::ClientError => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::ServerError => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Success => {}
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, label: &str, elapsed: Duration) {
        self.predictions_ok.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(elapsed.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }

        if let Ok(mut labels) = self.predicted_labels.write() {
            *labels.entry(label.to_string()).or_insert(0) += 1;
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.predictions_ok.load(Ordering::Relaxed)
            + self.client_errors.load(Ordering::Relaxed)
            + self.server_errors.load(Ordering::Relaxed)
    }

    /// Latency statistics over the retained window
    pub fn get_latency_stats(&self) -> LatencyStats {
        let Ok(times) = self.latencies.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = times.clone();
        drop(times);
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    pub fn get_predicted_labels(&self) -> HashMap<String, u64> {
        self.predicted_labels
            .read()
            .map(|labels| labels.clone())
            .unwrap_or_default()
    }

    /// Requests per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_requests() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let latency = self.get_latency_stats();
        info!(
            requests = self.total_requests(),
            succeeded = self.predictions_ok.load(Ordering::Relaxed),
            client_errors = self.client_errors.load(Ordering::Relaxed),
            server_errors = self.server_errors.load(Ordering::Relaxed),
            throughput = format!("{:.2} req/s", self.get_throughput()),
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            max_us = latency.max_us,
            "Prediction metrics summary"
        );

        let mut labels: Vec<_> = self.get_predicted_labels().into_iter().collect();
        labels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (label, count) in labels {
            info!(label = %label, count = count, "Predicted workout type");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic summary logger
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
