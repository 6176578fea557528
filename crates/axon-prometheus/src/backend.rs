use std::sync::Arc;

use prometheus::{CounterVec, HistogramVec, Opts, Registry, proto::MetricFamily};

use axon_core::{MetricsBackend, Outcome};

/// Prometheus metrics backend for axon.
///
/// Implements [`MetricsBackend`] and exposes prometheus metrics that can be
/// scraped via an HTTP endpoint.
///
/// ## Metrics
/// - `axon_provisions_started_total{path}` - Counter of provisioning phases
/// - `axon_provisions_completed_total{path, outcome}` - Counter of completed phases
/// - `axon_provision_duration_seconds{path}` - Histogram of launch-to-register time
/// - `axon_connect_outcomes_total{outcome}` - Counter of terminal connection watches
///
/// ## Label cardinality
/// All labels are bounded (low cardinality):
/// - `path`: "ondemand", "spot"
/// - `outcome`: "success", "failure", "canceled"
#[derive(Clone)]
pub struct PrometheusMetrics {
    provisions_started: CounterVec,
    provisions_completed: CounterVec,
    provision_duration: HistogramVec,
    connect_outcomes: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let provisions_started = CounterVec::new(
            Opts::new(
                "axon_provisions_started_total",
                "Total number of provisioning phases started",
            )
            .namespace("axon"),
            &["path"],
        )?;
        registry.register(Box::new(provisions_started.clone()))?;

        let provisions_completed = CounterVec::new(
            Opts::new(
                "axon_provisions_completed_total",
                "Total number of provisioning phases completed",
            )
            .namespace("axon"),
            &["path", "outcome"],
        )?;
        registry.register(Box::new(provisions_completed.clone()))?;

        let provision_duration = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "axon_provision_duration_seconds",
                "Provisioning duration from launch trigger to registration in seconds",
            )
            .namespace("axon")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
            &["path"],
        )?;
        registry.register(Box::new(provision_duration.clone()))?;

        let connect_outcomes = CounterVec::new(
            Opts::new(
                "axon_connect_outcomes_total",
                "Terminal connection watch outcomes",
            )
            .namespace("axon"),
            &["outcome"],
        )?;
        registry.register(Box::new(connect_outcomes.clone()))?;

        Ok(Self {
            provisions_started,
            provisions_completed,
            provision_duration,
            connect_outcomes,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    ///
    /// Use this to implement a `/metrics` HTTP endpoint.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Get reference to underlying prometheus registry.
    ///
    /// Useful for registering custom metrics alongside axon metrics.
    #[allow(dead_code)]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_provision_started(&self, path: &str) {
        self.provisions_started.with_label_values(&[path]).inc();
    }

    fn record_provision_completed(&self, path: &str, outcome: Outcome, duration_ms: u64) {
        self.provisions_completed
            .with_label_values(&[path, outcome.as_label()])
            .inc();

        let duration_seconds = duration_ms as f64 / 1000.0;
        self.provision_duration
            .with_label_values(&[path])
            .observe(duration_seconds);
    }

    fn record_connect_outcome(&self, outcome: Outcome, _attempts: u64) {
        self.connect_outcomes
            .with_label_values(&[outcome.as_label()])
            .inc();
    }
}
