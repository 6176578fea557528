use std::sync::Arc;

/// Terminal outcome of a provisioning phase or a connection watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Operation completed.
    Success,
    /// Operation failed terminally.
    Failure,
    /// Operation was interrupted.
    Canceled,
}

impl Outcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Canceled => "canceled",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into the cloud and shared with the
/// connection supervisor.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record the start of a provisioning phase.
    ///
    /// # Arguments
    /// - `path`: provisioning path label (`ondemand` or `spot`)
    fn record_provision_started(&self, path: &str);

    /// Record completion of a provisioning phase with outcome and duration.
    ///
    /// # Arguments
    /// - `path`: provisioning path label
    /// - `outcome`: how the phase terminated
    /// - `duration_ms`: wall-clock time from launch trigger to registration
    fn record_provision_completed(&self, path: &str, outcome: Outcome, duration_ms: u64);

    /// Record the terminal outcome of one node's connection watch.
    ///
    /// # Arguments
    /// - `outcome`: terminal watch status
    /// - `attempts`: connection attempts made, including the first
    fn record_connect_outcome(&self, outcome: Outcome, attempts: u64);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
