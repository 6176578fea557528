//! Metrics collection abstraction for the provisioning path.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are
//! injected into the cloud; everything recorded here is advisory and never
//! part of the allocation contract.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, Outcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Provisioning-path label for on-demand launches.
pub const PROVISION_PATH_ONDEMAND: &str = "ondemand";

/// Provisioning-path label for spot-market launches.
pub const PROVISION_PATH_SPOT: &str = "spot";

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
