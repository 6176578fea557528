pub mod allocator;
pub mod cloud;
pub mod connect;
pub mod error;
pub mod log;
pub mod metrics;
pub mod node;
pub mod provision;
pub mod serial;
pub mod session;

pub use cloud::{Cloud, TemplateSet, cloud_for};
pub use connect::{ConnectError, ConnectFuture, ConnectReport, ConnectSupervisor};
pub use error::CoreError;
pub use log::BuildLog;
pub use metrics::{MetricsBackend, MetricsHandle, Outcome, noop_metrics};
pub use node::{Computer, ExecutorState, Node, NodeRegistry};
pub use provision::NodeProvisioner;
pub use session::BuildSession;

pub mod prelude {
    pub use crate::allocator::{AllocationPlan, LabelAllocator};
    pub use crate::cloud::{Cloud, TemplateSet};
    pub use crate::connect::{ConnectError, ConnectFuture, ConnectReport, ConnectSupervisor};
    pub use crate::error::CoreError;
    pub use crate::log::BuildLog;
    pub use crate::node::{Computer, ExecutorState, Node, NodeRegistry};
    pub use crate::provision::NodeProvisioner;
    pub use crate::serial::SerialExecutor;
    pub use crate::session::BuildSession;
}

#[cfg(test)]
pub(crate) mod testutil;
