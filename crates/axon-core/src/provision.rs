use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::log::BuildLog;
use crate::node::Node;

/// Provisioning backend for one node template.
///
/// A provisioner creates `count` node objects and starts whatever remote
/// machinery backs them (on-demand launch, market request, ...). It does
/// not register the nodes into the scheduler and does not wait for them to
/// connect — the cloud does the former, the connection supervisor observes
/// the latter.
#[async_trait]
pub trait NodeProvisioner: Send + Sync {
    /// Create exactly `count` nodes, logging progress to the build stream.
    async fn provision_multiple(
        &self,
        log: &BuildLog,
        count: usize,
    ) -> Result<Vec<Arc<dyn Node>>, CoreError>;
}
