use std::{future::Future, pin::Pin};

use thiserror::Error;

use crate::metrics::Outcome;

/// Asynchronous handle for "node is attempting to join the pool".
///
/// Resolves to `Ok(())` once the node is online, or to the failure reason.
/// Created by [`crate::node::Computer::connect`]; reused nodes never get
/// one (they are already connected).
pub type ConnectFuture = Pin<Box<dyn Future<Output = Result<(), ConnectError>> + Send>>;

/// Reason a connection attempt failed.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ConnectError {
    reason: String,
}

impl ConnectError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Terminal per-node report emitted by a watch task.
#[derive(Debug, Clone)]
pub struct ConnectReport {
    /// Node name at watch start.
    pub node_name: String,
    /// Slot label at watch start.
    pub label: String,
    /// Connection attempts made, including the first.
    pub attempts: u32,
    /// How the watch ended.
    pub status: Outcome,
    /// Failure detail of the last attempt, for failed watches.
    pub failure: Option<ConnectError>,
}

impl ConnectReport {
    pub fn connected(node_name: String, label: String, attempts: u32) -> Self {
        Self {
            node_name,
            label,
            attempts,
            status: Outcome::Success,
            failure: None,
        }
    }

    pub fn failed(node_name: String, label: String, attempts: u32, failure: ConnectError) -> Self {
        Self {
            node_name,
            label,
            attempts,
            status: Outcome::Failure,
            failure: Some(failure),
        }
    }

    pub fn canceled(node_name: String, label: String, attempts: u32) -> Self {
        Self {
            node_name,
            label,
            attempts,
            status: Outcome::Canceled,
            failure: None,
        }
    }
}
