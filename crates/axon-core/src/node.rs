//! Collaborator interfaces for the scheduler's node pool.
//!
//! These traits are the narrow seams toward the scheduler: axon never sees
//! node internals, only the state queries and mutations the allocation path
//! needs. Implementations live with the scheduler integration.
use std::sync::Arc;

use crate::connect::ConnectFuture;
use crate::error::CoreError;

/// Runtime state of one executor slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorState {
    /// `true` when the executor is not running any work.
    pub idle: bool,
}

/// Runtime view of a node's agent process.
pub trait Computer: Send + Sync {
    /// Node is connected and serving.
    fn is_online(&self) -> bool;

    /// Node is disconnected.
    fn is_offline(&self) -> bool;

    /// Node is in the middle of joining the pool.
    fn is_connecting(&self) -> bool;

    /// Node is willing to take new work.
    fn is_accepting_tasks(&self) -> bool;

    /// Executor slots and their idleness.
    fn executors(&self) -> Vec<ExecutorState>;

    /// Start (or force-restart) the agent connection.
    ///
    /// The returned future resolves when the node has joined the pool or
    /// the attempt failed; it is the only way to observe the outcome.
    fn connect(&self, force_reconnect: bool) -> ConnectFuture;
}

/// A provisioned compute node bound to exactly one slot label.
///
/// Label and environment are mutable only during the allocation transaction
/// that created or claimed the node.
pub trait Node: Send + Sync {
    /// Human-readable node name.
    fn name(&self) -> String;

    /// Slot label currently bound to the node.
    fn label(&self) -> String;

    /// Bind a slot label.
    fn set_label(&self, label: &str);

    /// Stamp an environment variable on the node's property set.
    fn set_env(&self, key: &str, value: &str);

    /// The node's agent-process view.
    fn computer(&self) -> Arc<dyn Computer>;
}

/// The scheduler's global set of known nodes.
///
/// All mutation goes through [`NodeRegistry::add_node`]; callers are
/// responsible for serializing additions (the cloud holds the allocation
/// lock, the spot path uses the serialized executor).
pub trait NodeRegistry: Send + Sync {
    /// Register a node into the pool.
    fn add_node(&self, node: Arc<dyn Node>) -> Result<(), CoreError>;

    /// Display names of all labels currently known.
    fn label_names(&self) -> Vec<String>;

    /// Nodes bound to the given label.
    fn nodes_for_label(&self, label: &str) -> Vec<Arc<dyn Node>>;
}
