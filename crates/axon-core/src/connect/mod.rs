//! Connection supervision for freshly launched nodes.
//!
//! One watch task per node runs a bounded retry loop over the node's
//! connection future and ends with a terminal [`ConnectReport`]; the
//! supervisor collects reports in pair order. Nothing here ever blocks the
//! allocation caller or fails the already-returned allocation.
mod outcome;
pub use outcome::{ConnectError, ConnectFuture, ConnectReport};

mod supervisor;
pub use supervisor::{ConnectSupervisor, watch_connection};
