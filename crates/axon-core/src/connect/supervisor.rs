use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, warn};

use axon_model::RetryStrategy;

use crate::connect::{ConnectFuture, ConnectReport};
use crate::log::BuildLog;
use crate::metrics::{MetricsHandle, Outcome};
use crate::node::Node;
use crate::session::BuildSession;

/// Background watcher for a batch of freshly launched nodes.
///
/// Spawned once per allocation transaction, after the allocation lock has
/// been released. Failures are terminal per node and surface only through
/// the log stream and metrics; the already-returned allocation is never
/// affected.
pub struct ConnectSupervisor {
    retry: RetryStrategy,
    metrics: MetricsHandle,
}

impl ConnectSupervisor {
    pub fn new(retry: RetryStrategy, metrics: MetricsHandle) -> Self {
        Self { retry, metrics }
    }

    /// Run supervision on a detached background task.
    ///
    /// The handle is returned for callers that want to join the outcome
    /// list (tests, shutdown paths); dropping it keeps supervision running.
    pub fn spawn(
        self,
        session: BuildSession,
        pairs: Vec<(Arc<dyn Node>, ConnectFuture)>,
    ) -> JoinHandle<Vec<ConnectReport>> {
        tokio::spawn(async move { self.supervise(session, pairs).await })
    }

    /// Watch every pair to a terminal outcome, reporting in pair order.
    #[instrument(level = "debug", skip_all, fields(nodes = pairs.len()))]
    pub async fn supervise(
        &self,
        session: BuildSession,
        pairs: Vec<(Arc<dyn Node>, ConnectFuture)>,
    ) -> Vec<ConnectReport> {
        let handles: Vec<JoinHandle<ConnectReport>> = pairs
            .into_iter()
            .map(|(node, future)| {
                let log = session.log().clone();
                let cancel = session.cancel_token().clone();
                let retry = self.retry;
                tokio::spawn(watch_connection(node, future, retry, log, cancel))
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => {
                    self.metrics
                        .record_connect_outcome(report.status, report.attempts as u64);
                    reports.push(report);
                }
                Err(e) => error!("connection watch task panicked: {e}"),
            }
        }

        let connected = reports
            .iter()
            .filter(|r| r.status == Outcome::Success)
            .count();
        session.log().line(format!(
            "Connection supervision finished: {connected} of {} node(s) online",
            reports.len()
        ));
        reports
    }
}

/// Bounded retry loop for one node's connection.
///
/// Waits on the first-generation future; on failure sleeps the fixed retry
/// delay and forces a reconnect for the next attempt, up to
/// `retry.max_attempts` total attempts. Cancellation during any wait or the
/// delay ends the watch with a `Canceled` report.
pub async fn watch_connection(
    node: Arc<dyn Node>,
    first: ConnectFuture,
    retry: RetryStrategy,
    log: BuildLog,
    cancel: CancellationToken,
) -> ConnectReport {
    let name = node.name();
    let label = node.label();
    let mut future = first;
    let mut attempt: u32 = 1;

    loop {
        log.line(format!("Waiting for {name} (label {label}) to come up"));
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(node = %name, "connection wait interrupted");
                return ConnectReport::canceled(name, label, attempt);
            }
            res = &mut future => res,
        };

        match result {
            Ok(()) => {
                log.line(format!("Node {name} (label {label}) is online"));
                return ConnectReport::connected(name, label, attempt);
            }
            Err(failure) => {
                log.line(format!("Node for label '{label}' failed to connect."));
                log.line(format!("Node name is: {name}"));
                log.line(failure.reason().to_string());

                if attempt >= retry.max_attempts {
                    log.line(format!(
                        "Giving up on {name} (label {label}) after {attempt} attempt(s)"
                    ));
                    return ConnectReport::failed(name, label, attempt, failure);
                }

                log.line(format!(
                    "Will retry connection on {name} in {}ms",
                    retry.delay_ms
                ));
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        warn!(node = %name, "retry delay interrupted");
                        return ConnectReport::canceled(name, label, attempt);
                    }
                    _ = tokio::time::sleep(Duration::from_millis(retry.delay_ms)) => {}
                }

                attempt += 1;
                log.line(format!("Retrying connection on node {name}"));
                future = node.computer().connect(true);
            }
        }
    }
}
