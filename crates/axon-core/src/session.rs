use tokio_util::sync::CancellationToken;

use crate::log::BuildLog;

/// Shared per-build context passed through the allocation path.
///
/// Carries the build-visible log stream and the cancellation token that
/// stands in for caller interruption: every suspension point (lock wait,
/// connection wait, retry delay) observes it.
#[derive(Clone, Default)]
pub struct BuildSession {
    log: BuildLog,
    cancel: CancellationToken,
}

impl BuildSession {
    /// Create a session with a fresh cancellation token.
    pub fn new(log: BuildLog) -> Self {
        Self {
            log,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a session observing an externally owned token.
    pub fn with_cancel(log: BuildLog, cancel: CancellationToken) -> Self {
        Self { log, cancel }
    }

    /// The build-visible log stream.
    pub fn log(&self) -> &BuildLog {
        &self.log
    }

    /// Token cancelled when the build is interrupted.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
