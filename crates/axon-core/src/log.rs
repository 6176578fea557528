use tokio::sync::mpsc;
use tracing::info;

/// Build-visible log stream.
///
/// Every allocation decision (reuse, mint, provision, connect, retry) is
/// written here as a human-readable line while the transaction proceeds.
/// Lines are mirrored to `tracing` unconditionally; when the handle was
/// created with [`BuildLog::channel`], the build system (or a test) can
/// drain the raw lines from the receiving end as well.
#[derive(Clone, Default)]
pub struct BuildLog {
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl BuildLog {
    /// Log handle that only mirrors to `tracing`.
    pub fn sink() -> Self {
        Self { tx: None }
    }

    /// Log handle paired with a receiver draining the raw lines.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Write one decision line.
    pub fn line(&self, msg: impl Into<String>) {
        let msg = msg.into();
        info!("{msg}");
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is watching the build
            // console anymore; the tracing mirror above already happened.
            let _ = tx.send(msg);
        }
    }
}
