use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("interrupted while waiting for {0}")]
    Interrupted(&'static str),

    #[error("no template registered for tag: {0}")]
    NoTemplate(String),

    #[error("provisioning failed: {0}")]
    Provision(String),

    #[error("node registration failed: {0}")]
    Registry(String),

    #[error("serialized task failed: {0}")]
    Serial(String),
}
