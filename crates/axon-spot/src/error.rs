use thiserror::Error;

use axon_core::CoreError;

#[derive(Debug, Error)]
pub enum SpotError {
    #[error("no max bid price configured for template '{0}'")]
    MissingBidPrice(String),

    #[error("pricing market returned no spot requests")]
    NoRequestsReturned,

    #[error("market client error: {0}")]
    Client(String),

    #[error("spot node creation failed: {0}")]
    NodeCreation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
