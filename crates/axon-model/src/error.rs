use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("tag must not be empty")]
    EmptyTag,

    #[error("tag '{0}' must not contain the slot separator '{1}'")]
    TagContainsSeparator(String, &'static str),

    #[error("unknown bid kind: {0}")]
    UnknownBidKind(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
