use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComparisonError>;

/// Errors raised by the related content engine.
/// Every variant is caller misuse or a cache codec failure;
/// the numeric pipeline itself has no transient failures.
#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("invalid input: vectors have different lengths ({left} != {right})")]
    InvalidInput { left: usize, right: usize },

    #[error("invalid input: cannot score zero-length vectors")]
    EmptyVector,

    #[error("unknown field: {field}")]
    UnknownField { field: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_cbor::Error> for ComparisonError {
    fn from(err: serde_cbor::Error) -> Self {
        ComparisonError::Serialization(err.to_string())
    }
}
