use miro_core::CoreError;
use miro_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("match clause without uriref not allowed")]
    MatchWithoutIdentity,

    #[error("mismatched urirefs: match is {matching}, got {other}")]
    MismatchedIdentity { matching: String, other: String },

    #[error("types on match and insert differ: {matching} vs {other}")]
    MismatchedType { matching: String, other: String },
}
