use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("'{construct}' is not an allowed MIRO construct")]
    InvalidConstruct { construct: String },

    #[error("missing match specification")]
    MissingMatchSpecification,

    #[error("restriction violated on {object_type}: {reason}")]
    RestrictionViolation { object_type: String, reason: String },

    #[error("message has no sender")]
    MissingSender,

    #[error("unknown operation slot: {0}")]
    UnknownSlot(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl CoreError {
    pub(crate) fn restriction(object_type: &str, reason: impl Into<String>) -> Self {
        Self::RestrictionViolation {
            object_type: object_type.to_string(),
            reason: reason.into(),
        }
    }
}
