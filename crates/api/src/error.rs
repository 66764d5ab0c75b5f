#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Malformed signature `{signature}`: {reason}")]
    MalformedSignature { signature: String, reason: String },
    #[error("Invalid type: {0}")]
    InvalidType(String),
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(String),
}

impl ModelError {
    pub(crate) fn malformed(signature: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::MalformedSignature {
            signature: signature.into(),
            reason: reason.into(),
        }
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
