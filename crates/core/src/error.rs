use sigscope_api::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigscopeError {
    #[error("Unresolved type: {name}")]
    UnresolvedType { name: String },
    #[error("Cyclic type hierarchy through {name}")]
    CyclicHierarchy { name: String },
    #[error("Too many parameters to permute: {count} (limit {limit})")]
    PermutationTooLarge { count: usize, limit: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, SigscopeError>;
