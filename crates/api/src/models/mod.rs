pub mod query;
pub mod signature;
pub mod types;

pub use query::*;
pub use signature::*;
pub use types::*;
