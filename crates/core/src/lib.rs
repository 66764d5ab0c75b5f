pub mod catalog;
pub mod error;
pub mod lattice;
pub mod logging;
pub mod matcher;
pub mod options;
pub mod ranker;
pub mod search;

pub use catalog::{Catalog, CatalogDocument, MemberEntry, SkippedMember};
pub use error::{Result, SigscopeError};
pub use lattice::{ConversionDistance, ConversionPolicy, TypeLattice, build_lattice};
pub use matcher::{Distances, MatchOutcome, MatchResult, Matcher, Rejection, match_signature};
pub use options::MatchOptions;
pub use ranker::{RankKey, Ranker};
pub use search::{match_all, match_all_with, validate_query};
