//! Whole-run entry points: validate, evaluate every candidate, rank.

use crate::error::{Result, SigscopeError};
use crate::lattice::TypeLattice;
use crate::matcher::{MatchOutcome, MatchResult, Matcher};
use crate::options::MatchOptions;
use crate::ranker::Ranker;
use rayon::prelude::*;
use sigscope_api::{Query, Signature};
use std::time::Instant;

/// Matches and ranks `candidates` with default options.
pub fn match_all<'a>(
    query: &Query,
    candidates: &'a [Signature],
    lattice: &TypeLattice,
) -> Result<Vec<MatchResult<'a>>> {
    match_all_with(query, candidates, lattice, &MatchOptions::default())
}

pub fn match_all_with<'a>(
    query: &Query,
    candidates: &'a [Signature],
    lattice: &TypeLattice,
    options: &MatchOptions,
) -> Result<Vec<MatchResult<'a>>> {
    validate_query(query, lattice, options)?;

    let start = Instant::now();
    let matcher = Matcher::new(lattice).with_policy(options.conversions);

    let outcomes: Vec<MatchOutcome<'a>> = if candidates.len() >= options.parallel_threshold {
        candidates
            .par_iter()
            .map(|candidate| matcher.evaluate(query, candidate))
            .collect()
    } else {
        candidates
            .iter()
            .map(|candidate| matcher.evaluate(query, candidate))
            .collect()
    };

    let results = Ranker::new().with_limit(options.limit).rank(outcomes);

    tracing::debug!(
        candidates = candidates.len(),
        results = results.len(),
        policy = ?options.conversions,
        "matched in {:?}",
        start.elapsed()
    );
    Ok(results)
}

/// Checks a query before any candidate is looked at.
///
/// Every type the query names must be known to the lattice, and a permuting
/// query must stay within `max_permuted_params`.
pub fn validate_query(query: &Query, lattice: &TypeLattice, options: &MatchOptions) -> Result<()> {
    if let Some(name) = query.referenced_types().find(|name| !lattice.contains(name)) {
        return Err(SigscopeError::UnresolvedType {
            name: name.to_string(),
        });
    }

    if query.permute_parameters {
        let count = query.parameter_types.as_ref().map_or(0, Vec::len);
        if count > options.max_permuted_params {
            return Err(SigscopeError::PermutationTooLarge {
                count,
                limit: options.max_permuted_params,
            });
        }
    }

    Ok(())
}
