use crate::lattice::ConversionDistance;
use crate::matcher::{Distances, MatchOutcome, MatchResult};
use sigscope_api::{Signature, TypeName};
use std::collections::HashSet;

/// Total order over accepted candidates, compared field by field.
///
/// The trailing declaring type and canonical string make the order total,
/// so equal-cost candidates always come out in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankKey {
    pub parameter_sum: u32,
    pub return_distance: ConversionDistance,
    pub name_distance: u8,
    pub modifier_penalty: u32,
    pub declaring_type: TypeName,
    pub canonical: String,
}

impl RankKey {
    pub fn new(candidate: &Signature, distances: &Distances) -> Self {
        Self {
            parameter_sum: distances.parameter_sum(),
            return_distance: distances.return_distance,
            name_distance: distances.name_distance,
            modifier_penalty: distances.modifier_penalty,
            declaring_type: candidate.declaring_type().clone(),
            canonical: candidate.canonical().to_string(),
        }
    }
}

/// Orders match results best-first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    limit: Option<usize>,
}

impl Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Keeps the matched outcomes and sorts them. Excluded candidates are
    /// logged and dropped.
    pub fn rank<'a>(&self, outcomes: impl IntoIterator<Item = MatchOutcome<'a>>) -> Vec<MatchResult<'a>> {
        let mut matched = Vec::new();
        let mut rejected = 0usize;
        let mut unresolved = 0usize;

        for outcome in outcomes {
            match outcome {
                MatchOutcome::Matched(result) => matched.push(result),
                MatchOutcome::Rejected { candidate, reason } => {
                    rejected += 1;
                    tracing::trace!("rejected {}: {}", candidate, reason);
                }
                MatchOutcome::Unresolved { candidate, name } => {
                    unresolved += 1;
                    tracing::debug!("skipping {}: unresolved type {}", candidate, name);
                }
            }
        }

        tracing::debug!(
            matched = matched.len(),
            rejected,
            unresolved,
            "ranking candidates"
        );
        self.sort(matched)
    }

    /// Stable sort by [`RankKey`], then duplicate removal and truncation.
    pub fn sort<'a>(&self, mut results: Vec<MatchResult<'a>>) -> Vec<MatchResult<'a>> {
        results.sort_by(|a, b| a.total_key.cmp(&b.total_key));

        let mut seen: HashSet<&'a str> = HashSet::with_capacity(results.len());
        results.retain(|result| {
            let candidate: &'a Signature = result.candidate;
            seen.insert(candidate.canonical())
        });

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }
}
