//! Decides whether one candidate satisfies a query, and how closely.

mod assignment;
mod params;

pub use assignment::min_cost_assignment;

use crate::lattice::{ConversionDistance, ConversionPolicy, TypeLattice};
use crate::ranker::RankKey;
use params::{match_permuted, match_positional};
use sigscope_api::{Query, Signature, TypeName};
use std::fmt;

/// Per-criterion costs of an accepted candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distances {
    pub return_distance: ConversionDistance,
    /// One entry per query parameter, in query order.
    pub parameter_distances: Vec<ConversionDistance>,
    pub name_distance: u8,
    pub modifier_penalty: u32,
}

impl Distances {
    pub fn parameter_sum(&self) -> u32 {
        self.parameter_distances
            .iter()
            .filter_map(|d| d.rank())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub candidate: &'a Signature,
    pub distances: Distances,
    /// Set in permuting mode: `assignment[query_slot] = candidate_slot`.
    pub parameter_assignment: Option<Vec<usize>>,
    pub total_key: RankKey,
}

/// Why a candidate was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Kind,
    DeclaringType,
    Modifiers,
    Accessibility,
    Name,
    ReturnType,
    VariableArity,
    Arity { expected: usize, found: usize },
    ParameterType { position: usize },
    NoAssignment,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Kind => f.write_str("member kind differs"),
            Rejection::DeclaringType => f.write_str("declaring type not a subtype"),
            Rejection::Modifiers => f.write_str("modifier filter not satisfied"),
            Rejection::Accessibility => f.write_str("not accessible enough"),
            Rejection::Name => f.write_str("name does not match"),
            Rejection::ReturnType => f.write_str("return type not convertible"),
            Rejection::VariableArity => f.write_str("variable arity differs"),
            Rejection::Arity { expected, found } => {
                write!(f, "expected {} parameters, query has {}", expected, found)
            }
            Rejection::ParameterType { position } => {
                write!(f, "parameter {} not convertible", position)
            }
            Rejection::NoAssignment => f.write_str("no parameter permutation fits"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    Matched(MatchResult<'a>),
    Rejected {
        candidate: &'a Signature,
        reason: Rejection,
    },
    /// The candidate mentions a type the lattice does not know.
    Unresolved {
        candidate: &'a Signature,
        name: TypeName,
    },
}

impl<'a> MatchOutcome<'a> {
    pub fn into_match(self) -> Option<MatchResult<'a>> {
        match self {
            MatchOutcome::Matched(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn candidate(&self) -> &'a Signature {
        match self {
            MatchOutcome::Matched(result) => result.candidate,
            MatchOutcome::Rejected { candidate, .. } | MatchOutcome::Unresolved { candidate, .. } => {
                *candidate
            }
        }
    }
}

/// Evaluates candidates against queries over one lattice.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'l> {
    lattice: &'l TypeLattice,
    policy: ConversionPolicy,
}

impl<'l> Matcher<'l> {
    pub fn new(lattice: &'l TypeLattice) -> Self {
        Self {
            lattice,
            policy: ConversionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConversionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn lattice(&self) -> &'l TypeLattice {
        self.lattice
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    pub fn matches<'a>(&self, query: &Query, candidate: &'a Signature) -> Option<MatchResult<'a>> {
        self.evaluate(query, candidate).into_match()
    }

    pub fn evaluate<'a>(&self, query: &Query, candidate: &'a Signature) -> MatchOutcome<'a> {
        if let Some(name) = candidate
            .referenced_types()
            .find(|name| !self.lattice.contains(name))
        {
            return MatchOutcome::Unresolved {
                candidate,
                name: name.clone(),
            };
        }

        match self.score(query, candidate) {
            Ok((distances, parameter_assignment)) => {
                let total_key = RankKey::new(candidate, &distances);
                MatchOutcome::Matched(MatchResult {
                    candidate,
                    distances,
                    parameter_assignment,
                    total_key,
                })
            }
            Err(reason) => MatchOutcome::Rejected { candidate, reason },
        }
    }

    fn score(
        &self,
        query: &Query,
        candidate: &Signature,
    ) -> Result<(Distances, Option<Vec<usize>>), Rejection> {
        if query.kind.is_some_and(|kind| kind != candidate.kind()) {
            return Err(Rejection::Kind);
        }

        if let Some(declaring) = &query.declaring_type {
            let ok = declaring
                .as_named()
                .is_some_and(|target| self.lattice.is_subtype(candidate.declaring_type(), target));
            if !ok {
                return Err(Rejection::DeclaringType);
            }
        }

        if !query.modifiers.admits(candidate.modifiers()) {
            return Err(Rejection::Modifiers);
        }
        let modifier_penalty = candidate
            .modifiers()
            .iter()
            .filter(|m| m.is_surprising() && !query.modifiers.mentions(**m))
            .count() as u32;

        if let Some(min) = query.min_access {
            if !candidate.accessibility().is_at_least(min) {
                return Err(Rejection::Accessibility);
            }
        }

        let name_distance = match &query.name {
            None => 0,
            Some(pattern) if pattern.matches(candidate.effective_name()) => {
                if pattern.is_literal() { 0 } else { 1 }
            }
            Some(_) => return Err(Rejection::Name),
        };

        let return_distance = match &query.return_type {
            None => ConversionDistance::Identity,
            Some(expected) => {
                let distance =
                    self.lattice
                        .distance_with(&candidate.effective_return_type(), expected, self.policy);
                if !distance.is_compatible() {
                    return Err(Rejection::ReturnType);
                }
                distance
            }
        };

        if query
            .is_variable_arity
            .is_some_and(|flag| flag != candidate.is_variable_arity())
        {
            return Err(Rejection::VariableArity);
        }

        let (parameter_distances, parameter_assignment) = match &query.parameter_types {
            None => (Vec::new(), None),
            Some(params) if query.permute_parameters => {
                let (distances, assignment) =
                    match_permuted(params, candidate, self.lattice, self.policy)?;
                (distances, Some(assignment))
            }
            Some(params) => (
                match_positional(params, candidate, self.lattice, self.policy)?,
                None,
            ),
        };

        Ok((
            Distances {
                return_distance,
                parameter_distances,
                name_distance,
                modifier_penalty,
            },
            parameter_assignment,
        ))
    }
}

/// Matches a single candidate under the default conversion policy.
pub fn match_signature<'a>(
    query: &Query,
    candidate: &'a Signature,
    lattice: &TypeLattice,
) -> Option<MatchResult<'a>> {
    Matcher::new(lattice).matches(query, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::build_lattice;
    use sigscope_api::{
        Accessibility, MemberKind, Modifier, NamePattern, PrimitiveKind, TypeDecl, TypeRef,
    };

    fn int() -> TypeRef {
        TypeRef::Primitive(PrimitiveKind::Int)
    }

    fn lattice() -> TypeLattice {
        build_lattice([
            TypeDecl::class("demo.Shape"),
            TypeDecl::class("demo.Circle").extends("demo.Shape"),
        ])
        .unwrap()
    }

    fn area() -> Signature {
        Signature::method("demo.Circle", "area", TypeRef::Primitive(PrimitiveKind::Double))
            .modifier(Modifier::Public)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_query_matches_with_zero_distances() {
        let lattice = lattice();
        let candidate = area();
        let result = match_signature(&Query::new(), &candidate, &lattice).unwrap();
        assert_eq!(result.distances.parameter_sum(), 0);
        assert_eq!(result.distances.return_distance, ConversionDistance::Identity);
        assert_eq!(result.parameter_assignment, None);
    }

    #[test]
    fn test_declaring_type_accepts_subtypes() {
        let lattice = lattice();
        let candidate = area();
        let query = Query::new().declared_in(TypeRef::named("demo.Shape"));
        assert!(match_signature(&query, &candidate, &lattice).is_some());

        let shape_area = Signature::method("demo.Shape", "area", int()).build().unwrap();
        let query = Query::new().declared_in(TypeRef::named("demo.Circle"));
        let outcome = Matcher::new(&lattice).evaluate(&query, &shape_area);
        assert!(matches!(
            outcome,
            MatchOutcome::Rejected {
                reason: Rejection::DeclaringType,
                ..
            }
        ));
    }

    #[test]
    fn test_return_type_widening() {
        let lattice = lattice();
        let candidate = Signature::method("demo.Shape", "size", int()).build().unwrap();
        let query = Query::new().returns(TypeRef::Primitive(PrimitiveKind::Long));
        let result = match_signature(&query, &candidate, &lattice).unwrap();
        assert_eq!(result.distances.return_distance, ConversionDistance::WideningPrimitive);

        let query = Query::new().returns(TypeRef::Primitive(PrimitiveKind::Short));
        assert!(match_signature(&query, &candidate, &lattice).is_none());
    }

    #[test]
    fn test_constructor_returns_declaring_type() {
        let lattice = lattice();
        let ctor = Signature::constructor("demo.Circle").build().unwrap();
        let query = Query::new()
            .returns(TypeRef::named("demo.Shape"))
            .named(NamePattern::literal("Circle"));
        let result = match_signature(&query, &ctor, &lattice).unwrap();
        assert_eq!(result.distances.return_distance, ConversionDistance::WideningReference);
        assert_eq!(result.distances.name_distance, 0);
    }

    #[test]
    fn test_wildcard_name_costs_one() {
        let lattice = lattice();
        let candidate = area();
        let query = Query::new().named(NamePattern::parse("ar*").unwrap());
        let result = match_signature(&query, &candidate, &lattice).unwrap();
        assert_eq!(result.distances.name_distance, 1);
    }

    #[test]
    fn test_surprising_modifiers_penalised_unless_mentioned() {
        let lattice = lattice();
        let candidate = Signature::method("demo.Shape", "old", int())
            .modifiers([Modifier::Public, Modifier::Deprecated, Modifier::Synthetic])
            .build()
            .unwrap();
        let result = match_signature(&Query::new(), &candidate, &lattice).unwrap();
        assert_eq!(result.distances.modifier_penalty, 2);

        let query = Query::new().require(Modifier::Deprecated);
        let result = match_signature(&query, &candidate, &lattice).unwrap();
        assert_eq!(result.distances.modifier_penalty, 1);

        let query = Query::new().forbid(Modifier::Synthetic);
        assert!(match_signature(&query, &candidate, &lattice).is_none());
    }

    #[test]
    fn test_min_access() {
        let lattice = lattice();
        let hidden = Signature::method("demo.Shape", "helper", int())
            .modifier(Modifier::Private)
            .build()
            .unwrap();
        let query = Query::new().at_least(Accessibility::Package);
        let outcome = Matcher::new(&lattice).evaluate(&query, &hidden);
        assert!(matches!(
            outcome,
            MatchOutcome::Rejected {
                reason: Rejection::Accessibility,
                ..
            }
        ));
    }

    #[test]
    fn test_kind_and_varargs_flag() {
        let lattice = lattice();
        let candidate = area();
        let query = Query::new().kind(MemberKind::Field);
        assert!(match_signature(&query, &candidate, &lattice).is_none());
        let query = Query::new().variable_arity(true);
        assert!(match_signature(&query, &candidate, &lattice).is_none());
    }

    #[test]
    fn test_unknown_candidate_type_is_unresolved() {
        let lattice = lattice();
        let candidate = Signature::method("demo.Shape", "load", TypeRef::named("other.Missing"))
            .build()
            .unwrap();
        let outcome = Matcher::new(&lattice).evaluate(&Query::new(), &candidate);
        assert!(matches!(
            outcome,
            MatchOutcome::Unresolved { name, .. } if name.as_str() == "other.Missing"
        ));
    }

    #[test]
    fn test_thrown_types_never_reject() {
        let lattice = lattice();
        let candidate = area();
        let query = Query::new().throws(TypeRef::named("demo.Shape"));
        assert!(match_signature(&query, &candidate, &lattice).is_some());
    }
}
