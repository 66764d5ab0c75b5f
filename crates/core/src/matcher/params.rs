use super::Rejection;
use super::assignment::min_cost_assignment;
use crate::lattice::{ConversionDistance, ConversionPolicy, TypeLattice};
use sigscope_api::{Signature, TypeRef};

/// Position-by-position comparison, with variable-arity expansion.
///
/// Query slot `i` is the argument; it must convert to candidate slot `i`.
pub(crate) fn match_positional(
    query: &[TypeRef],
    candidate: &Signature,
    lattice: &TypeLattice,
    policy: ConversionPolicy,
) -> Result<Vec<ConversionDistance>, Rejection> {
    let params = candidate.parameter_types();
    let fixed = candidate.fixed_arity();

    let arity_ok = if candidate.is_variable_arity() {
        query.len() >= fixed
    } else {
        query.len() == params.len()
    };
    if !arity_ok {
        return Err(Rejection::Arity {
            expected: params.len(),
            found: query.len(),
        });
    }

    let mut distances = Vec::with_capacity(query.len());
    for (position, (arg, param)) in query.iter().zip(&params[..fixed]).enumerate() {
        let distance = lattice.distance_with(arg, param, policy);
        if !distance.is_compatible() {
            return Err(Rejection::ParameterType { position });
        }
        distances.push(distance);
    }

    if !candidate.is_variable_arity() {
        return Ok(distances);
    }

    let tail = &params[fixed];
    let trailing = &query[fixed..];

    // An array passed directly in the variable-arity slot.
    if trailing.len() == 1 {
        let distance = lattice.distance_with(&trailing[0], tail, policy);
        if distance.is_compatible() {
            distances.push(distance);
            return Ok(distances);
        }
    }

    let Some(element) = tail.element_type() else {
        return Err(Rejection::ParameterType { position: fixed });
    };
    for (offset, arg) in trailing.iter().enumerate() {
        if !lattice.distance_with(arg, &element, policy).is_compatible() {
            return Err(Rejection::ParameterType {
                position: fixed + offset,
            });
        }
        distances.push(ConversionDistance::VarargsPack);
    }

    Ok(distances)
}

/// Order-insensitive comparison: finds the cheapest way to give every query
/// slot its own candidate slot.
///
/// Returns the per-query-slot distances and the chosen assignment
/// (`assignment[query_slot] = candidate_slot`). A variable-arity tail is
/// treated as an ordinary array parameter.
pub(crate) fn match_permuted(
    query: &[TypeRef],
    candidate: &Signature,
    lattice: &TypeLattice,
    policy: ConversionPolicy,
) -> Result<(Vec<ConversionDistance>, Vec<usize>), Rejection> {
    let params = candidate.parameter_types();
    if query.len() != params.len() {
        return Err(Rejection::Arity {
            expected: params.len(),
            found: query.len(),
        });
    }

    let matrix: Vec<Vec<ConversionDistance>> = query
        .iter()
        .map(|arg| {
            params
                .iter()
                .map(|param| lattice.distance_with(arg, param, policy))
                .collect()
        })
        .collect();
    let costs: Vec<Vec<Option<u32>>> = matrix
        .iter()
        .map(|row| row.iter().map(|d| d.rank()).collect())
        .collect();

    let assignment = min_cost_assignment(&costs).ok_or(Rejection::NoAssignment)?;
    let distances = assignment
        .iter()
        .enumerate()
        .map(|(slot, &col)| matrix[slot][col])
        .collect();
    Ok((distances, assignment))
}
