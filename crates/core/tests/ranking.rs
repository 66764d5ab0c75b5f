mod common;

use common::{Fixture, int, named, names, string};
use sigscope_api::{Modifier, Query, Signature};
use sigscope_core::{MatchOptions, match_all, match_all_with};

#[test]
fn test_earlier_declaring_type_wins_full_ties() {
    let (lattice, candidates) = Fixture::new()
        .static_method("org.b.Util", "hash", int(), vec![string()])
        .static_method("org.a.Util", "hash", int(), vec![string()])
        .build();
    let results = match_all(&Query::new().params([string()]), &candidates, &lattice).unwrap();
    let owners: Vec<&str> = results
        .iter()
        .map(|r| r.candidate.declaring_type().as_str())
        .collect();
    assert_eq!(owners, vec!["org.a.Util", "org.b.Util"]);
}

#[test]
fn test_deprecated_members_sink() {
    let (lattice, candidates) = Fixture::new()
        .member(
            Signature::method("app.A", "legacy", int())
                .modifiers([Modifier::Public, Modifier::Deprecated])
                .build()
                .unwrap(),
        )
        .method("app.B", "current", int(), vec![])
        .build();

    let results = match_all(&Query::new(), &candidates, &lattice).unwrap();
    assert_eq!(names(&results), vec!["B.current", "A.legacy"]);
    assert_eq!(results[1].distances.modifier_penalty, 1);

    // Asking for deprecated members removes the penalty.
    let query = Query::new().require(Modifier::Deprecated);
    let results = match_all(&query, &candidates, &lattice).unwrap();
    assert_eq!(results[0].distances.modifier_penalty, 0);
}

#[test]
fn test_return_distance_breaks_parameter_ties() {
    let (lattice, candidates) = Fixture::collections()
        .method("app.Repo", "asList", named("java.util.List"), vec![])
        .method("app.Repo", "asArrayList", named("java.util.ArrayList"), vec![])
        .build();

    let query = Query::new().returns(named("java.util.List"));
    let results = match_all(&query, &candidates, &lattice).unwrap();
    assert_eq!(names(&results), vec!["Repo.asList", "Repo.asArrayList"]);
}

#[test]
fn test_duplicates_collapse() {
    let (lattice, candidates) = Fixture::new()
        .method("app.A", "f", int(), vec![])
        .method("app.A", "f", int(), vec![])
        .build();
    let results = match_all(&Query::new(), &candidates, &lattice).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_limit_keeps_the_best() {
    let mut fixture = Fixture::new();
    for i in 0..10 {
        fixture = fixture.method("app.A", &format!("f{}", i), int(), vec![]);
    }
    let (lattice, candidates) = fixture.build();
    let options = MatchOptions::default().with_limit(3);
    let results = match_all_with(&Query::new(), &candidates, &lattice, &options).unwrap();
    assert_eq!(names(&results), vec!["A.f0", "A.f1", "A.f2"]);
}

#[test]
fn test_no_candidates_no_results() {
    let (lattice, candidates) = Fixture::new().build();
    assert!(match_all(&Query::new(), &candidates, &lattice).unwrap().is_empty());
}
