//! The type lattice: a read-only model of which types convert to which.
//!
//! The hierarchy is loaded once from the discovered declarations into a
//! `petgraph` graph whose edges point from a type to its direct parents.
//! Every type's ancestor closure is computed at build time, so lookups
//! during matching never walk the graph.

mod builtin;
pub mod conversion;

pub use conversion::{ConversionDistance, ConversionPolicy, widens_to};

use crate::error::{Result, SigscopeError};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use sigscope_api::{PrimitiveKind, TypeDecl, TypeName, TypeRef};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentEdge {
    Extends,
    Implements,
}

#[derive(Debug, Clone)]
pub struct TypeLattice {
    graph: DiGraph<TypeName, ParentEdge>,
    index: HashMap<TypeName, NodeIndex>,
    /// Ancestors of each node in breadth-first order, excluding the node.
    ancestors: Vec<Vec<NodeIndex>>,
    ancestor_sets: Vec<HashSet<NodeIndex>>,
    root: NodeIndex,
}

/// Builds the lattice from every discovered declaration.
pub fn build_lattice(decls: impl IntoIterator<Item = TypeDecl>) -> Result<TypeLattice> {
    TypeLattice::build(decls)
}

impl TypeLattice {
    pub fn build(decls: impl IntoIterator<Item = TypeDecl>) -> Result<Self> {
        // Sorted so node indices (and thus traversal order) are reproducible.
        let mut merged: BTreeMap<TypeName, TypeDecl> = builtin::builtin_decls()
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        let mut discovered = 0usize;
        for decl in decls {
            discovered += 1;
            merged.insert(decl.name.clone(), decl);
        }

        let mut graph = DiGraph::with_capacity(merged.len(), merged.len() * 2);
        let mut index = HashMap::with_capacity(merged.len());
        for name in merged.keys() {
            let idx = graph.add_node(name.clone());
            index.insert(name.clone(), idx);
        }

        let root_name = TypeName::root();
        let root = index[&root_name];

        for decl in merged.values() {
            let child = index[&decl.name];
            if decl.name.is_root() {
                if decl.parents().next().is_some() {
                    tracing::warn!("ignoring declared parents of the root type {}", decl.name);
                }
                continue;
            }

            let mut has_supertype = false;
            for (parent, edge) in decl
                .supertypes
                .iter()
                .map(|p| (p, ParentEdge::Extends))
                .chain(decl.interfaces.iter().map(|p| (p, ParentEdge::Implements)))
            {
                let Some(&parent_idx) = index.get(parent) else {
                    tracing::debug!("{} names unknown parent {}", decl.name, parent);
                    return Err(SigscopeError::UnresolvedType {
                        name: parent.to_string(),
                    });
                };
                has_supertype |= edge == ParentEdge::Extends;
                graph.add_edge(child, parent_idx, edge);
            }

            if !has_supertype {
                graph.add_edge(child, root, ParentEdge::Extends);
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(SigscopeError::CyclicHierarchy {
                name: graph[cycle.node_id()].to_string(),
            });
        }

        let mut ancestors = Vec::with_capacity(graph.node_count());
        let mut ancestor_sets = Vec::with_capacity(graph.node_count());
        for idx in graph.node_indices() {
            let mut order = Vec::new();
            let mut bfs = Bfs::new(&graph, idx);
            while let Some(next) = bfs.next(&graph) {
                if next != idx {
                    order.push(next);
                }
            }
            ancestor_sets.push(order.iter().copied().collect::<HashSet<_>>());
            ancestors.push(order);
        }

        tracing::debug!(
            discovered,
            total = graph.node_count(),
            edges = graph.edge_count(),
            "type lattice built"
        );

        Ok(Self {
            graph,
            index,
            ancestors,
            ancestor_sets,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn root(&self) -> &TypeName {
        &self.graph[self.root]
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.index.contains_key(name)
    }

    /// Fails with `UnresolvedType` if `ty` mentions a named type the
    /// lattice does not know.
    pub fn check_resolved(&self, ty: &TypeRef) -> Result<()> {
        match ty.named_leaf() {
            Some(name) if !self.contains(name) => Err(SigscopeError::UnresolvedType {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// All ancestors of `name`, nearest first. Empty for unknown names.
    pub fn ancestors(&self, name: &TypeName) -> impl Iterator<Item = &TypeName> + '_ {
        self.index
            .get(name)
            .map(|idx| self.ancestors[idx.index()].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.graph[*idx])
    }

    /// Direct parents of `name` as declared (plus the implicit root edge).
    pub fn parents(&self, name: &TypeName) -> Vec<&TypeName> {
        let Some(&idx) = self.index.get(name) else {
            return vec![];
        };
        let mut parents: Vec<&TypeName> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|p| &self.graph[p])
            .collect();
        parents.sort();
        parents
    }

    /// Reflexive, transitive reference subtyping between named types.
    ///
    /// The root is a supertype of everything, known or not.
    pub fn is_subtype(&self, sub: &TypeName, sup: &TypeName) -> bool {
        if sub == sup || sup.is_root() {
            return true;
        }
        match (self.index.get(sub), self.index.get(sup)) {
            (Some(sub_idx), Some(sup_idx)) => self.ancestor_sets[sub_idx.index()].contains(sup_idx),
            _ => false,
        }
    }

    /// Conversion distance under the default (strict) policy.
    pub fn distance(&self, from: &TypeRef, to: &TypeRef) -> ConversionDistance {
        self.distance_with(from, to, ConversionPolicy::Strict)
    }

    /// Can a value of type `from` be used where `to` is expected, and at
    /// what cost?
    pub fn distance_with(
        &self,
        from: &TypeRef,
        to: &TypeRef,
        policy: ConversionPolicy,
    ) -> ConversionDistance {
        use ConversionDistance::*;

        if from == to {
            return Identity;
        }

        match (from, to) {
            (TypeRef::Primitive(f), TypeRef::Primitive(t)) => {
                if policy.allows_primitive_conversions() && widens_to(*f, *t) {
                    WideningPrimitive
                } else {
                    Incompatible
                }
            }
            (TypeRef::Primitive(p), TypeRef::Named(target)) => self.boxing(*p, target, policy),
            (TypeRef::Named(source), TypeRef::Primitive(p)) => Self::unboxing(source, *p, policy),
            (TypeRef::Named(f), TypeRef::Named(t)) => {
                if self.is_subtype(f, t) {
                    WideningReference
                } else {
                    Incompatible
                }
            }
            (TypeRef::Array(_), TypeRef::Named(t)) => {
                if t.is_root() || t.as_str() == builtin::CLONEABLE || t.as_str() == builtin::SERIALIZABLE
                {
                    WideningReference
                } else {
                    Incompatible
                }
            }
            (TypeRef::Array(from), TypeRef::Array(to)) => {
                if from.dimensions() != to.dimensions() {
                    return Incompatible;
                }
                // Primitive components are invariant; identical arrays were
                // handled above.
                let (fc, tc) = (from.component(), to.component());
                match (fc, tc) {
                    (TypeRef::Named(_), TypeRef::Named(_)) => {
                        match self.distance_with(fc, tc, policy) {
                            Identity | WideningReference => WideningReference,
                            _ => Incompatible,
                        }
                    }
                    _ => Incompatible,
                }
            }
            (TypeRef::Primitive(_), TypeRef::Array(_))
            | (TypeRef::Array(_), TypeRef::Primitive(_))
            | (TypeRef::Named(_), TypeRef::Array(_)) => Incompatible,
        }
    }

    fn boxing(
        &self,
        primitive: PrimitiveKind,
        target: &TypeName,
        policy: ConversionPolicy,
    ) -> ConversionDistance {
        if !policy.allows_primitive_conversions() {
            return ConversionDistance::Incompatible;
        }
        let Some(boxed) = primitive.boxed_name() else {
            return ConversionDistance::Incompatible;
        };
        if target.as_str() == boxed {
            return ConversionDistance::Boxing;
        }
        if policy.allows_compound() && self.is_subtype(&TypeName::new(boxed), target) {
            return ConversionDistance::Boxing.then(ConversionDistance::WideningReference);
        }
        ConversionDistance::Incompatible
    }

    fn unboxing(
        source: &TypeName,
        primitive: PrimitiveKind,
        policy: ConversionPolicy,
    ) -> ConversionDistance {
        if !policy.allows_primitive_conversions() {
            return ConversionDistance::Incompatible;
        }
        match PrimitiveKind::from_boxed_name(source.as_str()) {
            Some(unboxed) if unboxed == primitive => ConversionDistance::Boxing,
            Some(unboxed) if policy.allows_compound() && widens_to(unboxed, primitive) => {
                ConversionDistance::Boxing.then(ConversionDistance::WideningPrimitive)
            }
            _ => ConversionDistance::Incompatible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConversionDistance::*;

    fn named(s: &str) -> TypeRef {
        TypeRef::named(s)
    }

    fn prim(kind: PrimitiveKind) -> TypeRef {
        TypeRef::Primitive(kind)
    }

    fn collections() -> TypeLattice {
        build_lattice([
            TypeDecl::interface("java.lang.Iterable"),
            TypeDecl::interface("java.util.Collection").implements("java.lang.Iterable"),
            TypeDecl::interface("java.util.List").implements("java.util.Collection"),
            TypeDecl::class("java.util.AbstractList").implements("java.util.List"),
            TypeDecl::class("java.util.ArrayList")
                .extends("java.util.AbstractList")
                .implements("java.lang.Cloneable"),
        ])
        .unwrap()
    }

    #[test]
    fn test_builtins_present() {
        let lattice = build_lattice([]).unwrap();
        assert!(lattice.contains(&TypeName::new("java.lang.Integer")));
        assert!(lattice.contains(&TypeName::new("java.lang.String")));
        assert_eq!(lattice.root().as_str(), "java.lang.Object");
    }

    #[test]
    fn test_reference_widening_through_interfaces() {
        let lattice = collections();
        assert_eq!(
            lattice.distance(&named("java.util.ArrayList"), &named("java.lang.Iterable")),
            WideningReference
        );
        assert_eq!(
            lattice.distance(&named("java.lang.Iterable"), &named("java.util.ArrayList")),
            Incompatible
        );
        assert_eq!(
            lattice.distance(&named("java.util.List"), &TypeRef::root()),
            WideningReference
        );
    }

    #[test]
    fn test_ancestors_breadth_first() {
        let lattice = collections();
        let ancestors: Vec<&str> = lattice
            .ancestors(&TypeName::new("java.util.ArrayList"))
            .map(|n| n.as_str())
            .collect();
        let pos = |name: &str| ancestors.iter().position(|a| *a == name).unwrap();
        assert!(pos("java.util.AbstractList") < pos("java.util.List"));
        assert!(pos("java.util.List") < pos("java.util.Collection"));
        assert!(ancestors.contains(&"java.lang.Object"));
        assert!(ancestors.contains(&"java.lang.Cloneable"));
    }

    #[test]
    fn test_parentless_interface_widens_to_root() {
        let lattice = collections();
        assert_eq!(
            lattice.parents(&TypeName::new("java.lang.Iterable")),
            vec![&TypeName::root()]
        );
    }

    #[test]
    fn test_boxing_both_directions() {
        let lattice = build_lattice([]).unwrap();
        assert_eq!(
            lattice.distance(&prim(PrimitiveKind::Int), &named("java.lang.Integer")),
            Boxing
        );
        assert_eq!(
            lattice.distance(&named("java.lang.Character"), &prim(PrimitiveKind::Char)),
            Boxing
        );
        assert_eq!(
            lattice.distance(&prim(PrimitiveKind::Int), &named("java.lang.Long")),
            Incompatible
        );
    }

    #[test]
    fn test_strict_policy_rejects_compound_conversions() {
        let lattice = build_lattice([]).unwrap();
        assert_eq!(
            lattice.distance(&prim(PrimitiveKind::Int), &named("java.lang.Number")),
            Incompatible
        );
        assert_eq!(
            lattice.distance(&prim(PrimitiveKind::Int), &TypeRef::root()),
            Incompatible
        );
        assert_eq!(
            lattice.distance(&named("java.lang.Integer"), &prim(PrimitiveKind::Long)),
            Incompatible
        );
    }

    #[test]
    fn test_loose_policy_allows_compound_conversions() {
        let lattice = build_lattice([]).unwrap();
        let loose = ConversionPolicy::Loose;
        assert_eq!(
            lattice.distance_with(&prim(PrimitiveKind::Int), &named("java.lang.Number"), loose),
            WideningReference
        );
        assert_eq!(
            lattice.distance_with(&named("java.lang.Integer"), &prim(PrimitiveKind::Long), loose),
            Boxing
        );
        assert_eq!(
            lattice.distance_with(&prim(PrimitiveKind::Void), &TypeRef::root(), loose),
            Incompatible
        );
    }

    #[test]
    fn test_none_policy_keeps_reference_widening_only() {
        let lattice = build_lattice([]).unwrap();
        let none = ConversionPolicy::None;
        assert_eq!(
            lattice.distance_with(&prim(PrimitiveKind::Int), &prim(PrimitiveKind::Long), none),
            Incompatible
        );
        assert_eq!(
            lattice.distance_with(&prim(PrimitiveKind::Int), &named("java.lang.Integer"), none),
            Incompatible
        );
        assert_eq!(
            lattice.distance_with(&named("java.lang.Integer"), &named("java.lang.Number"), none),
            WideningReference
        );
    }

    #[test]
    fn test_array_covariance() {
        let lattice = collections();
        let lists = TypeRef::array(named("java.util.ArrayList"), 2);
        assert_eq!(
            lattice.distance(&lists, &TypeRef::array(named("java.util.List"), 2)),
            WideningReference
        );
        assert_eq!(
            lattice.distance(&lists, &TypeRef::array(named("java.util.List"), 1)),
            Incompatible
        );
        assert_eq!(lattice.distance(&lists, &TypeRef::root()), WideningReference);
        assert_eq!(
            lattice.distance(&lists, &named("java.io.Serializable")),
            WideningReference
        );
    }

    #[test]
    fn test_arrays_built_in_steps_are_identical() {
        let lattice = build_lattice([]).unwrap();
        let stepwise = TypeRef::array(named("java.lang.String").array_of(), 1);
        let flat = TypeRef::array(named("java.lang.String"), 2);
        assert_eq!(lattice.distance(&stepwise, &flat), Identity);
        assert_eq!(
            lattice.distance(&stepwise, &TypeRef::array(named("java.lang.CharSequence"), 2)),
            WideningReference
        );
    }

    #[test]
    fn test_primitive_arrays_are_invariant() {
        let lattice = build_lattice([]).unwrap();
        assert_eq!(
            lattice.distance(
                &prim(PrimitiveKind::Int).array_of(),
                &prim(PrimitiveKind::Long).array_of()
            ),
            Incompatible
        );
        assert_eq!(
            lattice.distance(
                &prim(PrimitiveKind::Int).array_of(),
                &named("java.lang.Integer").array_of()
            ),
            Incompatible
        );
    }

    #[test]
    fn test_unknown_parent_is_unresolved() {
        let err = build_lattice([TypeDecl::class("a.B").extends("a.Missing")]).unwrap_err();
        assert!(matches!(err, SigscopeError::UnresolvedType { name } if name == "a.Missing"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = build_lattice([
            TypeDecl::class("a.A").extends("a.B"),
            TypeDecl::class("a.B").extends("a.A"),
        ])
        .unwrap_err();
        assert!(matches!(err, SigscopeError::CyclicHierarchy { .. }));
    }

    #[test]
    fn test_discovered_declaration_replaces_seed() {
        let lattice = build_lattice([TypeDecl::class("java.lang.String").implements("java.lang.Comparable")])
            .unwrap();
        assert_eq!(
            lattice.distance(&named("java.lang.String"), &named("java.lang.CharSequence")),
            Incompatible
        );
    }

    #[test]
    fn test_check_resolved() {
        let lattice = build_lattice([]).unwrap();
        assert!(lattice.check_resolved(&prim(PrimitiveKind::Int).array_of()).is_ok());
        assert!(lattice.check_resolved(&named("x.Unknown").array_of()).is_err());
    }
}
