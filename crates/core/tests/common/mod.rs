//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use sigscope_api::{MemberKind, Modifier, PrimitiveKind, Signature, TypeDecl, TypeRef};
use sigscope_core::{TypeLattice, build_lattice};

pub fn int() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Int)
}

pub fn void() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Void)
}

pub fn long() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Long)
}

pub fn named(name: &str) -> TypeRef {
    TypeRef::named(name)
}

pub fn string() -> TypeRef {
    named("java.lang.String")
}

/// Builds a lattice and a candidate list with a fluent API.
#[derive(Default)]
pub struct Fixture {
    types: Vec<TypeDecl>,
    members: Vec<Signature>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small collections hierarchy on top of the built-in types.
    pub fn collections() -> Self {
        Self::new()
            .interface("java.lang.Iterable", &[])
            .interface("java.util.Collection", &["java.lang.Iterable"])
            .interface("java.util.List", &["java.util.Collection"])
            .class("java.util.AbstractList", None, &["java.util.List"])
            .class("java.util.ArrayList", Some("java.util.AbstractList"), &[])
            .class("java.util.LinkedList", Some("java.util.AbstractList"), &[])
    }

    pub fn class(mut self, name: &str, superclass: Option<&str>, interfaces: &[&str]) -> Self {
        let mut decl = TypeDecl::class(name);
        if let Some(superclass) = superclass {
            decl = decl.extends(superclass);
        }
        for interface in interfaces {
            decl = decl.implements(*interface);
        }
        self.types.push(decl);
        self
    }

    pub fn interface(mut self, name: &str, parents: &[&str]) -> Self {
        let mut decl = TypeDecl::interface(name);
        for parent in parents {
            decl = decl.implements(*parent);
        }
        self.types.push(decl);
        self
    }

    pub fn method(self, owner: &str, name: &str, ret: TypeRef, params: Vec<TypeRef>) -> Self {
        self.member(
            Signature::method(owner, name, ret)
                .modifier(Modifier::Public)
                .params(params)
                .build()
                .unwrap(),
        )
    }

    pub fn static_method(self, owner: &str, name: &str, ret: TypeRef, params: Vec<TypeRef>) -> Self {
        self.member(
            Signature::method(owner, name, ret)
                .modifiers([Modifier::Public, Modifier::Static])
                .params(params)
                .build()
                .unwrap(),
        )
    }

    pub fn varargs_method(self, owner: &str, name: &str, ret: TypeRef, params: Vec<TypeRef>) -> Self {
        self.member(
            Signature::method(owner, name, ret)
                .modifier(Modifier::Public)
                .params(params)
                .varargs(true)
                .build()
                .unwrap(),
        )
    }

    pub fn constructor(self, owner: &str, params: Vec<TypeRef>) -> Self {
        self.member(
            Signature::builder(MemberKind::Constructor, owner)
                .modifier(Modifier::Public)
                .params(params)
                .build()
                .unwrap(),
        )
    }

    pub fn field(self, owner: &str, name: &str, ty: TypeRef) -> Self {
        self.member(
            Signature::field(owner, name, ty)
                .modifiers([Modifier::Public, Modifier::Static, Modifier::Final])
                .build()
                .unwrap(),
        )
    }

    pub fn member(mut self, signature: Signature) -> Self {
        self.members.push(signature);
        self
    }

    pub fn build(self) -> (TypeLattice, Vec<Signature>) {
        let lattice = build_lattice(self.types).unwrap();
        (lattice, self.members)
    }
}

/// Effective names of the results, in rank order.
pub fn names(results: &[sigscope_core::MatchResult<'_>]) -> Vec<String> {
    results
        .iter()
        .map(|r| format!("{}.{}", r.candidate.declaring_type().simple_name(), r.candidate.effective_name()))
        .collect()
}
