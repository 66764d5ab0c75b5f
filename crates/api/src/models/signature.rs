use super::types::{TypeName, TypeRef};
use crate::error::{ModelError, ModelResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Constructor,
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Field => "field",
        })
    }
}

/// Declaration modifiers.
///
/// Variants are declared in the order they are rendered, so a
/// `BTreeSet<Modifier>` iterates in canonical source order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Default,
    Static,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
    Deprecated,
    Synthetic,
}

impl Modifier {
    pub const ALL: [Modifier; 14] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Abstract,
        Modifier::Default,
        Modifier::Static,
        Modifier::Final,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Strictfp,
        Modifier::Deprecated,
        Modifier::Synthetic,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Default => "default",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Deprecated => "@Deprecated",
            Modifier::Synthetic => "synthetic",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('@').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.keyword().trim_start_matches('@').eq_ignore_ascii_case(&s))
    }

    /// Modifiers that push a candidate down the ranking when the query
    /// does not mention them.
    pub fn is_surprising(self) -> bool {
        matches!(self, Modifier::Deprecated | Modifier::Synthetic)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Access levels, declared in order of increasing visibility.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Accessibility {
    pub fn from_modifiers(modifiers: &BTreeSet<Modifier>) -> Self {
        if modifiers.contains(&Modifier::Private) {
            Accessibility::Private
        } else if modifiers.contains(&Modifier::Protected) {
            Accessibility::Protected
        } else if modifiers.contains(&Modifier::Public) {
            Accessibility::Public
        } else {
            Accessibility::Package
        }
    }

    pub fn is_at_least(self, other: Accessibility) -> bool {
        self >= other
    }
}

/// Immutable descriptor of one discovered member.
///
/// Built through [`SignatureBuilder`], which rejects shapes that cannot
/// exist (a field with parameters, a constructor with a return type, ...).
/// Thrown types are held in a set so equality ignores declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    kind: MemberKind,
    declaring_type: TypeName,
    name: Option<String>,
    modifiers: BTreeSet<Modifier>,
    return_type: Option<TypeRef>,
    parameter_types: Vec<TypeRef>,
    is_variable_arity: bool,
    thrown_types: BTreeSet<TypeRef>,
    canonical: String,
}

impl Signature {
    pub fn builder(kind: MemberKind, declaring_type: impl AsRef<str>) -> SignatureBuilder {
        SignatureBuilder::new(kind, declaring_type)
    }

    pub fn method(
        declaring_type: impl AsRef<str>,
        name: impl Into<String>,
        return_type: TypeRef,
    ) -> SignatureBuilder {
        Self::builder(MemberKind::Method, declaring_type)
            .name(name)
            .returns(return_type)
    }

    pub fn constructor(declaring_type: impl AsRef<str>) -> SignatureBuilder {
        Self::builder(MemberKind::Constructor, declaring_type)
    }

    pub fn field(
        declaring_type: impl AsRef<str>,
        name: impl Into<String>,
        field_type: TypeRef,
    ) -> SignatureBuilder {
        Self::builder(MemberKind::Field, declaring_type)
            .name(name)
            .returns(field_type)
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    /// Declared name; `None` for constructors.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used for pattern matching: constructors answer to the simple
    /// name of the type they construct.
    pub fn effective_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.declaring_type.simple_name(),
        }
    }

    pub fn modifiers(&self) -> &BTreeSet<Modifier> {
        &self.modifiers
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn accessibility(&self) -> Accessibility {
        Accessibility::from_modifiers(&self.modifiers)
    }

    /// Declared return type; a field's declared type; `None` for constructors.
    pub fn return_type(&self) -> Option<&TypeRef> {
        self.return_type.as_ref()
    }

    /// The type of value the member produces. A constructor produces its
    /// declaring type.
    pub fn effective_return_type(&self) -> TypeRef {
        match &self.return_type {
            Some(ty) => ty.clone(),
            None => TypeRef::Named(self.declaring_type.clone()),
        }
    }

    pub fn parameter_types(&self) -> &[TypeRef] {
        &self.parameter_types
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Parameters before the variable-arity tail.
    pub fn fixed_arity(&self) -> usize {
        if self.is_variable_arity {
            self.parameter_types.len() - 1
        } else {
            self.parameter_types.len()
        }
    }

    pub fn is_variable_arity(&self) -> bool {
        self.is_variable_arity
    }

    pub fn thrown_types(&self) -> &BTreeSet<TypeRef> {
        &self.thrown_types
    }

    /// Every type the signature mentions, declaring type first.
    pub fn referenced_types(&self) -> impl Iterator<Item = &TypeName> {
        std::iter::once(&self.declaring_type).chain(
            self.return_type
                .iter()
                .chain(self.parameter_types.iter())
                .chain(self.thrown_types.iter())
                .filter_map(TypeRef::named_leaf),
        )
    }

    /// Stable textual form, e.g.
    /// `public static int java.lang.Integer.parseInt(java.lang.String) throws java.lang.NumberFormatException`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    kind: MemberKind,
    declaring_type: TypeName,
    name: Option<String>,
    modifiers: BTreeSet<Modifier>,
    return_type: Option<TypeRef>,
    parameter_types: Vec<TypeRef>,
    is_variable_arity: bool,
    thrown_types: BTreeSet<TypeRef>,
}

impl SignatureBuilder {
    pub fn new(kind: MemberKind, declaring_type: impl AsRef<str>) -> Self {
        Self {
            kind,
            declaring_type: TypeName::new(declaring_type),
            name: None,
            modifiers: BTreeSet::new(),
            return_type: None,
            parameter_types: Vec::new(),
            is_variable_arity: false,
            thrown_types: BTreeSet::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn returns(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.parameter_types.push(ty);
        self
    }

    pub fn params(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.parameter_types.extend(types);
        self
    }

    /// Marks the last parameter as variable-arity. It must be an array type.
    pub fn varargs(mut self, is_variable_arity: bool) -> Self {
        self.is_variable_arity = is_variable_arity;
        self
    }

    pub fn throws(mut self, ty: TypeRef) -> Self {
        self.thrown_types.insert(ty);
        self
    }

    pub fn build(self) -> ModelResult<Signature> {
        let canonical = render_canonical(&self);
        let fail = |reason: &str| Err(ModelError::malformed(canonical.clone(), reason));

        match self.kind {
            MemberKind::Field => {
                if !self.parameter_types.is_empty() {
                    return fail("a field cannot declare parameters");
                }
                if self.is_variable_arity {
                    return fail("a field cannot be variable-arity");
                }
                if self.return_type.is_none() {
                    return fail("a field must declare its type");
                }
            }
            MemberKind::Constructor => {
                if self.return_type.is_some() {
                    return fail("a constructor cannot declare a return type");
                }
            }
            MemberKind::Method => {
                if self.return_type.is_none() {
                    return fail("a method must declare a return type (use void)");
                }
            }
        }

        if self.kind != MemberKind::Constructor
            && self.name.as_deref().is_none_or(|n| n.trim().is_empty())
        {
            return fail("missing member name");
        }

        if self.is_variable_arity && !self.parameter_types.last().is_some_and(TypeRef::is_array) {
            return fail("the variable-arity parameter must be an array type");
        }

        if let Some(ret) = &self.return_type {
            let void_allowed = self.kind == MemberKind::Method;
            if ret.contains_void() && !(void_allowed && ret.is_void()) {
                return fail("void is only valid as a method return type");
            }
        }
        if self.parameter_types.iter().any(TypeRef::contains_void) {
            return fail("void is not a valid parameter type");
        }
        if self.thrown_types.iter().any(|t| t.as_named().is_none()) {
            return fail("thrown types must be named reference types");
        }

        let name = match self.kind {
            MemberKind::Constructor => None,
            _ => self.name,
        };

        Ok(Signature {
            kind: self.kind,
            declaring_type: self.declaring_type,
            name,
            modifiers: self.modifiers,
            return_type: self.return_type,
            parameter_types: self.parameter_types,
            is_variable_arity: self.is_variable_arity,
            thrown_types: self.thrown_types,
            canonical,
        })
    }
}

fn render_canonical(b: &SignatureBuilder) -> String {
    let mut out = String::new();
    for modifier in &b.modifiers {
        out.push_str(modifier.keyword());
        out.push(' ');
    }

    if b.kind != MemberKind::Constructor {
        if let Some(ret) = &b.return_type {
            out.push_str(&ret.to_string());
            out.push(' ');
        }
    }

    out.push_str(b.declaring_type.as_str());
    if b.kind != MemberKind::Constructor {
        out.push('.');
        out.push_str(b.name.as_deref().unwrap_or("?"));
    }

    if b.kind == MemberKind::Field {
        return out;
    }

    out.push('(');
    let last = b.parameter_types.len().saturating_sub(1);
    for (i, param) in b.parameter_types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match param.element_type() {
            Some(element) if b.is_variable_arity && i == last => {
                out.push_str(&element.to_string());
                out.push_str("...");
            }
            _ => out.push_str(&param.to_string()),
        }
    }
    out.push(')');

    if !b.thrown_types.is_empty() {
        out.push_str(" throws ");
        let thrown: Vec<String> = b.thrown_types.iter().map(ToString::to_string).collect();
        out.push_str(&thrown.join(", "));
    }

    out
}
