use super::signature::{Accessibility, MemberKind, Modifier};
use super::types::{TypeName, TypeRef};
use crate::error::{ModelError, ModelResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Pattern over member names.
///
/// `*` matches any run of characters and `?` a single one. Common shapes get
/// their own variants so the regex engine is only involved for the rest.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Literal(String),
    Any,
    Prefix(String),
    Suffix(String),
    Contains(String),
    Glob { source: String, regex: Regex },
}

impl NamePattern {
    pub fn literal(name: impl Into<String>) -> Self {
        NamePattern::Literal(name.into())
    }

    pub fn parse(pattern: &str) -> ModelResult<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ModelError::InvalidPattern("empty name pattern".to_string()));
        }
        if !pattern.contains(['*', '?']) {
            return Ok(NamePattern::Literal(pattern.to_string()));
        }
        if pattern.chars().all(|c| c == '*') {
            return Ok(NamePattern::Any);
        }

        let inner = pattern.trim_matches('*');
        if !inner.contains(['*', '?']) {
            let leading = pattern.starts_with('*');
            let trailing = pattern.ends_with('*');
            return Ok(match (leading, trailing) {
                (true, true) => NamePattern::Contains(inner.to_string()),
                (true, false) => NamePattern::Suffix(inner.to_string()),
                _ => NamePattern::Prefix(inner.to_string()),
            });
        }

        let mut expr = String::from("^");
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr)
            .map_err(|e| ModelError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        Ok(NamePattern::Glob {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Literal(literal) => literal == name,
            NamePattern::Any => true,
            NamePattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
            NamePattern::Suffix(suffix) => name.ends_with(suffix.as_str()),
            NamePattern::Contains(needle) => name.contains(needle.as_str()),
            NamePattern::Glob { regex, .. } => regex.is_match(name),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, NamePattern::Literal(_))
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Literal(s) => f.write_str(s),
            NamePattern::Any => f.write_str("*"),
            NamePattern::Prefix(s) => write!(f, "{}*", s),
            NamePattern::Suffix(s) => write!(f, "*{}", s),
            NamePattern::Contains(s) => write!(f, "*{}*", s),
            NamePattern::Glob { source, .. } => f.write_str(source),
        }
    }
}

// Regex has no structural equality; patterns compare by their source text.
impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for NamePattern {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierFilter {
    pub required: BTreeSet<Modifier>,
    pub forbidden: BTreeSet<Modifier>,
}

impl ModifierFilter {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    /// True when the query says anything about `modifier`.
    pub fn mentions(&self, modifier: Modifier) -> bool {
        self.required.contains(&modifier) || self.forbidden.contains(&modifier)
    }

    pub fn admits(&self, modifiers: &BTreeSet<Modifier>) -> bool {
        self.required.is_subset(modifiers) && self.forbidden.is_disjoint(modifiers)
    }
}

/// A member description in which every field may be left open.
///
/// `Query::default()` is the empty query: it matches every candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub kind: Option<MemberKind>,
    pub declaring_type: Option<TypeRef>,
    pub name: Option<NamePattern>,
    pub modifiers: ModifierFilter,
    pub min_access: Option<Accessibility>,
    pub return_type: Option<TypeRef>,
    pub parameter_types: Option<Vec<TypeRef>>,
    pub is_variable_arity: Option<bool>,
    /// Recorded for display; never used to accept or reject a candidate.
    pub thrown_types: Option<BTreeSet<TypeRef>>,
    pub permute_parameters: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: MemberKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn declared_in(mut self, ty: TypeRef) -> Self {
        self.declaring_type = Some(ty);
        self
    }

    pub fn named(mut self, pattern: NamePattern) -> Self {
        self.name = Some(pattern);
        self
    }

    pub fn require(mut self, modifier: Modifier) -> Self {
        self.modifiers.required.insert(modifier);
        self
    }

    pub fn forbid(mut self, modifier: Modifier) -> Self {
        self.modifiers.forbidden.insert(modifier);
        self
    }

    pub fn at_least(mut self, access: Accessibility) -> Self {
        self.min_access = Some(access);
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Constrains the parameter list. An empty vector means "no parameters",
    /// which differs from leaving parameters unconstrained.
    pub fn params(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.parameter_types = Some(types.into_iter().collect());
        self
    }

    pub fn variable_arity(mut self, is_variable_arity: bool) -> Self {
        self.is_variable_arity = Some(is_variable_arity);
        self
    }

    pub fn throws(mut self, ty: TypeRef) -> Self {
        self.thrown_types.get_or_insert_with(BTreeSet::new).insert(ty);
        self
    }

    pub fn permuted(mut self, permute: bool) -> Self {
        self.permute_parameters = permute;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Query::default()
    }

    /// Every named type the query mentions.
    pub fn referenced_types(&self) -> impl Iterator<Item = &TypeName> {
        self.declaring_type
            .iter()
            .chain(self.return_type.iter())
            .chain(self.parameter_types.iter().flatten())
            .chain(self.thrown_types.iter().flatten())
            .filter_map(TypeRef::named_leaf)
    }
}
