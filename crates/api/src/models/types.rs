//! Nominal type references and the declarations that give them a hierarchy.
//!
//! A [`TypeRef`] is only a name plus shape (primitive, array or named).
//! Supertype and interface edges live on [`TypeDecl`], which the lattice
//! consumes once at build time.

use crate::error::{ModelError, ModelResult};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::str::FromStr;

/// Qualified name of the type every reference type widens to.
pub const ROOT_TYPE: &str = "java.lang.Object";

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Void,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The reference type a value of this primitive boxes to.
    ///
    /// `void` has no boxing conversion.
    pub fn boxed_name(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Boolean => Some("java.lang.Boolean"),
            PrimitiveKind::Byte => Some("java.lang.Byte"),
            PrimitiveKind::Short => Some("java.lang.Short"),
            PrimitiveKind::Char => Some("java.lang.Character"),
            PrimitiveKind::Int => Some("java.lang.Integer"),
            PrimitiveKind::Long => Some("java.lang.Long"),
            PrimitiveKind::Float => Some("java.lang.Float"),
            PrimitiveKind::Double => Some("java.lang.Double"),
            PrimitiveKind::Void => None,
        }
    }

    /// Inverse of [`PrimitiveKind::boxed_name`].
    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.boxed_name() == Some(name))
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Boolean | PrimitiveKind::Void)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully qualified type name, e.g. `java.util.List`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TypeName(SmolStr);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(name.as_ref()))
    }

    pub fn root() -> Self {
        Self::new(ROOT_TYPE)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_root(&self) -> bool {
        self.as_str() == ROOT_TYPE
    }

    /// Last component of the name, treating `$` like `.` for nested types.
    pub fn simple_name(&self) -> &str {
        let s = self.as_str();
        match s.rfind(['.', '$']) {
            Some(idx) => &s[idx + 1..],
            None => s,
        }
    }

    /// Everything before the last `.`, or `""` for the unnamed package.
    pub fn package(&self) -> &str {
        let s = self.as_str();
        s.rfind('.').map(|idx| &s[..idx]).unwrap_or("")
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl JsonSchema for TypeName {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        "TypeName".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        String::json_schema(generator)
    }
}

/// A nominal type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Array(ArrayType),
    Named(TypeName),
}

/// An array shape, built only through [`TypeRef::array`].
///
/// The component is never itself an array; nesting is expressed through
/// `dimensions`, which is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayType {
    component: Box<TypeRef>,
    dimensions: usize,
}

impl ArrayType {
    pub fn component(&self) -> &TypeRef {
        &self.component
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl TypeRef {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }

    pub fn named(name: impl AsRef<str>) -> Self {
        TypeRef::Named(TypeName::new(name))
    }

    pub fn root() -> Self {
        TypeRef::Named(TypeName::root())
    }

    /// Wrap `component` in `dimensions` array levels.
    ///
    /// Zero dimensions returns the component unchanged; an array component
    /// has its dimensions merged.
    pub fn array(component: TypeRef, dimensions: usize) -> Self {
        if dimensions == 0 {
            return component;
        }
        match component {
            TypeRef::Array(inner) => TypeRef::Array(ArrayType {
                component: inner.component,
                dimensions: inner.dimensions + dimensions,
            }),
            other => TypeRef::Array(ArrayType {
                component: Box::new(other),
                dimensions,
            }),
        }
    }

    pub fn array_of(self) -> Self {
        TypeRef::array(self, 1)
    }

    /// The type with one array dimension removed, or `None` if not an array.
    pub fn element_type(&self) -> Option<TypeRef> {
        match self {
            TypeRef::Array(array) => Some(TypeRef::array(
                array.component().clone(),
                array.dimensions() - 1,
            )),
            _ => None,
        }
    }

    /// The innermost non-array type.
    pub fn base_type(&self) -> &TypeRef {
        match self {
            TypeRef::Array(array) => array.component(),
            other => other,
        }
    }

    /// The named type this reference mentions, if any (looking through arrays).
    pub fn named_leaf(&self) -> Option<&TypeName> {
        match self.base_type() {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(PrimitiveKind::Void))
    }

    /// True when `void` appears anywhere other than as a bare return type.
    pub fn contains_void(&self) -> bool {
        self.base_type().is_void()
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }
}

impl From<TypeName> for TypeRef {
    fn from(name: TypeName) -> Self {
        TypeRef::Named(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{}", kind),
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Array(array) => {
                write!(f, "{}", array.component())?;
                for _ in 0..array.dimensions() {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for TypeRef {
    type Err = ModelError;

    /// Parses `int`, `java.lang.String`, `byte[][]` and the like.
    fn from_str(s: &str) -> ModelResult<Self> {
        let mut base = s.trim();
        let mut dimensions = 0usize;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            dimensions += 1;
        }

        let component = match PrimitiveKind::from_name(base) {
            Some(kind) => TypeRef::Primitive(kind),
            None if is_qualified_identifier(base) => TypeRef::named(base),
            None => return Err(ModelError::InvalidType(s.to_string())),
        };
        Ok(TypeRef::array(component, dimensions))
    }
}

fn is_qualified_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
                }
                _ => false,
            }
        })
}

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for TypeRef {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        "TypeRef".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        String::json_schema(generator)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
}

/// One discovered type declaration and its direct parents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct TypeDecl {
    pub name: TypeName,
    #[serde(default)]
    pub kind: DeclKind,
    /// Direct supertypes in declaration order (normally a single superclass).
    #[serde(default)]
    pub supertypes: Vec<TypeName>,
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
}

impl TypeDecl {
    pub fn class(name: impl AsRef<str>) -> Self {
        Self {
            name: TypeName::new(name),
            kind: DeclKind::Class,
            supertypes: vec![],
            interfaces: vec![],
        }
    }

    pub fn interface(name: impl AsRef<str>) -> Self {
        Self {
            kind: DeclKind::Interface,
            ..Self::class(name)
        }
    }

    pub fn extends(mut self, supertype: impl AsRef<str>) -> Self {
        let supertype = TypeName::new(supertype);
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    pub fn implements(mut self, interface: impl AsRef<str>) -> Self {
        let interface = TypeName::new(interface);
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// Supertypes followed by interfaces.
    pub fn parents(&self) -> impl Iterator<Item = &TypeName> {
        self.supertypes.iter().chain(self.interfaces.iter())
    }
}
