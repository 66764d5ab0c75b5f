//! A fixed registry of types and members read from JSON.
//!
//! ```json
//! { "types":   [{ "name": "demo.Circle", "supertypes": ["demo.Shape"] }],
//!   "members": [{ "kind": "method", "declaring_type": "demo.Circle",
//!                 "name": "scale", "return_type": "demo.Circle",
//!                 "parameters": ["double..."] }] }
//! ```

use crate::error::Result;
use crate::lattice::{TypeLattice, build_lattice};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sigscope_api::{MemberKind, ModelError, ModelResult, Modifier, Signature, TypeDecl, TypeRef};
use std::path::Path;

const VARARGS_SUFFIX: &str = "...";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct CatalogDocument {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

/// One member as written in a catalog file. Types are in source syntax;
/// a trailing `...` on the last parameter declares a variable-arity tail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct MemberEntry {
    pub kind: MemberKind,
    pub declaring_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub throws: Vec<String>,
}

impl MemberEntry {
    pub fn to_signature(&self) -> ModelResult<Signature> {
        let mut builder = Signature::builder(self.kind, self.declaring_type.trim())
            .modifiers(self.modifiers.iter().copied());
        if let Some(name) = &self.name {
            builder = builder.name(name.trim());
        }
        if let Some(ret) = &self.return_type {
            builder = builder.returns(ret.parse()?);
        }

        let last = self.parameters.len().saturating_sub(1);
        for (i, text) in self.parameters.iter().enumerate() {
            let text = text.trim();
            match text.strip_suffix(VARARGS_SUFFIX) {
                Some(element) if i == last => {
                    let element: TypeRef = element.parse()?;
                    builder = builder.param(element.array_of()).varargs(true);
                }
                Some(_) => {
                    return Err(ModelError::InvalidType(format!(
                        "{} (only the last parameter may be variable-arity)",
                        text
                    )));
                }
                None => builder = builder.param(text.parse()?),
            }
        }

        for thrown in &self.throws {
            builder = builder.throws(thrown.parse()?);
        }
        builder.build()
    }
}

/// A member entry that could not be turned into a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMember {
    pub index: usize,
    pub reason: ModelError,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: Vec<TypeDecl>,
    signatures: Vec<Signature>,
    skipped: Vec<SkippedMember>,
}

impl Catalog {
    pub fn from_document(document: CatalogDocument) -> Self {
        let mut signatures = Vec::with_capacity(document.members.len());
        let mut skipped = Vec::new();
        for (index, entry) in document.members.iter().enumerate() {
            match entry.to_signature() {
                Ok(signature) => signatures.push(signature),
                Err(reason) => {
                    tracing::warn!("skipping catalog member #{}: {}", index, reason);
                    skipped.push(SkippedMember { index, reason });
                }
            }
        }

        tracing::debug!(
            types = document.types.len(),
            members = signatures.len(),
            skipped = skipped.len(),
            "catalog loaded"
        );
        Self {
            types: document.types,
            signatures,
            skipped,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn skipped(&self) -> &[SkippedMember] {
        &self.skipped
    }

    pub fn build_lattice(&self) -> Result<TypeLattice> {
        build_lattice(self.types.iter().cloned())
    }

    /// JSON schema of the catalog file format.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(CatalogDocument)
    }
}
