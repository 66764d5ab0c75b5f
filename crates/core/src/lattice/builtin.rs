//! `java.lang` declarations every lattice knows about.
//!
//! Discovered declarations with the same name replace these.

use sigscope_api::{PrimitiveKind, ROOT_TYPE, TypeDecl};

pub const CLONEABLE: &str = "java.lang.Cloneable";
pub const SERIALIZABLE: &str = "java.io.Serializable";
const COMPARABLE: &str = "java.lang.Comparable";
const CHAR_SEQUENCE: &str = "java.lang.CharSequence";
const NUMBER: &str = "java.lang.Number";

pub fn builtin_decls() -> Vec<TypeDecl> {
    let mut decls = vec![
        TypeDecl::class(ROOT_TYPE),
        TypeDecl::interface(SERIALIZABLE),
        TypeDecl::interface(CLONEABLE),
        TypeDecl::interface(COMPARABLE),
        TypeDecl::interface(CHAR_SEQUENCE),
        TypeDecl::class(NUMBER).implements(SERIALIZABLE),
        TypeDecl::class("java.lang.String")
            .implements(SERIALIZABLE)
            .implements(COMPARABLE)
            .implements(CHAR_SEQUENCE),
    ];

    for kind in PrimitiveKind::ALL {
        let Some(boxed) = kind.boxed_name() else {
            continue;
        };
        let decl = if kind.is_numeric() && kind != PrimitiveKind::Char {
            TypeDecl::class(boxed).extends(NUMBER)
        } else {
            TypeDecl::class(boxed).implements(SERIALIZABLE)
        };
        decls.push(decl.implements(COMPARABLE));
    }

    decls
}
