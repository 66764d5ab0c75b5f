//! Conversion ranks and the fixed primitive tables.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sigscope_api::PrimitiveKind;
use std::fmt;
use std::str::FromStr;

/// How costly it is to use a value of one type where another is expected.
///
/// Variants are ordered from cheapest to most expensive; `Incompatible`
/// is absorbing when conversions are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionDistance {
    Identity,
    WideningPrimitive,
    Boxing,
    WideningReference,
    VarargsPack,
    Incompatible,
}

impl ConversionDistance {
    pub fn is_compatible(self) -> bool {
        self != ConversionDistance::Incompatible
    }

    /// Numeric cost used when distances are summed; `None` for `Incompatible`.
    pub fn rank(self) -> Option<u32> {
        match self {
            ConversionDistance::Identity => Some(0),
            ConversionDistance::WideningPrimitive => Some(1),
            ConversionDistance::Boxing => Some(2),
            ConversionDistance::WideningReference => Some(3),
            ConversionDistance::VarargsPack => Some(4),
            ConversionDistance::Incompatible => None,
        }
    }

    /// Distance of this conversion followed by `next`.
    pub fn then(self, next: ConversionDistance) -> ConversionDistance {
        self.max(next)
    }
}

impl fmt::Display for ConversionDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConversionDistance::Identity => "identity",
            ConversionDistance::WideningPrimitive => "widening primitive",
            ConversionDistance::Boxing => "boxing",
            ConversionDistance::WideningReference => "widening reference",
            ConversionDistance::VarargsPack => "varargs pack",
            ConversionDistance::Incompatible => "incompatible",
        })
    }
}

/// Which conversions beyond identity and reference widening are allowed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConversionPolicy {
    /// Identity and reference widening only.
    None,
    /// Single-step primitive widening, boxing and unboxing.
    #[default]
    Strict,
    /// Strict, plus box-then-widen and unbox-then-widen.
    Loose,
}

impl ConversionPolicy {
    pub fn allows_primitive_conversions(self) -> bool {
        self != ConversionPolicy::None
    }

    pub fn allows_compound(self) -> bool {
        self == ConversionPolicy::Loose
    }
}

impl FromStr for ConversionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(ConversionPolicy::None),
            "strict" => Ok(ConversionPolicy::Strict),
            "loose" | "all" => Ok(ConversionPolicy::Loose),
            other => Err(format!("unknown conversion policy `{}`", other)),
        }
    }
}

/// The widening primitive conversions of JLS 5.1.2.
pub fn widens_to(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        Boolean | Double | Void => false,
    }
}
