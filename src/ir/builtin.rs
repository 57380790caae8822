use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a native builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeIdentifier {
    Array,
    Bool,
    Callable,
    False,
    Float,
    Int,
    Iterable,
    Mixed,
    Null,
    Object,
    Resource,
    String,
    True,
    Never,
    Void,
}

impl TypeIdentifier {
    pub const ALL: [TypeIdentifier; 15] = [
        TypeIdentifier::Array,
        TypeIdentifier::Bool,
        TypeIdentifier::Callable,
        TypeIdentifier::False,
        TypeIdentifier::Float,
        TypeIdentifier::Int,
        TypeIdentifier::Iterable,
        TypeIdentifier::Mixed,
        TypeIdentifier::Null,
        TypeIdentifier::Object,
        TypeIdentifier::Resource,
        TypeIdentifier::String,
        TypeIdentifier::True,
        TypeIdentifier::Never,
        TypeIdentifier::Void,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeIdentifier::Array => "array",
            TypeIdentifier::Bool => "bool",
            TypeIdentifier::Callable => "callable",
            TypeIdentifier::False => "false",
            TypeIdentifier::Float => "float",
            TypeIdentifier::Int => "int",
            TypeIdentifier::Iterable => "iterable",
            TypeIdentifier::Mixed => "mixed",
            TypeIdentifier::Null => "null",
            TypeIdentifier::Object => "object",
            TypeIdentifier::Resource => "resource",
            TypeIdentifier::String => "string",
            TypeIdentifier::True => "true",
            TypeIdentifier::Never => "never",
            TypeIdentifier::Void => "void",
        }
    }

    /// Exact (case-sensitive) lookup of a native identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// `mixed`, `never` and `void` cannot be combined with other types.
    pub fn is_standalone(self) -> bool {
        matches!(self, TypeIdentifier::Mixed | TypeIdentifier::Never | TypeIdentifier::Void)
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TypeIdentifier::String
                | TypeIdentifier::Float
                | TypeIdentifier::Int
                | TypeIdentifier::Bool
                | TypeIdentifier::False
                | TypeIdentifier::True
        )
    }

    pub fn is_bool(self) -> bool {
        matches!(self, TypeIdentifier::Bool | TypeIdentifier::False | TypeIdentifier::True)
    }

    pub fn is_collection(self) -> bool {
        matches!(self, TypeIdentifier::Array | TypeIdentifier::Iterable)
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary tag refining a builtin without changing its base kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubKind {
    PositiveInt,
    NegativeInt,
    NonPositiveInt,
    NonNegativeInt,
    NonZeroInt,
    /// `int<min, max>`; `None` stands for an open bound.
    RangeInt { min: Option<i64>, max: Option<i64> },
    ClassString,
    TraitString,
    InterfaceString,
    CallableString,
    NumericString,
    LowercaseString,
    NonEmptyLowercaseString,
    NonEmptyString,
    NonFalsyString,
    TruthyString,
    LiteralString,
    HtmlEscapedString,
    NeverReturn,
    NeverReturns,
    NoReturn,
}

impl SubKind {
    /// Keyword spelling of the sub-kind, paired with the builtin it refines.
    /// `range-int` has no keyword of its own and is never returned here.
    pub fn from_keyword(name: &str) -> Option<(TypeIdentifier, SubKind)> {
        let pair = match name {
            "positive-int" => (TypeIdentifier::Int, SubKind::PositiveInt),
            "negative-int" => (TypeIdentifier::Int, SubKind::NegativeInt),
            "non-positive-int" => (TypeIdentifier::Int, SubKind::NonPositiveInt),
            "non-negative-int" => (TypeIdentifier::Int, SubKind::NonNegativeInt),
            "non-zero-int" => (TypeIdentifier::Int, SubKind::NonZeroInt),
            "class-string" => (TypeIdentifier::String, SubKind::ClassString),
            "trait-string" => (TypeIdentifier::String, SubKind::TraitString),
            "interface-string" => (TypeIdentifier::String, SubKind::InterfaceString),
            "callable-string" => (TypeIdentifier::String, SubKind::CallableString),
            "numeric-string" => (TypeIdentifier::String, SubKind::NumericString),
            "lowercase-string" => (TypeIdentifier::String, SubKind::LowercaseString),
            "non-empty-lowercase-string" => (TypeIdentifier::String, SubKind::NonEmptyLowercaseString),
            "non-empty-string" => (TypeIdentifier::String, SubKind::NonEmptyString),
            "non-falsy-string" => (TypeIdentifier::String, SubKind::NonFalsyString),
            "truthy-string" => (TypeIdentifier::String, SubKind::TruthyString),
            "literal-string" => (TypeIdentifier::String, SubKind::LiteralString),
            "html-escaped-string" => (TypeIdentifier::String, SubKind::HtmlEscapedString),
            "never-return" => (TypeIdentifier::Never, SubKind::NeverReturn),
            "never-returns" => (TypeIdentifier::Never, SubKind::NeverReturns),
            "no-return" => (TypeIdentifier::Never, SubKind::NoReturn),
            _ => return None,
        };
        Some(pair)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SubKind::PositiveInt => "positive-int",
            SubKind::NegativeInt => "negative-int",
            SubKind::NonPositiveInt => "non-positive-int",
            SubKind::NonNegativeInt => "non-negative-int",
            SubKind::NonZeroInt => "non-zero-int",
            SubKind::RangeInt { .. } => "range-int",
            SubKind::ClassString => "class-string",
            SubKind::TraitString => "trait-string",
            SubKind::InterfaceString => "interface-string",
            SubKind::CallableString => "callable-string",
            SubKind::NumericString => "numeric-string",
            SubKind::LowercaseString => "lowercase-string",
            SubKind::NonEmptyLowercaseString => "non-empty-lowercase-string",
            SubKind::NonEmptyString => "non-empty-string",
            SubKind::NonFalsyString => "non-falsy-string",
            SubKind::TruthyString => "truthy-string",
            SubKind::LiteralString => "literal-string",
            SubKind::HtmlEscapedString => "html-escaped-string",
            SubKind::NeverReturn => "never-return",
            SubKind::NeverReturns => "never-returns",
            SubKind::NoReturn => "no-return",
        }
    }

    /// Builtin kind this sub-kind may refine.
    pub fn base(&self) -> TypeIdentifier {
        match self {
            SubKind::PositiveInt
            | SubKind::NegativeInt
            | SubKind::NonPositiveInt
            | SubKind::NonNegativeInt
            | SubKind::NonZeroInt
            | SubKind::RangeInt { .. } => TypeIdentifier::Int,
            SubKind::NeverReturn | SubKind::NeverReturns | SubKind::NoReturn => TypeIdentifier::Never,
            _ => TypeIdentifier::String,
        }
    }
}

impl fmt::Display for SubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubKind::RangeInt { min, max } => {
                let bound = |b: &Option<i64>, open: &str| b.map_or_else(|| open.to_string(), |v| v.to_string());
                write!(f, "int<{},{}>", bound(min, "min"), bound(max, "max"))
            }
            other => f.write_str(other.keyword()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuiltinType {
    pub(crate) kind: TypeIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sub_kind: Option<SubKind>,
}

impl BuiltinType {
    pub fn kind(&self) -> TypeIdentifier {
        self.kind
    }

    pub fn sub_kind(&self) -> Option<&SubKind> {
        self.sub_kind.as_ref()
    }

    /// Builtins that already accept `null`.
    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeIdentifier::Null | TypeIdentifier::Mixed)
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_kind {
            Some(sub) => write!(f, "{sub}"),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_names() {
        for id in TypeIdentifier::ALL {
            assert_eq!(TypeIdentifier::from_name(id.as_str()), Some(id));
        }
        assert_eq!(TypeIdentifier::from_name("Int"), None);
        assert_eq!(TypeIdentifier::from_name("integer"), None);
    }

    #[test]
    fn standalone_and_scalar_sets() {
        assert!(TypeIdentifier::Mixed.is_standalone());
        assert!(TypeIdentifier::Void.is_standalone());
        assert!(!TypeIdentifier::Null.is_standalone());
        assert!(TypeIdentifier::False.is_scalar());
        assert!(!TypeIdentifier::Array.is_scalar());
        assert!(TypeIdentifier::True.is_bool());
    }

    #[test]
    fn sub_kind_keywords_refine_their_base() {
        let (base, sub) = SubKind::from_keyword("non-empty-lowercase-string").unwrap();
        assert_eq!(base, TypeIdentifier::String);
        assert_eq!(sub.base(), base);
        assert_eq!(sub.keyword(), "non-empty-lowercase-string");
        assert!(SubKind::from_keyword("range-int").is_none());
        assert_eq!(SubKind::from_keyword("no-return").unwrap().0, TypeIdentifier::Never);
    }

    #[test]
    fn range_renders_open_bounds() {
        assert_eq!(SubKind::RangeInt { min: Some(0), max: Some(100) }.to_string(), "int<0,100>");
        assert_eq!(SubKind::RangeInt { min: None, max: Some(-1) }.to_string(), "int<min,-1>");
    }
}
