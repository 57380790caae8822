//! Type Value Model.
//!
//! A closed set of immutable variants compared structurally. Instances are
//! built through the normalizing factories in [`crate::norm`] (or the checked
//! constructors of the variant structs) and never mutated afterwards.
pub mod builtin;
pub mod collection;
pub mod object;

use std::fmt;

use serde::Serialize;

pub use builtin::{BuiltinType, SubKind, TypeIdentifier};
pub use collection::{CollectionType, GenericType};
pub use object::{BackedEnumType, EnumType, ObjectType, TemplateType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Builtin(BuiltinType),
    /// Never wraps another nullable nor `mixed`.
    Nullable(Box<Type>),
    /// At least two members, flattened and deduplicated.
    Union(Vec<Type>),
    /// At least two members, flattened and deduplicated.
    Intersection(Vec<Type>),
    Object(ObjectType),
    Enum(EnumType),
    BackedEnum(BackedEnumType),
    Collection(CollectionType),
    Generic(GenericType),
    Template(TemplateType),
}

impl Type {
    pub fn as_builtin(&self) -> Option<&BuiltinType> {
        match self {
            Type::Builtin(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_builtin(&self, kind: TypeIdentifier) -> bool {
        matches!(self, Type::Builtin(b) if b.kind == kind)
    }

    /// Class name of object-like types.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Object(o) => Some(&o.class_name),
            Type::Enum(e) => Some(&e.class_name),
            Type::BackedEnum(e) => Some(&e.class_name),
            _ => None,
        }
    }

    /// Whether this type (or, for wrappers, what it wraps) carries one of
    /// the given native identifiers.
    pub fn is_identified_by(&self, identifiers: &[TypeIdentifier]) -> bool {
        match self {
            Type::Builtin(b) => identifiers.contains(&b.kind),
            Type::Object(_) | Type::Enum(_) | Type::BackedEnum(_) => identifiers.contains(&TypeIdentifier::Object),
            Type::Nullable(inner) => {
                identifiers.contains(&TypeIdentifier::Null) || inner.is_identified_by(identifiers)
            }
            Type::Union(members) | Type::Intersection(members) => {
                members.iter().any(|m| m.is_identified_by(identifiers))
            }
            Type::Collection(c) => c.wrapped.is_identified_by(identifiers),
            Type::Generic(g) => g.wrapped.is_identified_by(identifiers),
            Type::Template(t) => t.bound.is_identified_by(identifiers),
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Builtin(b) => b.is_nullable(),
            Type::Nullable(_) => true,
            Type::Union(members) => members.iter().any(Type::is_nullable),
            _ => false,
        }
    }

    /// Unions are satisfied by any member, intersections by all of them.
    pub fn is_satisfied_by(&self, specification: &dyn Fn(&Type) -> bool) -> bool {
        match self {
            Type::Union(members) => members.iter().any(|m| m.is_satisfied_by(specification)),
            Type::Intersection(members) => members.iter().all(|m| m.is_satisfied_by(specification)),
            _ => specification(self),
        }
    }

    /// Type held by a wrapping variant.
    pub fn wrapped(&self) -> Option<&Type> {
        match self {
            Type::Nullable(inner) => Some(inner),
            Type::Collection(c) => Some(&c.wrapped),
            Type::Generic(g) => Some(&g.wrapped),
            Type::Template(t) => Some(&t.bound),
            _ => None,
        }
    }

    pub fn wrapped_type_is_satisfied_by(&self, specification: &dyn Fn(&Type) -> bool) -> bool {
        self.wrapped().is_some_and(|w| w.is_satisfied_by(specification))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Builtin(b) => write!(f, "{b}"),
            Type::Nullable(inner) => match inner.as_ref() {
                Type::Union(_) | Type::Intersection(_) => write!(f, "?({inner})"),
                _ => write!(f, "?{inner}"),
            },
            Type::Union(members) => join(f, members, "|", |m| matches!(m, Type::Intersection(_))),
            Type::Intersection(members) => join(f, members, "&", |m| matches!(m, Type::Union(_))),
            Type::Object(o) => f.write_str(&o.class_name),
            Type::Enum(e) => f.write_str(&e.class_name),
            Type::BackedEnum(e) => f.write_str(&e.class_name),
            Type::Generic(g) => {
                write!(f, "{}<", g.wrapped)?;
                for (i, t) in g.variable_types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{t}")?;
                }
                f.write_str(">")
            }
            Type::Collection(c) => {
                if c.is_list && c.base().is_builtin(TypeIdentifier::Array) {
                    write!(f, "list<{}>", c.value_type())
                } else {
                    write!(f, "{}", c.wrapped)
                }
            }
            Type::Template(t) => f.write_str(&t.name),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, members: &[Type], glue: &str, needs_parens: fn(&Type) -> bool) -> fmt::Result {
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(glue)?;
        }
        if needs_parens(m) {
            write!(f, "({m})")?;
        } else {
            write!(f, "{m}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_composites() {
        let dnf = Type::union([
            Type::int(),
            Type::intersection([Type::object_of("A"), Type::object_of("B")]).unwrap(),
        ])
        .unwrap();
        assert_eq!(dnf.to_string(), "int|(A&B)");
        assert_eq!(Type::nullable(Type::int()).unwrap().to_string(), "?int");
        assert_eq!(
            Type::nullable(Type::union([Type::int(), Type::string()]).unwrap()).unwrap().to_string(),
            "?(int|string)"
        );
        assert_eq!(Type::list_of(Type::bool()).to_string(), "list<bool>");
        assert_eq!(Type::dict_of(Type::bool()).to_string(), "array<string,bool>");
        assert_eq!(Type::array().to_string(), "array");
        assert_eq!(Type::iterable().to_string(), "iterable");
        assert_eq!(Type::refined(TypeIdentifier::Int, SubKind::PositiveInt).unwrap().to_string(), "positive-int");
    }

    #[test]
    fn identified_by_looks_through_wrappers() {
        assert!(Type::array().is_identified_by(&[TypeIdentifier::Array]));
        assert!(Type::list().is_identified_by(&[TypeIdentifier::Array]));
        assert!(Type::object_of("A").is_identified_by(&[TypeIdentifier::Object]));
        assert!(Type::nullable(Type::int()).unwrap().is_identified_by(&[TypeIdentifier::Null]));
        assert!(!Type::string().is_identified_by(&[TypeIdentifier::Int, TypeIdentifier::Float]));
    }

    #[test]
    fn nullable_detection() {
        assert!(Type::null().is_nullable());
        assert!(Type::mixed().is_nullable());
        assert!(Type::union([Type::int(), Type::null()]).unwrap().is_nullable());
        assert!(!Type::int().is_nullable());
    }

    #[test]
    fn satisfaction() {
        let is_int = |t: &Type| t.is_builtin(TypeIdentifier::Int);
        assert!(Type::union([Type::int(), Type::string()]).unwrap().is_satisfied_by(&is_int));
        assert!(!Type::intersection([Type::object_of("A"), Type::object_of("B")]).unwrap().is_satisfied_by(&is_int));

        let is_array = |t: &Type| t.to_string() == "array";
        assert!(Type::array().wrapped_type_is_satisfied_by(&is_array));
        assert!(!Type::iterable().wrapped_type_is_satisfied_by(&is_array));
        assert!(!Type::int().wrapped_type_is_satisfied_by(&is_array));
    }

    #[test]
    fn serializes_as_tagged_json() {
        let value = serde_json::to_value(Type::nullable(Type::int()).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "nullable": { "builtin": { "kind": "int" } } }));
    }
}
