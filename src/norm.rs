//! Normalizing factories for the Type Value Model.
//!
//! Every factory is pure: equal inputs give structurally equal outputs.
//! Composite factories normalize eagerly:
//! - unions flatten, deduplicate (first occurrence wins) and collapse to
//!   `mixed` as soon as one member is `mixed`;
//! - intersections flatten and deduplicate, keeping order;
//! - `nullable` never nests and strips an explicit `null` union member.

use crate::error::{Error, Result};
use crate::ir::{
    BackedEnumType, BuiltinType, CollectionType, EnumType, GenericType, ObjectType, SubKind, TemplateType, Type,
    TypeIdentifier,
};

/// Optional arguments of the collection factories.
///
/// Defaults: no value type (`mixed` once a generic is needed), no key type
/// (`int|string` once a generic is needed), not a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionArgs {
    pub value: Option<Type>,
    pub key: Option<Type>,
    pub is_list: bool,
}

impl CollectionArgs {
    pub fn value(mut self, value: Type) -> Self {
        self.value = Some(value);
        self
    }

    pub fn key(mut self, key: Type) -> Self {
        self.key = Some(key);
        self
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }
}

impl Type {
    // -------------------------------- builtins ---------------------------- //

    pub fn builtin(kind: TypeIdentifier) -> Type {
        Type::Builtin(BuiltinType { kind, sub_kind: None })
    }

    /// Builtin tagged with a sub-kind; the sub-kind must refine `kind`.
    pub fn refined(kind: TypeIdentifier, sub_kind: SubKind) -> Result<Type> {
        if sub_kind.base() != kind {
            return Err(Error::invalid(format!("\"{}\" cannot refine \"{kind}\".", sub_kind.keyword())));
        }
        Ok(Type::Builtin(BuiltinType { kind, sub_kind: Some(sub_kind) }))
    }

    pub fn int() -> Type {
        Type::builtin(TypeIdentifier::Int)
    }

    pub fn float() -> Type {
        Type::builtin(TypeIdentifier::Float)
    }

    pub fn string() -> Type {
        Type::builtin(TypeIdentifier::String)
    }

    pub fn bool() -> Type {
        Type::builtin(TypeIdentifier::Bool)
    }

    pub fn resource() -> Type {
        Type::builtin(TypeIdentifier::Resource)
    }

    pub fn false_() -> Type {
        Type::builtin(TypeIdentifier::False)
    }

    pub fn true_() -> Type {
        Type::builtin(TypeIdentifier::True)
    }

    pub fn callable() -> Type {
        Type::builtin(TypeIdentifier::Callable)
    }

    pub fn null() -> Type {
        Type::builtin(TypeIdentifier::Null)
    }

    pub fn mixed() -> Type {
        Type::builtin(TypeIdentifier::Mixed)
    }

    pub fn void() -> Type {
        Type::builtin(TypeIdentifier::Void)
    }

    pub fn never() -> Type {
        Type::builtin(TypeIdentifier::Never)
    }

    /// The `object` builtin, for any instance.
    pub fn object() -> Type {
        Type::builtin(TypeIdentifier::Object)
    }

    /// `int|string`, the default collection key.
    pub fn array_key() -> Type {
        Type::Union(vec![Type::int(), Type::string()])
    }

    // --------------------------------- classes ---------------------------- //

    pub fn object_of(class_name: impl Into<String>) -> Type {
        Type::Object(ObjectType { class_name: class_name.into() })
    }

    pub fn enum_of(class_name: impl Into<String>) -> Type {
        Type::Enum(EnumType { class_name: class_name.into() })
    }

    /// Enum, backed when a backing type is given.
    pub fn enumeration(class_name: impl Into<String>, backing: Option<Type>) -> Result<Type> {
        match backing {
            None => Ok(Type::enum_of(class_name)),
            Some(Type::Builtin(b)) => Ok(Type::BackedEnum(BackedEnumType::new(class_name, b)?)),
            Some(other) => Err(Error::invalid(format!("Cannot create a backed enum with \"{other}\" backing type."))),
        }
    }

    pub fn template(name: impl Into<String>) -> Type {
        Type::template_bounded(name, Type::mixed())
    }

    pub fn template_bounded(name: impl Into<String>, bound: Type) -> Type {
        Type::Template(TemplateType { name: name.into(), bound: Box::new(bound) })
    }

    // ------------------------------- collections -------------------------- //

    pub fn generic(wrapped: Type, variable_types: impl IntoIterator<Item = Type>) -> Result<Type> {
        Ok(Type::Generic(GenericType::new(wrapped, variable_types.into_iter().collect())?))
    }

    /// Builds the generic/collection pair. A generic layer is added when a
    /// key or value is given; a `wrapped` that is generic already carries its
    /// own and cannot take more.
    pub fn collection(wrapped: Type, args: CollectionArgs) -> Result<Type> {
        let has_args = args.value.is_some() || args.key.is_some();
        let wrapped = match wrapped {
            Type::Generic(_) if has_args => {
                return Err(Error::invalid(format!(
                    "Cannot pass key or value types to the already generic \"{wrapped}\"."
                )));
            }
            Type::Generic(_) => wrapped,
            _ if has_args => Type::generic(
                wrapped,
                [args.key.unwrap_or_else(Type::array_key), args.value.unwrap_or_else(Type::mixed)],
            )?,
            _ => wrapped,
        };
        Ok(Type::Collection(CollectionType::new(wrapped, args.is_list)?))
    }

    pub fn array() -> Type {
        plain_collection(TypeIdentifier::Array)
    }

    /// `array<int|string, value>`.
    pub fn array_of(value: Type) -> Type {
        keyed_collection(TypeIdentifier::Array, Type::array_key(), value, false)
    }

    pub fn array_with(args: CollectionArgs) -> Result<Type> {
        Type::collection(Type::builtin(TypeIdentifier::Array), args)
    }

    pub fn list() -> Type {
        Type::list_of(Type::mixed())
    }

    pub fn list_of(value: Type) -> Type {
        keyed_collection(TypeIdentifier::Array, Type::int(), value, true)
    }

    pub fn dict() -> Type {
        Type::dict_of(Type::mixed())
    }

    pub fn dict_of(value: Type) -> Type {
        keyed_collection(TypeIdentifier::Array, Type::string(), value, false)
    }

    pub fn iterable() -> Type {
        plain_collection(TypeIdentifier::Iterable)
    }

    pub fn iterable_of(value: Type) -> Type {
        keyed_collection(TypeIdentifier::Iterable, Type::array_key(), value, false)
    }

    pub fn iterable_with(args: CollectionArgs) -> Result<Type> {
        Type::collection(Type::builtin(TypeIdentifier::Iterable), args)
    }

    // ------------------------------- composites --------------------------- //

    pub fn union(members: impl IntoIterator<Item = Type>) -> Result<Type> {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => inner.into_iter().for_each(|t| push_unique(&mut flat, t)),
                other => push_unique(&mut flat, other),
            }
        }

        if flat.iter().any(|t| t.is_builtin(TypeIdentifier::Mixed)) {
            return Ok(Type::mixed());
        }

        match flat.len() {
            0 => Err(Error::invalid("Cannot create an empty union.")),
            1 => Ok(flat.remove(0)),
            _ => {
                if let Some(standalone) = flat.iter().find(|t| matches!(t, Type::Builtin(b) if b.kind.is_standalone())) {
                    return Err(Error::invalid(format!(
                        "Cannot create a union with \"{standalone}\" standalone type."
                    )));
                }
                Ok(Type::Union(flat))
            }
        }
    }

    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Result<Type> {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Type::Intersection(inner) => inner.into_iter().for_each(|t| push_unique(&mut flat, t)),
                other => push_unique(&mut flat, other),
            }
        }

        match flat.len() {
            0 => Err(Error::invalid("Cannot create an empty intersection.")),
            1 => Ok(flat.remove(0)),
            _ => Ok(Type::Intersection(flat)),
        }
    }

    /// `?T`. Rejects the standalone types `union` rejects next to `null`.
    pub fn nullable(ty: Type) -> Result<Type> {
        match ty {
            Type::Nullable(_) => Ok(ty),
            Type::Builtin(ref b) if b.is_nullable() => Ok(ty),
            Type::Builtin(ref b) if b.kind.is_standalone() => {
                Err(Error::invalid(format!("Cannot create a union with \"{ty}\" standalone type.")))
            }
            Type::Union(members) => {
                let mut rest: Vec<Type> = members.into_iter().filter(|t| !t.is_builtin(TypeIdentifier::Null)).collect();
                let core = match rest.len() {
                    1 => rest.remove(0),
                    _ => Type::Union(rest),
                };
                Ok(match core {
                    Type::Nullable(_) => core,
                    other => Type::Nullable(Box::new(other)),
                })
            }
            other => Ok(Type::Nullable(Box::new(other))),
        }
    }
}

fn push_unique(out: &mut Vec<Type>, ty: Type) {
    if !out.contains(&ty) {
        out.push(ty);
    }
}

fn plain_collection(kind: TypeIdentifier) -> Type {
    Type::Collection(CollectionType { wrapped: Box::new(Type::builtin(kind)), is_list: false })
}

// Only reached with `array`/`iterable` and, for lists, an `int` key.
fn keyed_collection(kind: TypeIdentifier, key: Type, value: Type, is_list: bool) -> Type {
    let generic = GenericType { wrapped: Box::new(Type::builtin(kind)), variable_types: vec![key, value] };
    Type::Collection(CollectionType { wrapped: Box::new(Type::Generic(generic)), is_list })
}
