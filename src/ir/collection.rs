use serde::Serialize;

use super::{Type, TypeIdentifier};
use crate::error::{Error, Result};

/// A type holding variable parts, such as `array<string, int>` or `Bag<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GenericType {
    pub(crate) wrapped: Box<Type>,
    pub(crate) variable_types: Vec<Type>,
}

impl GenericType {
    /// The wrapped type must be `array`, `iterable` or a class.
    pub fn new(wrapped: Type, variable_types: Vec<Type>) -> Result<Self> {
        let accepted = match &wrapped {
            Type::Builtin(b) => b.kind.is_collection(),
            Type::Object(_) | Type::Enum(_) | Type::BackedEnum(_) => true,
            _ => false,
        };
        if !accepted {
            return Err(Error::invalid(format!("Cannot create a generic type with \"{wrapped}\" type.")));
        }
        Ok(Self { wrapped: Box::new(wrapped), variable_types })
    }

    pub fn wrapped(&self) -> &Type {
        &self.wrapped
    }

    pub fn variable_types(&self) -> &[Type] {
        &self.variable_types
    }
}

/// Key/value collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionType {
    pub(crate) wrapped: Box<Type>,
    pub(crate) is_list: bool,
}

impl CollectionType {
    /// Wraps `array`/`iterable`, a class, or a generic of those.
    /// A list must derive exactly `int` as its key type.
    pub fn new(wrapped: Type, is_list: bool) -> Result<Self> {
        let accepted = match &wrapped {
            Type::Builtin(b) => b.kind.is_collection(),
            Type::Object(_) | Type::Enum(_) | Type::BackedEnum(_) | Type::Generic(_) => true,
            _ => false,
        };
        if !accepted {
            return Err(Error::invalid(format!("Cannot create a collection type with \"{wrapped}\" type.")));
        }

        let collection = Self { wrapped: Box::new(wrapped), is_list };
        if is_list {
            let key = collection.key_type();
            if !matches!(&key, Type::Builtin(b) if b.kind == TypeIdentifier::Int) {
                return Err(Error::invalid(format!("\"{key}\" is not a valid list key type.")));
            }
        }
        Ok(collection)
    }

    pub fn wrapped(&self) -> &Type {
        &self.wrapped
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// Arity 2 keys by the first variable, arity 1 by `int`, anything else
    /// by `int|string`.
    pub fn key_type(&self) -> Type {
        match self.variable_types() {
            [key, _] => key.clone(),
            [_] => Type::int(),
            _ => Type::array_key(),
        }
    }

    pub fn value_type(&self) -> Type {
        match self.variable_types() {
            [_, value] | [value] => value.clone(),
            _ => Type::mixed(),
        }
    }

    fn variable_types(&self) -> &[Type] {
        match self.wrapped.as_ref() {
            Type::Generic(g) => &g.variable_types,
            _ => &[],
        }
    }

    /// Wrapped type with any generic layer peeled off.
    pub(crate) fn base(&self) -> &Type {
        match self.wrapped.as_ref() {
            Type::Generic(g) => &g.wrapped,
            other => other,
        }
    }
}
