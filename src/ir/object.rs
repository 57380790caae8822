use serde::Serialize;

use super::{BuiltinType, Type, TypeIdentifier};
use crate::error::{Error, Result};

/// Instance of a named class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectType {
    pub(crate) class_name: String,
}

impl ObjectType {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn type_identifier(&self) -> TypeIdentifier {
        TypeIdentifier::Object
    }
}

/// Case of an enumeration, with no backing value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumType {
    pub(crate) class_name: String,
}

impl EnumType {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BackedEnumType {
    pub(crate) class_name: String,
    pub(crate) backing_type: BuiltinType,
}

impl BackedEnumType {
    /// Fails unless the backing builtin is exactly `int` or `string`.
    pub fn new(class_name: impl Into<String>, backing_type: BuiltinType) -> Result<Self> {
        if !matches!(backing_type.kind, TypeIdentifier::Int | TypeIdentifier::String) {
            return Err(Error::invalid(format!(
                "Cannot create a backed enum with \"{backing_type}\" backing type."
            )));
        }
        Ok(Self { class_name: class_name.into(), backing_type })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn backing_type(&self) -> &BuiltinType {
        &self.backing_type
    }
}

/// Placeholder such as `T` in `Collection<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TemplateType {
    pub(crate) name: String,
    pub(crate) bound: Box<Type>,
}

impl TemplateType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bound(&self) -> &Type {
        &self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(kind: TypeIdentifier) -> BuiltinType {
        BuiltinType { kind, sub_kind: None }
    }

    #[test]
    fn backed_enum_accepts_int_and_string() {
        let e = BackedEnumType::new("App\\Suit", builtin(TypeIdentifier::String)).unwrap();
        assert_eq!(e.class_name(), "App\\Suit");
        assert_eq!(e.backing_type().kind(), TypeIdentifier::String);
        assert!(BackedEnumType::new("App\\Suit", builtin(TypeIdentifier::Int)).is_ok());
    }

    #[test]
    fn backed_enum_rejects_other_backing() {
        let err = BackedEnumType::new("App\\Suit", builtin(TypeIdentifier::Bool)).unwrap_err();
        assert!(matches!(err, Error::InvalidConstruction(_)));
    }
}
