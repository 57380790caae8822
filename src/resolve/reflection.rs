//! Reflection bridge and the member resolvers built on it.

use std::sync::Arc;

use tracing::debug;

use crate::context::{ContextFactory, ResolutionContext};
use crate::error::{Error, Result};
use crate::ir::{Type, TypeIdentifier};
use crate::reflect::lookup::strip_root;
use crate::reflect::{ClassLookup, FunctionInfo, NamedType, Parameter, PropertyInfo, ReflectionType};

/// Maps native reflection type nodes onto the Type Value Model.
#[derive(Debug, Clone)]
pub struct ReflectionTypeResolver {
    lookup: Arc<ClassLookup>,
}

impl ReflectionTypeResolver {
    pub fn new(lookup: Arc<ClassLookup>) -> Self {
        Self { lookup }
    }

    pub fn resolve(&self, node: &ReflectionType, context: Option<&ResolutionContext>) -> Result<Type> {
        match node {
            ReflectionType::Union(members) => {
                Type::union(members.iter().map(|m| self.resolve(m, context)).collect::<Result<Vec<_>>>()?)
            }
            ReflectionType::Intersection(members) => {
                Type::intersection(members.iter().map(|m| self.resolve(m, context)).collect::<Result<Vec<_>>>()?)
            }
            ReflectionType::Named(named) => self.named(named, context),
            ReflectionType::Other(kind) => Err(Error::unsupported(format!(
                "Expected a named, union or intersection type node, \"{kind}\" given."
            ))),
        }
    }

    fn named(&self, named: &NamedType, context: Option<&ResolutionContext>) -> Result<Type> {
        let or_null = |ty: Type| if named.allows_null { Type::nullable(ty) } else { Ok(ty) };

        match named.name.as_str() {
            "array" => return or_null(Type::array()),
            "iterable" => return or_null(Type::iterable()),
            "null" => return Ok(Type::null()),
            "mixed" => return Ok(Type::mixed()),
            _ => {}
        }

        if named.builtin {
            return match TypeIdentifier::from_name(&named.name) {
                Some(kind) => or_null(Type::builtin(kind)),
                None => Err(Error::unsupported(format!("Unknown builtin type \"{}\".", named.name))),
            };
        }

        let keyword = named.name.to_ascii_lowercase();
        let class_name = match keyword.as_str() {
            "self" | "static" | "parent" => {
                let context = context.ok_or_else(|| {
                    Error::invalid(format!("A resolution context must be provided to resolve \"{keyword}\"."))
                })?;
                match keyword.as_str() {
                    "self" => context.declaring_class(),
                    "static" => context.called_class(),
                    _ => context.parent_class(&self.lookup)?,
                }
            }
            _ => named.name.clone(),
        };

        or_null(self.lookup.classify(strip_root(&class_name))?)
    }
}

/// Member path used in diagnostics.
enum MemberPath<'a> {
    Parameter { class: Option<&'a str>, function: &'a str, parameter: &'a str },
    Property { class: &'a str, property: &'a str },
    Return { class: Option<&'a str>, function: &'a str },
}

impl std::fmt::Display for MemberPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberPath::Parameter { class: Some(class), function, parameter } => {
                write!(f, "{class}::{function}(${parameter})")
            }
            MemberPath::Parameter { class: None, function, parameter } => write!(f, "{function}(${parameter})"),
            MemberPath::Property { class, property } => write!(f, "{class}::${property}"),
            MemberPath::Return { class: Some(class), function } => write!(f, "{class}::{function}()"),
            MemberPath::Return { class: None, function } => write!(f, "{function}()"),
        }
    }
}

fn bridge_member(
    bridge: &ReflectionTypeResolver,
    node: Option<&ReflectionType>,
    context: Option<&ResolutionContext>,
    path: MemberPath<'_>,
) -> Result<Type> {
    let resolved = match node {
        Some(node) => bridge.resolve(node, context),
        None => Err(Error::unsupported("Expected a native type node, none given.")),
    };
    resolved.map_err(|err| match err {
        err @ Error::Unsupported { .. } => {
            debug!(%path, %err, "member type not resolvable");
            Error::unsupported_because(format!("Cannot resolve type for \"{path}\"."), err)
        }
        other => other,
    })
}

/// Native type of a parameter.
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    bridge: ReflectionTypeResolver,
    contexts: ContextFactory,
}

impl ParameterResolver {
    pub fn new(bridge: ReflectionTypeResolver, contexts: ContextFactory) -> Self {
        Self { bridge, contexts }
    }

    pub fn resolve(&self, parameter: Parameter<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        let built;
        let context = match context {
            Some(context) => Some(context),
            None => {
                built = self.contexts.from_parameter(parameter)?;
                built.as_ref()
            }
        };
        let path = MemberPath::Parameter {
            class: context.map(ResolutionContext::called_class_name),
            function: &parameter.function.name,
            parameter: &parameter.info.name,
        };
        bridge_member(&self.bridge, parameter.info.ty.as_ref(), context, path)
    }
}

/// Native type of a property.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    bridge: ReflectionTypeResolver,
    contexts: ContextFactory,
}

impl PropertyResolver {
    pub fn new(bridge: ReflectionTypeResolver, contexts: ContextFactory) -> Self {
        Self { bridge, contexts }
    }

    pub fn resolve(&self, property: &PropertyInfo, context: Option<&ResolutionContext>) -> Result<Type> {
        let built;
        let context = match context {
            Some(context) => context,
            None => {
                built = self.contexts.from_property(property)?;
                &built
            }
        };
        let path = MemberPath::Property { class: &property.declaring_class, property: &property.name };
        bridge_member(&self.bridge, property.ty.as_ref(), Some(context), path)
    }
}

/// Native return type of a function or method.
#[derive(Debug, Clone)]
pub struct ReturnTypeResolver {
    bridge: ReflectionTypeResolver,
    contexts: ContextFactory,
}

impl ReturnTypeResolver {
    pub fn new(bridge: ReflectionTypeResolver, contexts: ContextFactory) -> Self {
        Self { bridge, contexts }
    }

    pub fn resolve(&self, function: &FunctionInfo, context: Option<&ResolutionContext>) -> Result<Type> {
        let built;
        let context = match context {
            Some(context) => Some(context),
            None => {
                built = self.contexts.from_function(function)?;
                built.as_ref()
            }
        };
        let path = MemberPath::Return { class: context.map(ResolutionContext::called_class_name), function: &function.name };
        bridge_member(&self.bridge, function.return_type.as_ref(), context, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::norm::CollectionArgs;
    use crate::testing::fixture_lookup;

    fn bridge() -> ReflectionTypeResolver {
        ReflectionTypeResolver::new(fixture_lookup())
    }

    fn contexts() -> ContextFactory {
        ContextFactory::new(fixture_lookup())
    }

    fn ctx() -> ResolutionContext {
        ResolutionContext::new("Dummy", "Dummy").with_namespace("Fixtures")
    }

    #[test]
    fn builtins() {
        let b = bridge();
        assert_eq!(b.resolve(&ReflectionType::builtin("int"), None).unwrap(), Type::int());
        assert_eq!(b.resolve(&ReflectionType::builtin("int").or_null(), None).unwrap(), Type::nullable(Type::int()).unwrap());
        assert_eq!(b.resolve(&ReflectionType::builtin("null"), None).unwrap(), Type::null());
        assert_eq!(b.resolve(&ReflectionType::builtin("mixed"), None).unwrap(), Type::mixed());
        assert_eq!(b.resolve(&ReflectionType::builtin("array"), None).unwrap(), Type::array());
        assert_eq!(
            b.resolve(&ReflectionType::builtin("iterable").or_null(), None).unwrap(),
            Type::nullable(Type::iterable()).unwrap()
        );
        assert!(b.resolve(&ReflectionType::builtin("integer"), None).unwrap_err().is_unsupported());
    }

    #[test]
    fn composites() {
        let b = bridge();
        let union = ReflectionType::Union(vec![ReflectionType::builtin("int"), ReflectionType::builtin("string")]);
        assert_eq!(b.resolve(&union, None).unwrap(), Type::union([Type::int(), Type::string()]).unwrap());

        let dnf = ReflectionType::Union(vec![
            ReflectionType::builtin("null"),
            ReflectionType::Intersection(vec![
                ReflectionType::class("Fixtures\\Dummy"),
                ReflectionType::class("Stringable"),
            ]),
        ]);
        assert_eq!(
            b.resolve(&dnf, None).unwrap().to_string(),
            "null|(Fixtures\\Dummy&Stringable)"
        );
    }

    #[test]
    fn classes() {
        let b = bridge();
        assert_eq!(b.resolve(&ReflectionType::class("Fixtures\\Dummy"), None).unwrap(), Type::object_of("Fixtures\\Dummy"));
        assert_eq!(
            b.resolve(&ReflectionType::class("Fixtures\\DummyEnum").or_null(), None).unwrap(),
            Type::nullable(Type::enum_of("Fixtures\\DummyEnum")).unwrap()
        );
        assert_eq!(
            b.resolve(&ReflectionType::class("Fixtures\\DummyBackedEnum"), None).unwrap(),
            Type::enumeration("Fixtures\\DummyBackedEnum", Some(Type::string())).unwrap()
        );
        // no promotion on the reflection path
        assert_eq!(
            b.resolve(&ReflectionType::class("Fixtures\\DummyCollection"), None).unwrap(),
            Type::object_of("Fixtures\\DummyCollection")
        );
        assert_ne!(
            b.resolve(&ReflectionType::class("Fixtures\\DummyCollection"), None).unwrap(),
            Type::collection(Type::object_of("Fixtures\\DummyCollection"), CollectionArgs::default()).unwrap()
        );
    }

    #[test]
    fn self_static_parent() {
        let b = bridge();
        let ctx = ctx();
        assert_eq!(b.resolve(&ReflectionType::class("self"), Some(&ctx)).unwrap(), Type::object_of("Fixtures\\Dummy"));
        assert_eq!(b.resolve(&ReflectionType::class("STATIC"), Some(&ctx)).unwrap(), Type::object_of("Fixtures\\Dummy"));
        assert_eq!(
            b.resolve(&ReflectionType::class("parent").or_null(), Some(&ctx)).unwrap(),
            Type::nullable(Type::object_of("Fixtures\\AbstractDummy")).unwrap()
        );
        assert!(matches!(b.resolve(&ReflectionType::class("self"), None).unwrap_err(), Error::InvalidConstruction(_)));
    }

    #[test]
    fn other_nodes_are_unsupported() {
        let err = bridge().resolve(&ReflectionType::Other("closure type".into()), None).unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("\"closure type\" given"));
    }

    #[test]
    fn member_resolvers() {
        let lookup = fixture_lookup();
        let dummy = lookup.class("Fixtures\\Dummy").unwrap();

        let properties = PropertyResolver::new(bridge(), contexts());
        assert_eq!(properties.resolve(dummy.property("id").unwrap(), None).unwrap(), Type::int());

        let returns = ReturnTypeResolver::new(bridge(), contexts());
        assert_eq!(returns.resolve(dummy.method("getId").unwrap(), None).unwrap(), Type::int());
        assert_eq!(returns.resolve(dummy.method("setId").unwrap(), None).unwrap(), Type::void());
        assert_eq!(returns.resolve(dummy.method("getSelf").unwrap(), None).unwrap(), Type::object_of("Fixtures\\Dummy"));

        let set_id = dummy.method("setId").unwrap();
        let parameters = ParameterResolver::new(bridge(), contexts());
        let param = Parameter { function: set_id, info: set_id.parameter("id").unwrap() };
        assert_eq!(parameters.resolve(param, None).unwrap(), Type::int());
    }

    #[test]
    fn member_failures_carry_their_path() {
        let lookup = fixture_lookup();
        let dummy = lookup.class("Fixtures\\Dummy").unwrap();

        let err = PropertyResolver::new(bridge(), contexts()).resolve(dummy.property("untyped").unwrap(), None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve type for \"Fixtures\\Dummy::$untyped\".");

        let method = dummy.method("untyped").unwrap();
        let err = ReturnTypeResolver::new(bridge(), contexts()).resolve(method, None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve type for \"Dummy::untyped()\".");

        let param = Parameter { function: method, info: method.parameter("value").unwrap() };
        let err = ParameterResolver::new(bridge(), contexts()).resolve(param, None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve type for \"Dummy::untyped($value)\".");

        let free = FunctionInfo {
            name: "helper".into(),
            declaring_class: None,
            doc_comment: None,
            return_type: None,
            parameters: vec![crate::reflect::ParameterInfo { name: "x".into(), ty: None }],
        };
        let err = ReturnTypeResolver::new(bridge(), contexts()).resolve(&free, None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve type for \"helper()\".");
        let param = Parameter { function: &free, info: &free.parameters[0] };
        let err = ParameterResolver::new(bridge(), contexts()).resolve(param, None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve type for \"helper($x)\".");
    }
}
