use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::ResolutionContext;
use crate::error::{Error, Result};
use crate::ir::{CollectionType, SubKind, Type, TypeIdentifier};
use crate::norm::CollectionArgs;
use crate::parser::ast::{ConstExpr, TypeNode};
use crate::parser::parse;
use crate::reflect::ClassLookup;
use crate::reflect::lookup::strip_root;

/// Resolves annotation strings such as `array<string, ?Foo>` or `int<0, max>`.
#[derive(Debug, Clone)]
pub struct StringResolver {
    lookup: Arc<ClassLookup>,
}

impl StringResolver {
    pub fn new(lookup: Arc<ClassLookup>) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &ClassLookup {
        &self.lookup
    }

    pub fn resolve(&self, text: &str, context: Option<&ResolutionContext>) -> Result<Type> {
        debug!(text, has_context = context.is_some(), "StringResolver::resolve");
        let cannot_resolve = || format!("Cannot resolve \"{text}\".");

        let node = parse(text).map_err(|err| Error::unsupported_because(cannot_resolve(), err))?;
        self.resolve_node(&node, context).map_err(|err| match err {
            err @ Error::Unsupported { .. } => Error::unsupported_because(cannot_resolve(), err),
            other => other,
        })
    }

    pub fn resolve_node(&self, node: &TypeNode, context: Option<&ResolutionContext>) -> Result<Type> {
        match node {
            TypeNode::Callable(_) => Ok(Type::callable()),
            TypeNode::Array(inner) => Ok(Type::list_of(self.resolve_node(inner, context)?)),
            TypeNode::ArrayShape(_) => Ok(Type::array()),
            TypeNode::ObjectShape(_) => Ok(Type::object()),
            TypeNode::This => {
                let context = require(context, "$this")?;
                Ok(Type::object_of(strip_root(&context.called_class())))
            }
            TypeNode::Const(expr) => const_type(expr),
            TypeNode::Identifier(name) => {
                let ty = self.identifier(name, context)?;
                self.promote(ty)
            }
            TypeNode::Nullable(inner) => Type::nullable(self.resolve_node(inner, context)?),
            TypeNode::Generic { base, args } => self.generic(base, args, context),
            TypeNode::Union(members) => {
                let mut types = Vec::with_capacity(members.len());
                for member in members {
                    let ty = self.resolve_node(member, context)?;
                    if ty.is_builtin(TypeIdentifier::Mixed) {
                        return Ok(Type::mixed());
                    }
                    types.push(ty);
                }
                Type::union(types)
            }
            TypeNode::Intersection(members) => {
                let types = members.iter().map(|m| self.resolve_node(m, context)).collect::<Result<Vec<_>>>()?;
                Type::intersection(types)
            }
        }
    }

    fn identifier(&self, name: &str, context: Option<&ResolutionContext>) -> Result<Type> {
        let ty = match name {
            "bool" | "boolean" => Type::bool(),
            "true" => Type::true_(),
            "false" => Type::false_(),
            "int" | "integer" => Type::int(),
            "float" | "double" => Type::float(),
            "string" => Type::string(),
            "resource" => Type::resource(),
            "object" => Type::object(),
            "callable" => Type::callable(),
            "array" | "non-empty-array" => Type::array(),
            "list" | "non-empty-list" => Type::list(),
            "iterable" => Type::iterable(),
            "mixed" => Type::mixed(),
            "null" => Type::null(),
            "array-key" => Type::array_key(),
            "scalar" => Type::union([Type::int(), Type::float(), Type::string(), Type::bool()])?,
            "number" => Type::union([Type::int(), Type::float()])?,
            "numeric" => Type::union([Type::int(), Type::float(), Type::string()])?,
            "self" => Type::object_of(strip_root(&require(context, "self")?.declaring_class())),
            "static" => Type::object_of(strip_root(&require(context, "static")?.called_class())),
            "parent" => Type::object_of(strip_root(&require(context, "parent")?.parent_class(&self.lookup)?)),
            "void" => Type::void(),
            "never" => Type::never(),
            other => match SubKind::from_keyword(other) {
                Some((kind, sub_kind)) => Type::refined(kind, sub_kind)?,
                None => self.custom_identifier(other, context)?,
            },
        };
        Ok(ty)
    }

    /// Class-like name, or a template in scope.
    fn custom_identifier(&self, name: &str, context: Option<&ResolutionContext>) -> Result<Type> {
        let class_name = context.map_or_else(|| name.to_string(), |c| c.normalize(name));
        if self.lookup.exists(&class_name) {
            return self.lookup.classify(&class_name);
        }
        if let Some(bound) = context.and_then(|c| c.template(name)) {
            trace!(name, "StringResolver - template in scope");
            return Ok(Type::template_bounded(name, bound.clone()));
        }
        Err(Error::unsupported(format!("Unhandled \"{name}\" identifier.")))
    }

    fn is_collection_object(&self, ty: &Type) -> bool {
        ty.class_name().is_some_and(|class| self.lookup.is_collection_like(class))
    }

    /// Iterable or indexable classes become collections.
    fn promote(&self, ty: Type) -> Result<Type> {
        if self.is_collection_object(&ty) {
            return Type::collection(ty, CollectionArgs::default());
        }
        Ok(ty)
    }

    fn generic(&self, base: &TypeNode, args: &[TypeNode], context: Option<&ResolutionContext>) -> Result<Type> {
        if let Some(range) = int_range(base, args) {
            return Type::refined(TypeIdentifier::Int, range);
        }

        let ty = self.resolve_node(base, context)?;
        // Bounds reached through plain application are not kept.
        if ty.is_identified_by(&[TypeIdentifier::Int]) {
            return Ok(ty);
        }

        let vars = args.iter().map(|a| self.resolve_node(a, context)).collect::<Result<Vec<_>>>()?;

        let ty = match ty {
            Type::Collection(collection) => {
                let is_list = collection.is_list();
                let key = collection.key_type();
                let base = collection.base().clone();
                match vars.as_slice() {
                    [value] => {
                        let generic = Type::generic(base, [key, value.clone()])?;
                        return Ok(Type::Collection(CollectionType::new(generic, is_list)?));
                    }
                    [key, value] => {
                        let args = CollectionArgs { value: Some(value.clone()), key: Some(key.clone()), is_list };
                        return Type::collection(base, args);
                    }
                    _ => base,
                }
            }
            other => other,
        };

        if self.is_collection_object(&ty) {
            let args = match vars.as_slice() {
                [value] => CollectionArgs::default().value(value.clone()),
                [key, value] => CollectionArgs::default().key(key.clone()).value(value.clone()),
                _ => CollectionArgs::default(),
            };
            return Type::collection(ty, args);
        }

        if let Type::Builtin(builtin) = &ty {
            if !builtin.kind().is_collection() {
                return Ok(ty);
            }
        }

        Type::generic(ty, vars)
    }
}

fn require<'a>(context: Option<&'a ResolutionContext>, what: &str) -> Result<&'a ResolutionContext> {
    context.ok_or_else(|| Error::invalid(format!("A resolution context must be provided to resolve \"{what}\".")))
}

fn const_type(expr: &ConstExpr) -> Result<Type> {
    match expr {
        ConstExpr::Int(_) => Ok(Type::int()),
        ConstExpr::Float(_) => Ok(Type::float()),
        ConstExpr::Str(_) => Ok(Type::string()),
        ConstExpr::Array(_) => Ok(Type::array()),
        ConstExpr::Name(name) => Err(Error::unsupported(format!("Unhandled \"{name}\" constant expression."))),
        ConstExpr::Fetch { class, name } => {
            Err(Error::unsupported(format!("Unhandled \"{class}::{name}\" constant expression.")))
        }
    }
}

/// `int<lo, hi>` written with integer literals or `min`/`max`.
fn int_range(base: &TypeNode, args: &[TypeNode]) -> Option<SubKind> {
    if !matches!(base, TypeNode::Identifier(name) if name == "int" || name == "integer") {
        return None;
    }
    let bound = |node: &TypeNode, open: &str| match node {
        TypeNode::Const(ConstExpr::Int(v)) => Some(Some(*v)),
        TypeNode::Identifier(name) if name == open => Some(None),
        _ => None,
    };
    match args {
        [lo, hi] => Some(SubKind::RangeInt { min: bound(lo, "min")?, max: bound(hi, "max")? }),
        _ => None,
    }
}
