use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::doc_aware::DocAwareResolver;
use super::reflection::{ParameterResolver, PropertyResolver, ReflectionTypeResolver, ReturnTypeResolver};
use super::string::StringResolver;
use super::{Subject, SubjectKind, SubjectResolver};
use crate::context::{ContextFactory, ResolutionContext};
use crate::error::{Error, Result};
use crate::ir::Type;
use crate::reflect::{ClassLookup, ReflectionType};

/// Routes each subject to the resolver registered for its [`SubjectKind`].
#[derive(Clone, Default)]
pub struct TypeResolver {
    resolvers: IndexMap<SubjectKind, Arc<dyn SubjectResolver>>,
}

impl TypeResolver {
    pub fn from_resolvers(resolvers: impl IntoIterator<Item = (SubjectKind, Arc<dyn SubjectResolver>)>) -> Self {
        Self { resolvers: resolvers.into_iter().collect() }
    }

    /// Native types only. Strings are not accepted and templates are never
    /// collected.
    pub fn reflection_only(lookup: Arc<ClassLookup>) -> Self {
        let contexts = ContextFactory::new(lookup.clone());
        let bridge = ReflectionTypeResolver::new(lookup);
        Self::from_resolvers([
            entry(SubjectKind::ReflectionType, bridge.clone()),
            entry(SubjectKind::Parameter, ParameterResolver::new(bridge.clone(), contexts.clone())),
            entry(SubjectKind::Property, PropertyResolver::new(bridge.clone(), contexts.clone())),
            entry(SubjectKind::Function, ReturnTypeResolver::new(bridge, contexts)),
        ])
    }

    /// Strings accepted; members read their doc annotations before their
    /// native types.
    pub fn doc_aware(lookup: Arc<ClassLookup>) -> Self {
        let strings = StringResolver::new(lookup.clone());
        let contexts = ContextFactory::with_string_resolver(lookup.clone(), strings.clone());
        let bridge = ReflectionTypeResolver::new(lookup);
        let documented = |native: Arc<dyn SubjectResolver>| {
            DocAwareResolver::new(native, strings.clone(), contexts.clone())
        };

        Self::from_resolvers([
            entry(SubjectKind::String, strings.clone()),
            entry(SubjectKind::ReflectionType, bridge.clone()),
            entry(
                SubjectKind::Parameter,
                documented(Arc::new(ParameterResolver::new(bridge.clone(), contexts.clone()))),
            ),
            entry(
                SubjectKind::Property,
                documented(Arc::new(PropertyResolver::new(bridge.clone(), contexts.clone()))),
            ),
            entry(SubjectKind::Function, documented(Arc::new(ReturnTypeResolver::new(bridge, contexts.clone())))),
        ])
    }

    /// Registers `resolver` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: SubjectKind, resolver: Arc<dyn SubjectResolver>) {
        self.resolvers.insert(kind, resolver);
    }

    pub fn handles(&self, kind: SubjectKind) -> bool {
        self.resolvers.contains_key(&kind)
    }

    pub fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        let kind = subject.kind();
        let Some(resolver) = self.resolvers.get(&kind) else {
            return Err(Error::unsupported(format!("Cannot find any resolver for \"{kind}\" type.")));
        };
        debug!(%kind, "TypeResolver::resolve - dispatching");
        resolver.resolve(subject, context)
    }

    pub fn resolve_string(&self, text: &str, context: Option<&ResolutionContext>) -> Result<Type> {
        self.resolve(&Subject::from(text), context)
    }

    pub fn resolve_reflection_node(&self, node: &ReflectionType, context: Option<&ResolutionContext>) -> Result<Type> {
        self.resolve(&Subject::from(node), context)
    }

    /// Parameters, properties and functions (for their return type).
    pub fn resolve_member<'s>(
        &self,
        member: impl Into<Subject<'s>>,
        context: Option<&ResolutionContext>,
    ) -> Result<Type> {
        self.resolve(&member.into(), context)
    }
}

fn entry(kind: SubjectKind, resolver: impl SubjectResolver + 'static) -> (SubjectKind, Arc<dyn SubjectResolver>) {
    (kind, Arc::new(resolver))
}

impl SubjectResolver for TypeResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        TypeResolver::resolve(self, subject, context)
    }
}

impl std::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeResolver").field("kinds", &self.resolvers.keys().collect::<Vec<_>>()).finish()
    }
}
