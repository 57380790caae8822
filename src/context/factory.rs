use std::collections::HashSet;
use std::sync::Arc;

use anyhow::anyhow;
use indexmap::IndexMap;
use tracing::debug;

use super::ResolutionContext;
use crate::doc::DocBlock;
use crate::error::{Error, Result};
use crate::ir::Type;
use crate::reflect::{ClassInfo, ClassLookup, FunctionInfo, Parameter, PropertyInfo};
use crate::resolve::string::StringResolver;

/// Builds [`ResolutionContext`]s from reflection metadata.
///
/// Templates are only collected when a [`StringResolver`] is available to
/// resolve their bounds.
#[derive(Debug, Clone)]
pub struct ContextFactory {
    lookup: Arc<ClassLookup>,
    strings: Option<StringResolver>,
}

impl ContextFactory {
    pub fn new(lookup: Arc<ClassLookup>) -> Self {
        Self { lookup, strings: None }
    }

    pub fn with_string_resolver(lookup: Arc<ClassLookup>, strings: StringResolver) -> Self {
        Self { lookup, strings: Some(strings) }
    }

    pub fn lookup(&self) -> &Arc<ClassLookup> {
        &self.lookup
    }

    /// Context for `called`, declared in `declaring` (defaults to `called`).
    pub fn from_class_name(&self, called: &str, declaring: Option<&str>) -> Result<ResolutionContext> {
        let declaring = declaring.unwrap_or(called);
        let class = self.class_info(declaring)?;
        let context = ResolutionContext::new(short_name(called), short_name(declaring))
            .with_namespace(class.namespace())
            .with_uses(self.collect_uses(class)?);
        let templates = self.collect_templates(class.doc_comment.as_deref(), &context)?;
        Ok(context.with_templates(templates))
    }

    pub fn from_class(&self, class: &ClassInfo) -> Result<ResolutionContext> {
        let context = self.base_context(class)?;
        let templates = self.collect_templates(class.doc_comment.as_deref(), &context)?;
        Ok(context.with_templates(templates))
    }

    pub fn from_property(&self, property: &PropertyInfo) -> Result<ResolutionContext> {
        let class = self.class_info(&property.declaring_class)?;
        self.from_class(class)
    }

    /// `None` for free functions, which have no class scope.
    pub fn from_function(&self, function: &FunctionInfo) -> Result<Option<ResolutionContext>> {
        let Some(declaring) = function.declaring_class.as_deref() else {
            return Ok(None);
        };
        let class = self.class_info(declaring)?;
        let context = self.base_context(class)?;

        let mut templates = self.collect_templates(function.doc_comment.as_deref(), &context)?;
        for (name, bound) in self.collect_templates(class.doc_comment.as_deref(), &context)? {
            templates.entry(name).or_insert(bound);
        }
        Ok(Some(context.with_templates(templates)))
    }

    pub fn from_parameter(&self, parameter: Parameter<'_>) -> Result<Option<ResolutionContext>> {
        self.from_function(parameter.function)
    }

    fn class_info(&self, name: &str) -> Result<&ClassInfo> {
        self.lookup
            .class(name)
            .ok_or_else(|| Error::Environment(anyhow!("class \"{name}\" is not known to the reflector")))
    }

    fn base_context(&self, class: &ClassInfo) -> Result<ResolutionContext> {
        Ok(ResolutionContext::new(class.short_name(), class.short_name())
            .with_namespace(class.namespace())
            .with_uses(self.collect_uses(class)?))
    }

    /// Alias table of `class`, overridden by those of the traits it uses.
    fn collect_uses(&self, class: &ClassInfo) -> Result<IndexMap<String, String>> {
        let mut seen = HashSet::new();
        self.collect_uses_inner(class, &mut seen)
    }

    fn collect_uses_inner(&self, class: &ClassInfo, seen: &mut HashSet<String>) -> Result<IndexMap<String, String>> {
        let mut uses = self.lookup.reflector().imports(class)?;
        seen.insert(class.name.to_ascii_lowercase());
        for name in &class.traits {
            let Some(used) = self.lookup.class(name) else {
                continue;
            };
            if seen.contains(&used.name.to_ascii_lowercase()) {
                continue;
            }
            uses.extend(self.collect_uses_inner(used, seen)?);
        }
        Ok(uses)
    }

    fn collect_templates(&self, doc: Option<&str>, context: &ResolutionContext) -> Result<IndexMap<String, Type>> {
        let mut templates = IndexMap::new();
        let (Some(strings), Some(doc)) = (&self.strings, doc) else {
            return Ok(templates);
        };

        for tag in DocBlock::parse(doc).templates() {
            let bound = match tag.bound {
                None => Type::mixed(),
                Some(text) => match strings.resolve(text, Some(context)) {
                    Ok(bound) => bound,
                    Err(err) if err.is_unsupported() => {
                        debug!(template = tag.name, bound = text, %err, "unresolvable template bound, using mixed");
                        Type::mixed()
                    }
                    Err(err) => return Err(err),
                },
            };
            templates.insert(tag.name.to_string(), bound);
        }
        Ok(templates)
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}
