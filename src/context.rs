//! Resolution Context.
//!
//! Everything needed to interpret relative or self-referential identifiers
//! found in a type expression: the called and declaring classes (as short
//! names), the namespace they live in, the alias table in effect and the
//! template parameters in scope.
pub mod factory;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::ir::Type;
use crate::reflect::ClassLookup;

pub use factory::ContextFactory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    called_class: String,
    declaring_class: String,
    namespace: Option<String>,
    uses: IndexMap<String, String>,
    templates: IndexMap<String, Type>,
}

impl ResolutionContext {
    pub fn new(called_class: impl Into<String>, declaring_class: impl Into<String>) -> Self {
        Self {
            called_class: called_class.into(),
            declaring_class: declaring_class.into(),
            namespace: None,
            uses: IndexMap::new(),
            templates: IndexMap::new(),
        }
    }

    /// An empty namespace stands for the global one.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let namespace = namespace.trim_matches('\\');
        self.namespace = (!namespace.is_empty()).then(|| namespace.to_string());
        self
    }

    pub fn with_uses(mut self, uses: IndexMap<String, String>) -> Self {
        self.uses = uses;
        self
    }

    pub fn with_use(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.uses.insert(alias.into(), target.into());
        self
    }

    pub fn with_templates(mut self, templates: IndexMap<String, Type>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, bound: Type) -> Self {
        self.templates.insert(name.into(), bound);
        self
    }

    pub fn called_class_name(&self) -> &str {
        &self.called_class
    }

    pub fn declaring_class_name(&self) -> &str {
        &self.declaring_class
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn uses(&self) -> &IndexMap<String, String> {
        &self.uses
    }

    pub fn templates(&self) -> &IndexMap<String, Type> {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&Type> {
        self.templates.get(name)
    }

    /// Qualifies `name` against the alias table, then the namespace.
    ///
    /// Absolute names lose their root marker; alias targets are returned as
    /// registered.
    pub fn normalize(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.trim_start_matches('\\').to_string();
        }

        let (head, rest) = match name.split_once('\\') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.uses.get(head) {
            return match rest {
                Some(rest) => format!("{target}\\{rest}"),
                None => target.clone(),
            };
        }

        match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    pub fn declaring_class(&self) -> String {
        self.normalize(&self.declaring_class)
    }

    pub fn called_class(&self) -> String {
        self.normalize(&self.called_class)
    }

    /// Immediate ancestor of the declaring class.
    pub fn parent_class(&self, lookup: &ClassLookup) -> Result<String> {
        let declaring = self.declaring_class();
        let parent = lookup.parent_of(&declaring).ok_or_else(|| Error::MissingAncestor(declaring.clone()))?;
        if lookup.parent_exists(&parent) {
            return Ok(parent);
        }

        trace!(parent, "ResolutionContext::parent_class - unknown parent, qualifying");
        let relative = match &self.namespace {
            Some(ns) => parent.replace(&format!("{ns}\\"), ""),
            None => parent,
        };
        Ok(self.normalize(&relative))
    }
}
