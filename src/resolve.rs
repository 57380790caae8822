//! Resolvers.
//!
//! Each resolver understands one [`SubjectKind`]; [`TypeResolver`] routes an
//! arbitrary [`Subject`] to the resolver registered for its kind.
pub mod dispatch;
pub mod doc_aware;
pub mod reflection;
pub mod string;

use std::borrow::Cow;
use std::fmt;

use crate::context::ResolutionContext;
use crate::error::{Error, Result};
use crate::ir::Type;
use crate::reflect::{FunctionInfo, Parameter, PropertyInfo, ReflectionType};

pub use dispatch::TypeResolver;
pub use doc_aware::DocAwareResolver;
pub use reflection::{ParameterResolver, PropertyResolver, ReflectionTypeResolver, ReturnTypeResolver};
pub use string::StringResolver;

/// Anything a type can be resolved from.
#[derive(Debug, Clone)]
pub enum Subject<'a> {
    String(Cow<'a, str>),
    Type(&'a ReflectionType),
    Parameter(Parameter<'a>),
    Property(&'a PropertyInfo),
    Function(&'a FunctionInfo),
}

impl<'a> Subject<'a> {
    /// Renders a string-convertible value into a string subject.
    pub fn display(value: &impl fmt::Display) -> Subject<'static> {
        Subject::String(Cow::Owned(value.to_string()))
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::String(_) => SubjectKind::String,
            Subject::Type(_) => SubjectKind::ReflectionType,
            Subject::Parameter(_) => SubjectKind::Parameter,
            Subject::Property(_) => SubjectKind::Property,
            Subject::Function(_) => SubjectKind::Function,
        }
    }
}

impl<'a> From<&'a str> for Subject<'a> {
    fn from(text: &'a str) -> Self {
        Subject::String(Cow::Borrowed(text))
    }
}

impl From<String> for Subject<'static> {
    fn from(text: String) -> Self {
        Subject::String(Cow::Owned(text))
    }
}

impl<'a> From<&'a ReflectionType> for Subject<'a> {
    fn from(node: &'a ReflectionType) -> Self {
        Subject::Type(node)
    }
}

impl<'a> From<Parameter<'a>> for Subject<'a> {
    fn from(parameter: Parameter<'a>) -> Self {
        Subject::Parameter(parameter)
    }
}

impl<'a> From<&'a PropertyInfo> for Subject<'a> {
    fn from(property: &'a PropertyInfo) -> Self {
        Subject::Property(property)
    }
}

impl<'a> From<&'a FunctionInfo> for Subject<'a> {
    fn from(function: &'a FunctionInfo) -> Self {
        Subject::Function(function)
    }
}

/// Registry key of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    String,
    ReflectionType,
    Parameter,
    Property,
    Function,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::String => "string",
            SubjectKind::ReflectionType => "reflection type",
            SubjectKind::Parameter => "reflection parameter",
            SubjectKind::Property => "reflection property",
            SubjectKind::Function => "reflection function",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SubjectResolver: Send + Sync {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type>;
}

pub(crate) fn unexpected_subject(expected: &str, subject: &Subject<'_>) -> Error {
    Error::unsupported(format!("Expected subject to be a {expected}, \"{}\" given.", subject.kind()))
}

impl SubjectResolver for StringResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        match subject {
            Subject::String(text) => StringResolver::resolve(self, text, context),
            other => Err(unexpected_subject("\"string\"", other)),
        }
    }
}

impl SubjectResolver for ReflectionTypeResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        match subject {
            Subject::Type(node) => ReflectionTypeResolver::resolve(self, node, context),
            other => Err(unexpected_subject("\"reflection type\"", other)),
        }
    }
}

impl SubjectResolver for ParameterResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        match subject {
            Subject::Parameter(parameter) => ParameterResolver::resolve(self, *parameter, context),
            other => Err(unexpected_subject("\"reflection parameter\"", other)),
        }
    }
}

impl SubjectResolver for PropertyResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        match subject {
            Subject::Property(property) => PropertyResolver::resolve(self, property, context),
            other => Err(unexpected_subject("\"reflection property\"", other)),
        }
    }
}

impl SubjectResolver for ReturnTypeResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        match subject {
            Subject::Function(function) => ReturnTypeResolver::resolve(self, function, context),
            other => Err(unexpected_subject("\"reflection function\"", other)),
        }
    }
}
