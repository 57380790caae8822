//! Doc-comment first member resolution.

use std::sync::Arc;

use tracing::debug;

use super::{Subject, SubjectResolver, unexpected_subject};
use crate::context::{ContextFactory, ResolutionContext};
use crate::doc::DocBlock;
use crate::error::Result;
use crate::ir::Type;
use crate::resolve::string::StringResolver;

/// Prefers the `@param`, `@var` or `@return` annotation of a member over its
/// native type, falling back to `native` when there is none.
pub struct DocAwareResolver {
    native: Arc<dyn SubjectResolver>,
    strings: StringResolver,
    contexts: ContextFactory,
}

impl DocAwareResolver {
    pub fn new(native: Arc<dyn SubjectResolver>, strings: StringResolver, contexts: ContextFactory) -> Self {
        Self { native, strings, contexts }
    }

    fn build_context(&self, subject: &Subject<'_>) -> Result<Option<ResolutionContext>> {
        match subject {
            Subject::Property(property) => self.contexts.from_property(property).map(Some),
            Subject::Parameter(parameter) => self.contexts.from_parameter(*parameter),
            Subject::Function(function) => self.contexts.from_function(function),
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for DocAwareResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocAwareResolver").field("strings", &self.strings).finish_non_exhaustive()
    }
}

impl SubjectResolver for DocAwareResolver {
    fn resolve(&self, subject: &Subject<'_>, context: Option<&ResolutionContext>) -> Result<Type> {
        let doc = match subject {
            Subject::Property(property) => property.doc_comment.as_deref(),
            Subject::Parameter(parameter) => parameter.function.doc_comment.as_deref(),
            Subject::Function(function) => function.doc_comment.as_deref(),
            other => return Err(unexpected_subject("reflection member", other)),
        };
        let Some(doc) = doc else {
            return self.native.resolve(subject, context);
        };

        let block = DocBlock::parse(doc);
        let annotated = match subject {
            Subject::Property(_) => block.var_type(),
            Subject::Parameter(parameter) => block.param_type(&parameter.info.name),
            _ => block.return_type(),
        };
        let Some(text) = annotated else {
            debug!(subject = %subject.kind(), "no matching doc tag, using native type");
            return self.native.resolve(subject, context);
        };

        let built;
        let context = match context {
            Some(context) => Some(context),
            None => {
                built = self.build_context(subject)?;
                built.as_ref()
            }
        };
        debug!(subject = %subject.kind(), annotation = text, "resolving doc annotation");
        self.strings.resolve(text, context)
    }
}
