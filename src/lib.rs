//! Type information for a dynamically-typed, class-based host language.
//!
//! Native reflection type nodes and doc-comment type annotations are resolved
//! into one canonical [`Type`] value model.
//!
//! ```no_run
//! use std::sync::Arc;
//! use type_info::{ClassLookup, ClassTable, TypeResolver};
//!
//! let table = ClassTable::from_json_str(r#"{ "classes": [] }"#)?;
//! let resolver = TypeResolver::doc_aware(Arc::new(ClassLookup::new(Arc::new(table))));
//! let ty = resolver.resolve_string("array<string, list<int>>", None)?;
//! assert_eq!(ty.to_string(), "array<string,list<int>>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod context;
pub mod doc;
pub mod error;
pub mod ir;
pub mod norm;
pub mod parser;
pub mod path_de;
pub mod reflect;
pub mod resolve;

#[cfg(test)]
mod testing;

pub use context::{ContextFactory, ResolutionContext};
pub use error::{Error, ParseError, Result};
pub use ir::{SubKind, Type, TypeIdentifier};
pub use norm::CollectionArgs;
pub use reflect::{ClassInfo, ClassLookup, ClassTable, Reflector, ReflectionType};
pub use resolve::{Subject, SubjectKind, SubjectResolver, TypeResolver};
