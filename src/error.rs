//! Error taxonomy shared by the model factories and every resolver.

use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The subject is not a recognized type expression, or nothing is
    /// registered to resolve it.
    #[error("{message}")]
    Unsupported {
        message: String,
        #[source]
        source: Option<Cause>,
    },
    /// A factory invariant was violated.
    #[error("{0}")]
    InvalidConstruction(String),
    #[error("\"{0}\" does not extend any class")]
    MissingAncestor(String),
    /// A host collaborator failed while gathering context data.
    #[error(transparent)]
    Environment(#[from] anyhow::Error),
}

impl Error {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported { message: message.into(), source: None }
    }

    pub fn unsupported_because(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Error::Unsupported { message: message.into(), source: Some(cause.into()) }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConstruction(message.into())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }
}

/// Syntax error raised by the annotation parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the parsed text.
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self { message: message.into(), offset }
    }
}
