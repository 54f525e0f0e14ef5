//! Errors surfaced while filling a bundle and formatting patterns

use lilt_syntax::Identifier;
use thiserror::Error;

/// Failure type for user-registered and built-in formatting functions
pub type FunctionError = Box<dyn std::error::Error + Send + Sync>;

/// Any error that can occur while a pattern is formatted.
///
/// Most of these are non-fatal: when the caller supplies an error sink the
/// resolver collects them there and substitutes a visible `{placeholder}` in
/// the output. Without a sink the first error aborts the call. The one
/// always-fatal case is [`TooManyPlaceables`](Self::TooManyPlaceables).
#[derive(Debug, Error)]
pub enum RenderError {
    /// The pattern referenced a variable the caller didn't supply
    #[error("unknown variable `${name}`")]
    UnknownVariable { name: Identifier },

    /// No message with this id in the bundle
    #[error("unknown message `{id}`")]
    UnknownMessage { id: Identifier },

    /// No term with this id in the bundle
    #[error("unknown term `{id}`")]
    UnknownTerm { id: Identifier },

    /// The referenced message or term exists but has no such attribute
    #[error("unknown attribute `{id}.{attribute}`")]
    UnknownAttribute {
        id: Identifier,
        attribute: Identifier,
    },

    /// The referenced message or term has attributes but no value
    #[error("`{id}` has no value")]
    NoValue { id: Identifier },

    /// No function with this name, neither registered nor built in
    #[error("unknown function `{name}()`")]
    UnknownFunction { name: Identifier },

    /// A function rejected its arguments or failed internally
    #[error("function `{name}()` failed")]
    Function {
        name: Identifier,
        #[source]
        source: FunctionError,
    },

    /// A select expression had no matching variant and no usable default
    #[error("no default variant")]
    NoDefault,

    /// A pattern referenced itself, directly or through other messages and
    /// terms
    #[error("cyclic reference")]
    CyclicReference,

    /// The pattern expanded more placeables than the per-call budget allows.
    /// Always fatal: the partial output is discarded.
    #[error("too many placeables")]
    TooManyPlaceables,
}

/// An entry could not be added to the bundle because its id is taken
#[derive(Debug, Error)]
pub enum ResourceConflict {
    #[error("message `{id}` is already defined")]
    Message { id: Identifier },
    #[error("term `{id}` is already defined")]
    Term { id: Identifier },
}
