//! Error types for trellis.
//!
//! Every error here is raised while the router is being built. Request-time
//! outcomes such as "no route" or "wrong method" are not errors; they are
//! variants of the lookup result.
//!
//! - [`CompileError`] - a route pattern could not be parsed
//! - [`InsertError`] - a compiled pattern could not be added to a route table
//! - [`RouteError`] - top-level error of every registration operation

use http::Method;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while compiling a route pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern does not start with `/`.
    #[error("pattern `{pattern}` must start with '/'")]
    MissingLeadingSlash {
        /// The offending pattern.
        pattern: String,
    },

    /// More than one `*` segment.
    #[error("pattern `{pattern}` contains more than one wildcard")]
    MultipleWildcards {
        /// The offending pattern.
        pattern: String,
    },

    /// A `*` segment is followed by further segments.
    #[error("wildcard must be the last segment of pattern `{pattern}`")]
    WildcardNotLast {
        /// The offending pattern.
        pattern: String,
    },

    /// A `{}` or `{:regex}` segment.
    #[error("empty parameter name in pattern `{pattern}`")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("parameter `{name}` is bound twice in pattern `{pattern}`")]
    DuplicateParamName {
        /// The offending pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// A segment mixes literal text with braces, or a brace is never closed.
    #[error("malformed parameter segment `{segment}` in pattern `{pattern}`")]
    MalformedParam {
        /// The offending pattern.
        pattern: String,
        /// The segment that failed to parse.
        segment: String,
    },

    /// The regex constraint of a parameter does not compile.
    #[error("invalid regex for parameter `{name}` in pattern `{pattern}`: {reason}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// The parameter carrying the constraint.
        name: String,
        /// The regex engine's explanation.
        reason: String,
    },
}

/// Errors raised while inserting a compiled pattern into a route table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// Two parameters with different names occupy the same trie position.
    #[error(
        "pattern `{pattern}` binds `{conflicting}` where an existing route already binds `{existing}`"
    )]
    ConflictingParamNames {
        /// The pattern being inserted.
        pattern: String,
        /// The name already registered at that position.
        existing: String,
        /// The name the new pattern tried to use.
        conflicting: String,
    },

    /// The method and pattern are already registered.
    #[error("route {method} `{pattern}` is already registered")]
    DuplicateRoute {
        /// The HTTP method.
        method: Method,
        /// The pattern that was registered twice.
        pattern: String,
    },
}

/// Top-level error for router registration operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The pattern could not be inserted.
    #[error(transparent)]
    Insert(#[from] InsertError),

    /// A sub-router was mounted under a prefix containing a wildcard.
    #[error("cannot mount under `{0}`: mount prefixes may not contain a wildcard")]
    InvalidMountPrefix(String),
}
