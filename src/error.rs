//! Error types.
//!
//! Failing to match a request is not an error; see [`MatchAttempt`](crate::MatchAttempt). The
//! types here describe misconfigured routes and faults raised by caller-supplied code.

use std::error::Error as StdError;

use derive_more::{Display, Error, From};

use crate::{engine, predicate::PredicateError};

/// Errors found while compiling a route's template and conditions.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Optional group marker lists no names, e.g. `{/}`.
    #[display(fmt = "optional group in \"{}\" lists no names", template)]
    EmptyOptionalGroup { template: String },

    /// Optional group marker contains a name that is not a valid identifier.
    #[display(fmt = "optional group name \"{}\" is not a valid identifier", name)]
    InvalidOptionalGroup { name: String },

    /// Template contains more than one optional group marker.
    #[display(fmt = "template \"{}\" contains more than one optional group", template)]
    MultipleOptionalGroups { template: String },

    /// Token name is not a valid identifier.
    #[display(fmt = "token name \"{}\" is not a valid identifier", name)]
    InvalidToken { name: String },

    /// A `{` has no closing `}`.
    #[display(fmt = "template \"{}\" contains an unclosed token", template)]
    UnclosedToken { template: String },

    /// Wildcard name is not a valid identifier.
    #[display(fmt = "wildcard name \"{}\" is not a valid identifier", name)]
    InvalidWildcard { name: String },

    /// Accepted media type is not of the form `type/subtype`.
    #[display(fmt = "media type \"{}\" is not of the form type/subtype", media_type)]
    InvalidMediaType { media_type: String },

    /// Server variable name cannot be used as a capture name.
    #[display(fmt = "server variable name \"{}\" is not a valid identifier", name)]
    InvalidServerVar { name: String },

    /// The regex engine rejected a generated pattern.
    #[display(fmt = "invalid pattern \"{}\": {}", pattern, source)]
    Pattern {
        pattern: String,
        source: engine::Error,
    },
}

/// Errors that can occur while evaluating a request against a route.
#[derive(Debug, Display, From)]
#[non_exhaustive]
pub enum MatchError {
    /// Route failed to compile on first use.
    #[display(fmt = "{}", _0)]
    Config(ConfigError),

    /// Custom predicate raised an error; it is passed through as-is.
    #[display(fmt = "{}", _0)]
    Predicate(PredicateError),
}

impl StdError for MatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MatchError::Config(err) => Some(err),
            MatchError::Predicate(err) => Some(&**err),
        }
    }
}

impl MatchError {
    /// Returns the predicate's own error, if this is a predicate fault.
    pub fn into_predicate_error(self) -> Option<PredicateError> {
        match self {
            MatchError::Predicate(err) => Some(err),
            MatchError::Config(_) => None,
        }
    }
}

/// Errors that can occur when generating a path from a route.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// Route failed to compile.
    #[display(fmt = "{}", _0)]
    Config(ConfigError),

    /// A token in the template has no value.
    #[display(fmt = "no value for parameter \"{}\"", name)]
    MissingParam { name: String },
}

impl From<ConfigError> for GenerateError {
    fn from(err: ConfigError) -> Self {
        GenerateError::Config(err)
    }
}
