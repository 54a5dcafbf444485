//! Request evaluation.
//!
//! A route runs its checks in a fixed order and stops at the first one that fails:
//!
//! 1. routable flag
//! 1. secure (TLS) requirement
//! 1. path pattern
//! 1. request method
//! 1. `Accept` negotiation
//! 1. server variable constraints
//! 1. custom predicate
//!
//! Only when every check passes are parameters extracted.

use derive_more::Display;
use tracing::trace;

use crate::{
    attrs::Attributes,
    engine::{escape, Regex},
    error::{ConfigError, MatchError},
    extract::extract,
    params::Params,
    pattern::{is_identifier, push_named_group, CompiledPattern},
    predicate::{Captures, Predicate, PredicateError},
    spec::RouteSpec,
};

/// The universal media range.
const ANY_MEDIA: &str = "*/*";

/// Quality value that rejects a media range; compared literally.
const REJECT_QUALITY: &str = "0.0";

/// Reason a route did not match.
///
/// The `Display` form is the line recorded in [`MatchAttempt::debug`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[non_exhaustive]
pub enum Rejection {
    /// Route is not routable.
    #[display(fmt = "not routable.")]
    NotRoutable,

    /// Request security does not match the route's requirement.
    #[display(fmt = "not a secure match.")]
    Secure,

    /// Path does not match the route's template.
    #[display(fmt = "not a regex match.")]
    Path,

    /// Request method is not allowed.
    #[display(fmt = "not a method match.")]
    Method,

    /// `Accept` header does not allow any of the route's media types.
    #[display(fmt = "not an accept match.")]
    Accept,

    /// Server variable does not satisfy its constraint.
    #[display(fmt = "not a server match ({}).", name)]
    Server { name: String },

    /// Custom predicate rejected the request.
    #[display(fmt = "not a custom match.")]
    Custom,
}

/// Outcome of evaluating one request against one route.
///
/// Created fresh by every call to [`RouteSpec::evaluate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchAttempt {
    captures: Captures,
    debug: Vec<String>,
    rejection: Option<Rejection>,
    params: Params,
}

impl MatchAttempt {
    /// Returns true if every check passed.
    pub fn is_match(&self) -> bool {
        self.rejection.is_none()
    }

    /// Returns the raw captured values.
    ///
    /// These are the undecoded path captures and server variable captures, as amended by the
    /// custom predicate.
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Returns the rejection trace; empty on success, otherwise exactly one entry.
    pub fn debug(&self) -> &[String] {
        &self.debug
    }

    /// Returns the first failing check.
    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    /// Returns the extracted parameters; empty unless the attempt matched.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Consumes the attempt, returning its parameters.
    pub fn into_params(self) -> Params {
        self.params
    }

    fn reject(&mut self, rejection: Rejection) {
        self.debug.push(rejection.to_string());
        self.rejection = Some(rejection);
    }
}

/// A configured media type, prepared for searching `Accept` headers.
#[derive(Debug, Clone)]
pub(crate) struct MediaRange {
    regex: Regex,
}

impl MediaRange {
    pub(crate) fn new(media_type: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidMediaType {
            media_type: media_type.to_owned(),
        };

        let (typ, subtype) = media_type.trim().split_once('/').ok_or_else(invalid)?;

        if typ.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return Err(invalid());
        }

        let pattern = format!(
            r"{}/({}|\*)(;q=(\d\.\d)(?:[,;]|$))?",
            escape(typ),
            escape(subtype)
        );

        let regex = Regex::new(&pattern)
            .map_err(|source| ConfigError::Pattern { pattern, source })?;

        Ok(MediaRange { regex })
    }

    /// Searches a whitespace-free `Accept` header for this type or its `type/*` range.
    ///
    /// Only the first occurrence is considered. It is rejected only when it carries the quality
    /// string `0.0` exactly, ending at a parameter boundary.
    fn is_accepted(&self, header: &str) -> bool {
        match self.regex.captures(header) {
            Some(caps) => caps
                .get(3)
                .map_or(true, |quality| quality.as_str() != REJECT_QUALITY),
            None => false,
        }
    }
}

/// A server variable constraint, prepared for capture.
#[derive(Debug, Clone)]
pub(crate) struct ServerConstraint {
    name: String,
    regex: Regex,
}

impl ServerConstraint {
    pub(crate) fn new(name: &str, regex: &str) -> Result<Self, ConfigError> {
        if !is_identifier(name) {
            return Err(ConfigError::InvalidServerVar {
                name: name.to_owned(),
            });
        }

        let mut pattern = String::new();
        push_named_group(&mut pattern, name, regex);

        let regex = Regex::new(&pattern)
            .map_err(|source| ConfigError::Pattern { pattern, source })?;

        Ok(ServerConstraint {
            name: name.to_owned(),
            regex,
        })
    }

    /// Searches the attribute value for the constraint, returning the named capture.
    fn capture<'a>(&self, attrs: &'a Attributes) -> Option<&'a str> {
        let value = attrs.get(&self.name).unwrap_or("");

        self.regex
            .captures(value)
            .and_then(|caps| caps.name(&self.name))
            .map(|m| m.as_str())
    }
}

enum Failure {
    Rejected(Rejection),
    Predicate(PredicateError),
}

impl From<Rejection> for Failure {
    fn from(rejection: Rejection) -> Self {
        Failure::Rejected(rejection)
    }
}

/// Evaluates `path` and `attrs` against `spec`.
pub(crate) fn evaluate(
    spec: &RouteSpec,
    path: &str,
    attrs: &Attributes,
) -> Result<MatchAttempt, MatchError> {
    let compiled = spec.compile()?;
    let mut attempt = MatchAttempt::default();

    match run_checks(spec, compiled, path, attrs, &mut attempt.captures) {
        Ok(()) => {
            attempt.params = extract(compiled.defaults(), &attempt.captures, spec.wildcard());
            trace!(name = ?spec.name(), template = spec.path(), path, "route matched");
        }

        Err(Failure::Rejected(rejection)) => {
            trace!(
                name = ?spec.name(),
                template = spec.path(),
                path,
                reason = %rejection,
                "route rejected request"
            );
            attempt.reject(rejection);
        }

        Err(Failure::Predicate(err)) => return Err(MatchError::Predicate(err)),
    }

    Ok(attempt)
}

fn run_checks(
    spec: &RouteSpec,
    compiled: &CompiledPattern,
    path: &str,
    attrs: &Attributes,
    captures: &mut Captures,
) -> Result<(), Failure> {
    check_routable(spec)?;
    check_secure(spec.secure(), attrs)?;
    check_path(compiled, path, captures)?;
    check_method(spec.methods(), attrs)?;
    check_accept(compiled.accept(), attrs)?;
    check_server(compiled.server(), attrs, captures)?;

    if let Some(predicate) = spec.predicate() {
        check_custom(predicate, attrs, captures)?;
    }

    Ok(())
}

fn check_routable(spec: &RouteSpec) -> Result<(), Rejection> {
    if spec.is_routable() {
        Ok(())
    } else {
        Err(Rejection::NotRoutable)
    }
}

fn check_secure(required: Option<bool>, attrs: &Attributes) -> Result<(), Rejection> {
    match required {
        Some(required) if required != attrs.is_secure() => Err(Rejection::Secure),
        _ => Ok(()),
    }
}

fn check_path(
    compiled: &CompiledPattern,
    path: &str,
    captures: &mut Captures,
) -> Result<(), Rejection> {
    let re = compiled.regex();
    let caps = re.captures(path).ok_or(Rejection::Path)?;

    for name in re.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            captures.insert(name.to_owned(), m.as_str().to_owned());
        }
    }

    Ok(())
}

fn check_method(methods: &[String], attrs: &Attributes) -> Result<(), Rejection> {
    if methods.is_empty() {
        return Ok(());
    }

    match attrs.method() {
        Some(method) if methods.iter().any(|allowed| allowed == method) => Ok(()),
        _ => Err(Rejection::Method),
    }
}

fn check_accept(ranges: &[MediaRange], attrs: &Attributes) -> Result<(), Rejection> {
    let header = match attrs.accept() {
        Some(header) if !ranges.is_empty() => header,
        _ => return Ok(()),
    };

    let header = header
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();

    if header.contains(ANY_MEDIA) || ranges.iter().any(|range| range.is_accepted(&header)) {
        Ok(())
    } else {
        Err(Rejection::Accept)
    }
}

fn check_server(
    constraints: &[ServerConstraint],
    attrs: &Attributes,
    captures: &mut Captures,
) -> Result<(), Rejection> {
    for constraint in constraints {
        let value = constraint.capture(attrs).ok_or_else(|| Rejection::Server {
            name: constraint.name.clone(),
        })?;

        captures.insert(constraint.name.clone(), value.to_owned());
    }

    Ok(())
}

fn check_custom(
    predicate: &dyn Predicate,
    attrs: &Attributes,
    captures: &mut Captures,
) -> Result<(), Failure> {
    let verdict = predicate
        .check(attrs, captures)
        .map_err(Failure::Predicate)?;

    let (matched, replacement) = verdict.into_parts();

    if let Some(replacement) = replacement {
        *captures = replacement;
    }

    if matched {
        Ok(())
    } else {
        Err(Rejection::Custom.into())
    }
}
