//! Custom match predicates.
//!
//! A predicate is the last check a route runs. It receives the request attributes and a snapshot
//! of the values captured so far, and answers with a [`Verdict`]: pass or fail, optionally with a
//! replacement set of captures. It never mutates shared state; whatever it wants to change comes
//! back in the verdict.

use std::{collections::HashMap, error::Error as StdError};

use crate::attrs::Attributes;

/// Raw values captured by the path pattern and server variable constraints.
pub type Captures = HashMap<String, String>;

/// Error raised by a custom predicate.
///
/// It is handed back to the caller of [`evaluate`](crate::RouteSpec::evaluate) untouched.
pub type PredicateError = Box<dyn StdError + Send + Sync>;

/// Interface for custom route predicates.
pub trait Predicate: Send + Sync {
    /// Decides whether the request matches, given the captures collected so far.
    fn check(&self, attrs: &Attributes, captures: &Captures) -> Result<Verdict, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(&Attributes, &Captures) -> Result<Verdict, PredicateError> + Send + Sync,
{
    fn check(&self, attrs: &Attributes, captures: &Captures) -> Result<Verdict, PredicateError> {
        (self)(attrs, captures)
    }
}

/// Creates an infallible predicate from a boolean function.
///
/// # Examples
/// ```
/// use route_matcher::{fn_predicate, Attributes, RouteSpec};
///
/// let spec = RouteSpec::new("/admin").with_predicate(fn_predicate(|attrs, _| {
///     attrs.get("REMOTE_ADDR") == Some("127.0.0.1")
/// }));
///
/// let attrs = Attributes::new().with_var("REMOTE_ADDR", "127.0.0.1");
/// assert!(spec.evaluate("/admin", &attrs).unwrap().is_match());
/// ```
pub fn fn_predicate<F>(f: F) -> impl Predicate
where
    F: Fn(&Attributes, &Captures) -> bool + Send + Sync,
{
    FnPredicate(f)
}

struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Attributes, &Captures) -> bool + Send + Sync,
{
    fn check(&self, attrs: &Attributes, captures: &Captures) -> Result<Verdict, PredicateError> {
        Ok(Verdict::from((self.0)(attrs, captures)))
    }
}

/// Outcome of a predicate check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    matched: bool,
    captures: Option<Captures>,
}

impl Verdict {
    /// A passing verdict that keeps the current captures.
    pub fn pass() -> Self {
        Verdict {
            matched: true,
            captures: None,
        }
    }

    /// A failing verdict that keeps the current captures.
    pub fn fail() -> Self {
        Verdict::default()
    }

    /// Replaces the route's captures with `captures`.
    pub fn with_captures(mut self, captures: Captures) -> Self {
        self.captures = Some(captures);
        self
    }

    /// Returns true if the verdict is a pass.
    pub fn is_pass(&self) -> bool {
        self.matched
    }

    pub(crate) fn into_parts(self) -> (bool, Option<Captures>) {
        (self.matched, self.captures)
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        Verdict {
            matched,
            captures: None,
        }
    }
}
