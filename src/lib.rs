//! Single-route matching.
//!
//! A [`RouteSpec`] pairs a path template with the request criteria a route accepts: security,
//! methods, media types, server variable constraints and a custom [`Predicate`]. Evaluating a
//! request path and its [`Attributes`] runs those checks in a fixed order and produces a
//! [`MatchAttempt`] carrying either the extracted [`Params`] or the reason the route was rejected.
//!
//! # Examples
//! ```
//! use route_matcher::{Attributes, RouteSpec};
//!
//! let spec = RouteSpec::new("/foo/{id}").with_wildcard("path");
//!
//! let attempt = spec.evaluate("/foo/5/a/b", &Attributes::new()).unwrap();
//! assert!(attempt.is_match());
//! assert_eq!(attempt.params().get_str("id"), Some("5"));
//! assert_eq!(attempt.params().get_seq("path"), Some(&["a".to_owned(), "b".to_owned()][..]));
//! ```
//!
//! # Crate Features
//! - `unicode` (default): Unicode-aware matching through the `regex` crate; the smaller
//!   `regex-lite` crate is used without it.
//! - `http` (default): [`Attributes::from_request_parts`] for building attributes from an `http`
//!   request head.

#![deny(rust_2018_idioms, nonstandard_style)]

mod attrs;
mod de;
mod engine;
mod error;
mod evaluate;
mod extract;
mod generate;
mod params;
mod pattern;
mod predicate;
mod quoter;
mod spec;

pub use self::attrs::{Attributes, HTTPS, HTTP_ACCEPT, REQUEST_METHOD, SERVER_PORT};
pub use self::error::{ConfigError, GenerateError, MatchError};
pub use self::evaluate::{MatchAttempt, Rejection};
pub use self::generate::generate;
pub use self::params::{ParamValue, Params};
pub use self::pattern::CompiledPattern;
pub use self::predicate::{fn_predicate, Captures, Predicate, PredicateError, Verdict};
pub use self::spec::RouteSpec;
