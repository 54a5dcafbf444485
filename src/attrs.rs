//! Request attributes consulted during evaluation.

use std::collections::{hash_map, HashMap};

/// Attribute holding the request method.
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";

/// Attribute set to `on` when the request arrived over TLS.
pub const HTTPS: &str = "HTTPS";

/// Attribute holding the server port the request arrived on.
pub const SERVER_PORT: &str = "SERVER_PORT";

/// Attribute holding the `Accept` request header.
pub const HTTP_ACCEPT: &str = "HTTP_ACCEPT";

/// Bundle of request attributes, keyed the way a CGI environment is.
///
/// Well-known keys ([`REQUEST_METHOD`], [`HTTPS`], [`SERVER_PORT`], [`HTTP_ACCEPT`]) have typed
/// accessors; every key, these included, is visible to server variable constraints and custom
/// predicates through [`get`](Self::get).
///
/// # Examples
/// ```
/// use route_matcher::Attributes;
///
/// let attrs = Attributes::new()
///     .with_method("GET")
///     .with_port(443)
///     .with_var("HTTP_HOST", "example.com");
///
/// assert_eq!(attrs.method(), Some("GET"));
/// assert!(attrs.is_secure());
/// assert_eq!(attrs.get("HTTP_HOST"), Some("example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    vars: HashMap<String, String>,
}

impl Attributes {
    /// Constructs an empty attribute bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, returning the bundle.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets the request method.
    pub fn with_method(self, method: impl Into<String>) -> Self {
        self.with_var(REQUEST_METHOD, method)
    }

    /// Sets the TLS indicator to `on` or `off`.
    pub fn with_https(self, on: bool) -> Self {
        self.with_var(HTTPS, if on { "on" } else { "off" })
    }

    /// Sets the server port.
    pub fn with_port(self, port: u16) -> Self {
        self.with_var(SERVER_PORT, port.to_string())
    }

    /// Sets the `Accept` header value.
    pub fn with_accept(self, accept: impl Into<String>) -> Self {
        self.with_var(HTTP_ACCEPT, accept)
    }

    /// Sets an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(name.into(), value.into())
    }

    /// Returns an attribute's value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the request method.
    pub fn method(&self) -> Option<&str> {
        self.get(REQUEST_METHOD)
    }

    /// Returns the `Accept` header value.
    pub fn accept(&self) -> Option<&str> {
        self.get(HTTP_ACCEPT)
    }

    /// Returns true if the TLS indicator is `on` or the server port is 443.
    pub fn is_secure(&self) -> bool {
        let https_on = self
            .get(HTTPS)
            .map_or(false, |val| val.eq_ignore_ascii_case("on"));

        let port_443 = self
            .get(SERVER_PORT)
            .and_then(|port| port.trim().parse::<u16>().ok())
            == Some(443);

        https_on || port_443
    }

    /// Return iterator over all attributes.
    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.vars.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        attrs.extend(iter);
        attrs
    }
}

impl<K, V> Extend<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(feature = "http")]
mod http_impls {
    use http::request::Parts;

    use super::*;

    impl Attributes {
        /// Builds attributes from an `http` request head.
        ///
        /// Sets [`REQUEST_METHOD`], [`HTTPS`] and [`SERVER_PORT`] from the method and URI, and an
        /// `HTTP_*` attribute per header (`Content-Type` becomes `HTTP_CONTENT_TYPE`). Repeated
        /// headers are joined with `", "`; values that are not visible ASCII are skipped.
        ///
        /// [`HTTPS`] and [`SERVER_PORT`] are only derived from an absolute URI. Server-side request
        /// heads usually carry an origin-form URI (`/path?query`) with no scheme, in which case
        /// neither is set and routes requiring a secure request will not match. Set them from the
        /// connection with [`with_https`](Self::with_https) and [`with_port`](Self::with_port).
        pub fn from_request_parts(parts: &Parts) -> Self {
            let mut attrs = Attributes::new().with_method(parts.method.as_str());

            let scheme = parts.uri.scheme_str();
            if let Some(scheme) = scheme {
                attrs.insert(HTTPS, if scheme == "https" { "on" } else { "off" });
            }

            let port = parts.uri.port_u16().or(match scheme {
                Some("https") => Some(443),
                Some("http") => Some(80),
                _ => None,
            });
            if let Some(port) = port {
                attrs.insert(SERVER_PORT, port.to_string());
            }

            for (name, value) in parts.headers.iter() {
                let value = match value.to_str() {
                    Ok(value) => value,
                    Err(_) => continue,
                };

                let key = format!("HTTP_{}", name.as_str().to_ascii_uppercase().replace('-', "_"));

                match attrs.vars.entry(key) {
                    hash_map::Entry::Occupied(mut entry) => {
                        let joined = entry.get_mut();
                        joined.push_str(", ");
                        joined.push_str(value);
                    }
                    hash_map::Entry::Vacant(entry) => {
                        entry.insert(value.to_owned());
                    }
                }
            }

            attrs
        }
    }
}
