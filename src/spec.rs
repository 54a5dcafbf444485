use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use once_cell::sync::OnceCell;

use crate::{
    attrs::Attributes,
    error::{ConfigError, GenerateError, MatchError},
    evaluate::{self, MatchAttempt},
    generate,
    params::ParamValue,
    pattern::{self, CompiledPattern},
    predicate::Predicate,
};

/// Describes a single route: a path template and the request criteria it matches.
///
/// # Templates
/// A template is a path with `{name}` tokens. Each token captures one or more characters up to the
/// next `/`, unless a custom pattern is registered for it with [`with_token`](Self::with_token).
/// Token names start with an ASCII letter and continue with letters, digits or `_`.
///
/// One optional group may appear, written `{/a,b,c}`. It matches `/a`, `/a/b` or `/a/b/c`, but never
/// a later name without the earlier ones. A group at the very start of the template supplies the
/// leading `/` itself.
///
/// A wildcard (see [`with_wildcard`](Self::with_wildcard)) captures the rest of the path after the
/// template as a list of segments.
///
/// # Compilation
/// The template is compiled on first use and the result is kept for the lifetime of the value.
/// Compilation is synchronized, so a route can be shared between threads and evaluated
/// concurrently. Every `with_*` method discards a previously compiled pattern.
///
/// # Examples
/// ```
/// use route_matcher::{Attributes, RouteSpec};
///
/// let spec = RouteSpec::new("/blog/{id}{/format}")
///     .with_token("id", r"\d+")
///     .with_value("format", "html")
///     .with_method("GET");
///
/// let attempt = spec.evaluate("/blog/42", &Attributes::new().with_method("GET")).unwrap();
/// assert!(attempt.is_match());
/// assert_eq!(attempt.params().get_str("id"), Some("42"));
/// assert_eq!(attempt.params().get_str("format"), Some("html"));
///
/// let attempt = spec.evaluate("/blog/42", &Attributes::new().with_method("POST")).unwrap();
/// assert_eq!(attempt.debug(), ["not a method match."]);
/// ```
#[derive(Clone)]
pub struct RouteSpec {
    path: String,
    name: Option<String>,
    tokens: HashMap<String, String>,
    values: HashMap<String, ParamValue>,
    wildcard: Option<String>,
    secure: Option<bool>,
    methods: Vec<String>,
    accept: Vec<String>,
    server: Vec<(String, String)>,
    predicate: Option<Arc<dyn Predicate>>,
    routable: bool,
    compiled: OnceCell<CompiledPattern>,
}

impl RouteSpec {
    /// Constructs a route for the given path template.
    ///
    /// The route is routable, has no default values and places no requirements on the request
    /// beyond its path. The template is not checked until the route is first compiled.
    pub fn new(path: impl Into<String>) -> Self {
        RouteSpec {
            path: path.into(),
            name: None,
            tokens: HashMap::new(),
            values: HashMap::new(),
            wildcard: None,
            secure: None,
            methods: Vec::new(),
            accept: Vec::new(),
            server: Vec::new(),
            predicate: None,
            routable: true,
            compiled: OnceCell::new(),
        }
    }

    /// Sets the route name, used in diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.reset()
    }

    /// Registers a custom pattern for token `name`.
    ///
    /// The pattern is used verbatim as the body of the token's capture group.
    pub fn with_token(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.tokens.insert(name.into(), pattern.into());
        self.reset()
    }

    /// Registers several custom token patterns.
    pub fn with_tokens<I, K, V>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tokens
            .extend(tokens.into_iter().map(|(name, pat)| (name.into(), pat.into())));
        self.reset()
    }

    /// Sets the default value of parameter `name`.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self.reset()
    }

    /// Sets several default values.
    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.values
            .extend(values.into_iter().map(|(name, val)| (name.into(), val.into())));
        self.reset()
    }

    /// Captures the remainder of the path as parameter `name`.
    pub fn with_wildcard(mut self, name: impl Into<String>) -> Self {
        self.wildcard = Some(name.into());
        self.reset()
    }

    /// Requires the request to be secure (`true`) or insecure (`false`).
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self.reset()
    }

    /// Adds an allowed request method.
    ///
    /// Methods are compared exactly; the caller is responsible for normalizing case.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self.reset()
    }

    /// Adds several allowed request methods.
    pub fn with_methods<I, M>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        methods
            .into_iter()
            .fold(self, |spec, method| spec.with_method(method))
    }

    /// Adds an accepted media type, written `type/subtype`.
    pub fn with_accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self.reset()
    }

    /// Adds several accepted media types.
    pub fn with_accepts<I, M>(self, media_types: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        media_types
            .into_iter()
            .fold(self, |spec, media_type| spec.with_accept(media_type))
    }

    /// Constrains attribute `name` with `regex`.
    ///
    /// The regex is searched for anywhere in the attribute's value; an absent attribute is
    /// searched as the empty string. The matched text is captured under `name`, replacing any path
    /// token of the same name. Setting a constraint for the same name again replaces it.
    pub fn with_server(mut self, name: impl Into<String>, regex: impl Into<String>) -> Self {
        let name = name.into();
        let regex = regex.into();

        match self.server.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = regex,
            None => self.server.push((name, regex)),
        }

        self.reset()
    }

    /// Sets the custom predicate, run after every other check has passed.
    pub fn with_predicate<P: Predicate + 'static>(mut self, predicate: P) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self.reset()
    }

    /// Sets whether the route takes part in matching at all.
    pub fn with_routable(mut self, routable: bool) -> Self {
        self.routable = routable;
        self.reset()
    }

    fn reset(mut self) -> Self {
        self.compiled = OnceCell::new();
        self
    }

    /// Returns the path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the route name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the custom token patterns.
    pub fn tokens(&self) -> &HashMap<String, String> {
        &self.tokens
    }

    /// Returns the configured default values.
    ///
    /// Token names without a configured default are not listed here; see
    /// [`CompiledPattern::defaults`] for the effective defaults.
    pub fn values(&self) -> &HashMap<String, ParamValue> {
        &self.values
    }

    /// Returns the wildcard parameter name.
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    /// Returns the security requirement, if any.
    pub fn secure(&self) -> Option<bool> {
        self.secure
    }

    /// Returns the allowed request methods; empty means any.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Returns the accepted media types; empty means any.
    pub fn accepts(&self) -> &[String] {
        &self.accept
    }

    /// Returns the server variable constraints, in the order they are checked.
    pub fn server(&self) -> &[(String, String)] {
        &self.server
    }

    /// Returns the custom predicate.
    pub fn predicate(&self) -> Option<&dyn Predicate> {
        self.predicate.as_deref()
    }

    /// Returns true if the route takes part in matching.
    pub fn is_routable(&self) -> bool {
        self.routable
    }

    /// Compiles the route, or returns the pattern compiled by an earlier call.
    ///
    /// # Errors
    /// Returns an error if the template, a token pattern, a media type or a server variable
    /// constraint is malformed. A failed compilation is not kept; the next call tries again.
    pub fn compile(&self) -> Result<&CompiledPattern, ConfigError> {
        self.compiled.get_or_try_init(|| pattern::compile(self))
    }

    /// Evaluates a request against the route.
    ///
    /// A request that does not match is not an error; see [`MatchAttempt::is_match`].
    ///
    /// # Errors
    /// Returns [`MatchError::Config`] if the route fails to compile and [`MatchError::Predicate`]
    /// if the custom predicate fails.
    pub fn evaluate(&self, path: &str, attrs: &Attributes) -> Result<MatchAttempt, MatchError> {
        evaluate::evaluate(self, path, attrs)
    }

    /// Returns true if the request matches the route.
    pub fn is_match(&self, path: &str, attrs: &Attributes) -> Result<bool, MatchError> {
        self.evaluate(path, attrs).map(|attempt| attempt.is_match())
    }

    /// Builds a path for this route from `data`.
    ///
    /// See [`generate()`](crate::generate()).
    pub fn generate<K, S>(&self, data: &HashMap<K, ParamValue, S>) -> Result<String, GenerateError>
    where
        K: Borrow<str> + Eq + Hash,
        S: BuildHasher,
    {
        generate::generate(self, data)
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("tokens", &self.tokens)
            .field("values", &self.values)
            .field("wildcard", &self.wildcard)
            .field("secure", &self.secure)
            .field("methods", &self.methods)
            .field("accept", &self.accept)
            .field("server", &self.server)
            .field("predicate", &self.predicate.as_ref().map(|_| "Predicate"))
            .field("routable", &self.routable)
            .finish()
    }
}
