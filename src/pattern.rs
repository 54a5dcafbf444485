//! Template compilation.
//!
//! A template is a path with `{name}` tokens and at most one optional group marker `{/a,b,c}`.
//! Compiling it produces an anchored regular expression with one named capture group per token.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    engine::{escape, Regex, REGEX_FLAGS},
    error::ConfigError,
    evaluate::{MediaRange, ServerConstraint},
    params::ParamValue,
    spec::RouteSpec,
};

/// Default token body; one or more characters up to the next path separator.
const DEFAULT_PATTERN: &str = "[^/]+";

/// Wildcard body; the remainder of the path.
const WILDCARD_PATTERN: &str = ".*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Literal slice of template.
    Const(String),

    /// Name of a `{name}` token.
    Var(String),

    /// Names of an optional group, in order.
    Optional(Vec<String>),
}

/// The compiled form of a [`RouteSpec`].
///
/// Holds the anchored path regex together with everything else evaluation needs that can be
/// prepared ahead of time: the effective default values, accept media ranges and server
/// variable constraints.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    regex: Regex,
    segments: Vec<Segment>,
    names: Vec<String>,
    defaults: HashMap<String, ParamValue>,
    accept: Vec<MediaRange>,
    server: Vec<ServerConstraint>,
}

impl CompiledPattern {
    /// Returns the anchored pattern string.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns token names in the order they appear in the template.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the route's default values, with a `Null` entry for every token that had none.
    pub fn defaults(&self) -> &HashMap<String, ParamValue> {
        &self.defaults
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn accept(&self) -> &[MediaRange] {
        &self.accept
    }

    pub(crate) fn server(&self) -> &[ServerConstraint] {
        &self.server
    }
}

/// Compiles `spec` without consulting its memoized pattern.
///
/// Use [`RouteSpec::compile`] to compile at most once.
pub(crate) fn compile(spec: &RouteSpec) -> Result<CompiledPattern, ConfigError> {
    let template = spec.path();
    let segments = parse(template)?;

    if let Some(wildcard) = spec.wildcard() {
        if !is_identifier(wildcard) {
            return Err(ConfigError::InvalidWildcard {
                name: wildcard.to_owned(),
            });
        }
    }

    let pattern = render(&segments, spec.tokens(), spec.wildcard());

    let regex = Regex::new(&pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let names = segments
        .iter()
        .flat_map(|segment| match segment {
            Segment::Const(_) => Vec::new(),
            Segment::Var(name) => vec![name.clone()],
            Segment::Optional(names) => names.clone(),
        })
        .collect::<Vec<_>>();

    let mut defaults = spec.values().clone();
    for name in &names {
        defaults.entry(name.clone()).or_insert(ParamValue::Null);
    }

    let accept = spec
        .accepts()
        .iter()
        .map(|media_type| MediaRange::new(media_type))
        .collect::<Result<Vec<_>, _>>()?;

    let server = spec
        .server()
        .iter()
        .map(|(name, regex)| ServerConstraint::new(name, regex))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(template, pattern = %pattern, "compiled route template");

    Ok(CompiledPattern {
        pattern,
        regex,
        segments,
        names,
        defaults,
        accept,
        server,
    })
}

/// Splits a template into literal, token and optional group segments.
pub(crate) fn parse(template: &str) -> Result<Vec<Segment>, ConfigError> {
    let mut segments = Vec::new();
    let mut unprocessed = template;
    let mut has_optional = false;

    while let Some(idx) = unprocessed.find('{') {
        let (prefix, rem) = unprocessed.split_at(idx);

        if !prefix.is_empty() {
            segments.push(Segment::Const(prefix.to_owned()));
        }

        let close_idx = rem.find('}').ok_or_else(|| ConfigError::UnclosedToken {
            template: template.to_owned(),
        })?;

        // remove outer curly brackets
        let param = &rem[1..close_idx];
        unprocessed = &rem[close_idx + 1..];

        match param.strip_prefix('/') {
            Some(list) => {
                if has_optional {
                    return Err(ConfigError::MultipleOptionalGroups {
                        template: template.to_owned(),
                    });
                }

                has_optional = true;
                segments.push(Segment::Optional(parse_optional_group(template, list)?));
            }

            None => {
                if !is_identifier(param) {
                    return Err(ConfigError::InvalidToken {
                        name: param.to_owned(),
                    });
                }

                segments.push(Segment::Var(param.to_owned()));
            }
        }
    }

    if !unprocessed.is_empty() {
        segments.push(Segment::Const(unprocessed.to_owned()));
    }

    Ok(segments)
}

fn parse_optional_group(template: &str, list: &str) -> Result<Vec<String>, ConfigError> {
    if list.is_empty() {
        return Err(ConfigError::EmptyOptionalGroup {
            template: template.to_owned(),
        });
    }

    list.split(',')
        .map(|name| {
            if is_identifier(name) {
                Ok(name.to_owned())
            } else {
                Err(ConfigError::InvalidOptionalGroup {
                    name: name.to_owned(),
                })
            }
        })
        .collect()
}

/// Builds the anchored regex source for parsed segments.
fn render(segments: &[Segment], tokens: &HashMap<String, String>, wildcard: Option<&str>) -> String {
    let mut re = String::new();

    for (idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Const(literal) => re.push_str(&escape(literal)),

            Segment::Var(name) => push_capture(&mut re, name, tokens),

            Segment::Optional(names) => {
                // a group at the very start of the template provides the leading separator
                let leading = idx == 0;
                if leading {
                    re.push('/');
                }

                for (no, name) in names.iter().enumerate() {
                    re.push_str("(?:");
                    if !(leading && no == 0) {
                        re.push('/');
                    }
                    push_capture(&mut re, name, tokens);
                }

                for _ in names {
                    re.push_str(")?");
                }
            }
        }
    }

    if let Some(wildcard) = wildcard {
        let len = re.trim_end_matches('/').len();
        re.truncate(len);
        re.push_str("(?:/");
        push_named_group(&mut re, wildcard, WILDCARD_PATTERN);
        re.push_str(")?");
    }

    format!("{}^{}$", REGEX_FLAGS, re)
}

fn push_capture(re: &mut String, name: &str, tokens: &HashMap<String, String>) {
    let body = tokens.get(name).map_or(DEFAULT_PATTERN, String::as_str);
    push_named_group(re, name, body);
}

pub(crate) fn push_named_group(re: &mut String, name: &str, body: &str) {
    re.push_str("(?P<");
    re.push_str(name);
    re.push('>');
    re.push_str(body);
    re.push(')');
}

/// Returns true if `name` starts with an ASCII letter and continues with letters, digits or `_`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}
