//! Reverse routing: building a concrete path from a route and parameter values.

use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

use crate::{
    error::GenerateError,
    params::ParamValue,
    pattern::Segment,
    quoter::encode,
    spec::RouteSpec,
};

/// Builds a path for `spec` from `data`, falling back to the route's default values.
///
/// Token values are percent-encoded as single path segments. The optional group is filled in
/// order and stops at the first name without a value. A wildcard value (a sequence, or a string
/// split on `/`) is appended segment by segment. Method, accept, server and predicate criteria
/// play no part in generation.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
///
/// use route_matcher::{generate, ParamValue, RouteSpec};
///
/// let spec = RouteSpec::new("/blog/{id}{/format}").with_token("id", r"\d+");
///
/// let mut data = HashMap::new();
/// data.insert("id", ParamValue::from("42"));
/// assert_eq!(generate(&spec, &data).unwrap(), "/blog/42");
///
/// data.insert("format", ParamValue::from("json"));
/// assert_eq!(generate(&spec, &data).unwrap(), "/blog/42/json");
/// ```
pub fn generate<K, S>(
    spec: &RouteSpec,
    data: &HashMap<K, ParamValue, S>,
) -> Result<String, GenerateError>
where
    K: Borrow<str> + Eq + Hash,
    S: BuildHasher,
{
    let compiled = spec.compile()?;

    let lookup = |name: &str| {
        data.get(name)
            .filter(|value| !value.is_empty())
            .or_else(|| spec.values().get(name).filter(|value| !value.is_empty()))
    };

    let mut path = String::with_capacity(spec.path().len());

    for (idx, segment) in compiled.segments().iter().enumerate() {
        match segment {
            Segment::Const(literal) => path.push_str(literal),

            Segment::Var(name) => {
                let value = lookup(name.as_str()).ok_or_else(|| GenerateError::MissingParam {
                    name: name.clone(),
                })?;
                push_value(&mut path, value);
            }

            Segment::Optional(names) => {
                let leading = idx == 0;
                if leading {
                    path.push('/');
                }

                let present = names.iter().map_while(|name| lookup(name.as_str()));

                for (no, value) in present.enumerate() {
                    if !(leading && no == 0) {
                        path.push('/');
                    }
                    push_value(&mut path, value);
                }
            }
        }
    }

    if let Some(value) = spec.wildcard().and_then(lookup) {
        let len = path.trim_end_matches('/').len();
        path.truncate(len);

        match value {
            ParamValue::Seq(segments) => {
                for segment in segments {
                    path.push('/');
                    path.push_str(&encode(segment));
                }
            }

            ParamValue::Str(raw) => {
                for segment in raw.split('/') {
                    path.push('/');
                    path.push_str(&encode(segment));
                }
            }

            ParamValue::Null => {}
        }
    }

    Ok(path)
}

fn push_value(path: &mut String, value: &ParamValue) {
    match value {
        ParamValue::Str(val) => path.push_str(&encode(val)),

        ParamValue::Seq(segments) => {
            for (no, segment) in segments.iter().enumerate() {
                if no > 0 {
                    path.push('/');
                }
                path.push_str(&encode(segment));
            }
        }

        ParamValue::Null => {}
    }
}
