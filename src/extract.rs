//! Parameter extraction from a successful match.

use std::collections::HashMap;

use crate::{
    params::{ParamValue, Params},
    predicate::Captures,
    quoter::decode,
};

/// Builds route parameters from the route's defaults and the captured values.
///
/// Defaults come first. Every non-empty capture with a non-numeric key then overrides them,
/// percent-decoded. When the route has a wildcard, its resulting value is then split on `/` and
/// each segment is percent-decoded again.
pub(crate) fn extract(
    defaults: &HashMap<String, ParamValue>,
    captures: &Captures,
    wildcard: Option<&str>,
) -> Params {
    let mut params = Params::from(defaults.clone());

    for (name, value) in captures {
        if value.is_empty() || is_positional(name) {
            continue;
        }

        params.insert(name.clone(), ParamValue::Str(decode(value).into_owned()));
    }

    if let Some(wildcard) = wildcard {
        let segments = match params.get(wildcard) {
            Some(ParamValue::Str(val)) => split_segments(val),
            Some(ParamValue::Seq(seq)) => seq.clone(),
            _ => Vec::new(),
        };

        params.insert(wildcard.to_owned(), ParamValue::Seq(segments));
    }

    params
}

/// Splits a wildcard value on `/` and percent-decodes each segment.
fn split_segments(val: &str) -> Vec<String> {
    if val.is_empty() {
        return Vec::new();
    }

    val.split('/')
        .map(|segment| decode(segment).into_owned())
        .collect()
}

fn is_positional(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(pairs: &[(&str, &str)]) -> Captures {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_then_captures() {
        let mut defaults = HashMap::new();
        defaults.insert("controller".to_owned(), ParamValue::from("blog"));
        defaults.insert("format".to_owned(), ParamValue::from("html"));
        defaults.insert("id".to_owned(), ParamValue::Null);

        let params = extract(&defaults, &captures(&[("id", "42"), ("format", "")]), None);
        assert_eq!(params.get_str("controller"), Some("blog"));
        assert_eq!(params.get_str("id"), Some("42"));
        // empty captures keep the default
        assert_eq!(params.get_str("format"), Some("html"));
    }

    #[test]
    fn absent_tokens_stay_null() {
        let mut defaults = HashMap::new();
        defaults.insert("day".to_owned(), ParamValue::Null);

        let params = extract(&defaults, &Captures::new(), None);
        assert!(params["day"].is_null());
        assert!(params.contains_key("day"));
    }

    #[test]
    fn captures_are_decoded() {
        let params = extract(
            &HashMap::new(),
            &captures(&[("name", "John%20Doe"), ("q", "a+b")]),
            None,
        );
        assert_eq!(params.get_str("name"), Some("John Doe"));
        assert_eq!(params.get_str("q"), Some("a+b"));
    }

    #[test]
    fn positional_keys_are_skipped() {
        let params = extract(&HashMap::new(), &captures(&[("0", "x"), ("12", "y")]), None);
        assert!(params.is_empty());
    }

    #[test]
    fn wildcard_segments() {
        let params = extract(
            &HashMap::new(),
            &captures(&[("path", "a/b/d%20e")]),
            Some("path"),
        );
        assert_eq!(
            params.get_seq("path"),
            Some(&["a".to_owned(), "b".to_owned(), "d e".to_owned()][..])
        );
    }

    #[test]
    fn wildcard_splits_after_decoding() {
        // encoded separators become segment boundaries
        let params = extract(&HashMap::new(), &captures(&[("path", "a%2Fb")]), Some("path"));
        assert_eq!(
            params.get_seq("path"),
            Some(&["a".to_owned(), "b".to_owned()][..])
        );

        // segments are decoded a second time
        let params = extract(&HashMap::new(), &captures(&[("path", "x%2541")]), Some("path"));
        assert_eq!(params.get_seq("path"), Some(&["xA".to_owned()][..]));
    }

    #[test]
    fn wildcard_without_capture() {
        let params = extract(&HashMap::new(), &Captures::new(), Some("path"));
        assert_eq!(params.get_seq("path"), Some(&[][..]));

        let mut defaults = HashMap::new();
        defaults.insert("path".to_owned(), ParamValue::from("docs/index"));
        let params = extract(&defaults, &Captures::new(), Some("path"));
        assert_eq!(
            params.get_seq("path"),
            Some(&["docs".to_owned(), "index".to_owned()][..])
        );

        defaults.insert("path".to_owned(), ParamValue::from(vec!["x", "y"]));
        let params = extract(&defaults, &Captures::new(), Some("path"));
        assert_eq!(
            params.get_seq("path"),
            Some(&["x".to_owned(), "y".to_owned()][..])
        );
    }
}
