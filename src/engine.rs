//! Abstraction over `regex` and `regex-lite` depending on whether we have `unicode` crate feature
//! enabled.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "unicode")] {
        pub(crate) use regex::{escape, Error, Regex};
    } else {
        pub(crate) use regex_lite::{escape, Error, Regex};
    }
}

/// Regex flags to allow '.' in regex to match '\n' and to anchor `$` at the end of input only.
///
/// See the docs under: https://docs.rs/regex/1/regex/#grouping-and-flags
pub(crate) const REGEX_FLAGS: &str = "(?s-m)";
