//! Percent-decoding of captured values and percent-encoding of generated path segments.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the RFC 3986 unreserved set (`A-Z a-z 0-9 - _ . ~`).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-decodes `val`, leaving `+` alone.
///
/// Returns the input unmodified when it contains no escape sequence. Invalid/incomplete sequences
/// are passed through as-is and decoded bytes that are not valid UTF-8 are replaced lossily.
pub(crate) fn decode(val: &str) -> Cow<'_, str> {
    percent_decode_str(val).decode_utf8_lossy()
}

/// Percent-encodes `val` for use as a single path segment.
pub(crate) fn encode(val: &str) -> Cow<'_, str> {
    utf8_percent_encode(val, SEGMENT).into()
}
