//! Request path resolution
//!
//! ```text
//! <mount segments...>/<service alias>[/<call alias>[/<arg>...]]
//! ```
//!
//! The first `ignore` segments are the console's own mount point and are
//! echoed back untouched. Every remaining segment is reduced to the
//! `[A-Za-z0-9_\-,%]` alphabet. Argument segments are percent-decoded and
//! trimmed; a segment containing commas becomes a list of sub-arguments.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use svcprobe_sdk::Value;

/// One positional argument taken from the request path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawArgument {
    /// Segment without commas
    Scalar(String),
    /// Comma-separated segment
    List(Vec<String>),
}

impl RawArgument {
    /// Value handed to a method when the argument is passed through
    pub fn to_value(&self) -> Value {
        match self {
            RawArgument::Scalar(s) => Value::Str(s.clone()),
            RawArgument::List(items) => {
                Value::List(items.iter().map(|s| Value::Str(s.clone())).collect())
            }
        }
    }
}

/// A request path split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedRequest {
    /// Leading mount-point segments, not interpreted
    pub base: Vec<String>,
    /// Service alias, possibly empty
    pub service_alias: String,
    /// Call alias in hyphen-case, possibly empty
    pub call_alias: String,
    /// Positional arguments after the call alias
    pub raw_arguments: Vec<RawArgument>,
}

impl ParsedRequest {
    /// Mount prefix re-joined with `/`
    pub fn base_path(&self) -> String {
        self.base.join("/")
    }

    /// Arguments as the values a method would receive
    pub fn argument_values(&self) -> Vec<Value> {
        self.raw_arguments.iter().map(RawArgument::to_value).collect()
    }
}

/// Split `path` on `/`, discard the first `ignore` segments, and decode the rest.
pub fn parse_request(path: &str, ignore: usize) -> ParsedRequest {
    let mut segments = path.split('/');

    let base: Vec<String> = segments.by_ref().take(ignore).map(str::to_string).collect();

    let service_alias = segments.next().map(sanitize_segment).unwrap_or_default();
    let call_alias = segments.next().map(sanitize_segment).unwrap_or_default();
    let raw_arguments = segments
        .map(|segment| decode_argument(&sanitize_segment(segment)))
        .collect();

    ParsedRequest {
        base,
        service_alias,
        call_alias,
        raw_arguments,
    }
}

/// Drop every character outside `[A-Za-z0-9_\-,%]`
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ',' | '%'))
        .collect()
}

/// Decode one (already sanitized) argument segment.
///
/// The segment is decoded and trimmed before looking for commas, so an
/// encoded `%2C` splits the argument as well. Each piece is decoded and
/// trimmed again.
pub fn decode_argument(segment: &str) -> RawArgument {
    let decoded = decode_piece(segment);
    if decoded.contains(',') {
        RawArgument::List(decoded.split(',').map(decode_piece).collect())
    } else {
        RawArgument::Scalar(decoded)
    }
}

fn decode_piece(piece: &str) -> String {
    percent_decode_str(piece)
        .decode_utf8_lossy()
        .trim()
        .to_string()
}
