//! Shard text to index entries.
//!
//! The array literal is read with `serde_json5`, which covers the relaxed
//! JavaScript the generator writes (single quotes, comments, trailing
//! commas). Each top-level element is then checked against the entry layout
//! `[key, [label, destination...]]`.

use crate::error::{FormatError, FormatErrorKind, Position};
use crate::types::{Destination, Entry, LinkTarget};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// `var searchData =` in front of the array literal.
static PRELUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:var|let|const)\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=")
        .expect("valid prelude regex")
});

/// Reduces a shard file to its array literal.
///
/// The declaration is blanked rather than cut so that line and column
/// numbers in syntax errors still point into the original file.
fn array_literal(src: &str) -> String {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    let body = src.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body);

    match PRELUDE.find(body) {
        Some(prelude) => {
            let blank: String = prelude
                .as_str()
                .chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect();
            blank + &body[prelude.end()..]
        }
        None => body.to_string(),
    }
}

fn syntax_error(err: serde_json5::Error) -> FormatError {
    match err {
        serde_json5::Error::Message { msg, location } => {
            let error = FormatError::new(FormatErrorKind::Syntax(summarize(&msg)));
            match location {
                Some(loc) => error.at(Position::new(
                    u32::try_from(loc.line).unwrap_or(u32::MAX),
                    u32::try_from(loc.column).unwrap_or(u32::MAX),
                )),
                None => error,
            }
        }
        #[allow(unreachable_patterns)]
        other => FormatError::new(FormatErrorKind::Syntax(other.to_string())),
    }
}

/// Parser messages carry a rendered source excerpt; keep the `= expected ...`
/// line, or the first line when there is none.
fn summarize(msg: &str) -> String {
    msg.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("= "))
        .or_else(|| msg.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or(msg)
        .to_string()
}

/// Parses shard text into entries, in source order.
pub(crate) fn parse_entries(src: &str) -> Result<Vec<Entry>, FormatError> {
    let nodes: Vec<Value> = serde_json5::from_str(&array_literal(src)).map_err(syntax_error)?;
    nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            entry_from_node(node).map_err(|kind| FormatError::new(kind).in_entry(index))
        })
        .collect()
}

fn entry_from_node(node: Value) -> Result<Entry, FormatErrorKind> {
    let Value::Array(items) = node else {
        return Err(FormatErrorKind::EntryNotArray);
    };
    let mut items = items.into_iter();

    let raw_key = match items.next() {
        None => return Err(FormatErrorKind::MissingKey),
        Some(Value::String(key)) => key,
        Some(other) => return Err(expected("key string", &other)),
    };
    let body = match items.next() {
        None => return Err(FormatErrorKind::MissingLabel),
        Some(Value::Array(body)) => body,
        Some(other) => return Err(expected("label and destinations array", &other)),
    };
    if let Some(extra) = items.next() {
        return Err(expected("end of entry", &extra));
    }

    let mut body = body.into_iter();
    let label = match body.next() {
        None => return Err(FormatErrorKind::MissingLabel),
        Some(Value::String(label)) => label,
        Some(other) => return Err(expected("label string", &other)),
    };

    let destinations = destination_list(body.collect())?
        .into_iter()
        .enumerate()
        .map(|(index, node)| destination_from_node(index, node))
        .collect::<Result<Vec<_>, _>>()?;

    Entry::new(raw_key, label, destinations)
}

/// Accepts both the generator's flat layout `[label, dest, dest]` and the
/// nested layout `[label, [dest, dest]]`.
fn destination_list(mut rest: Vec<Value>) -> Result<Vec<Value>, FormatErrorKind> {
    if let [Value::Array(inner)] = rest.as_mut_slice()
        && inner.first().is_none_or(Value::is_array)
    {
        if inner.is_empty() {
            return Err(FormatErrorKind::EmptyDestinations);
        }
        return Ok(std::mem::take(inner));
    }

    if rest.is_empty() {
        return Err(FormatErrorKind::MissingDestinations);
    }
    Ok(rest)
}

fn destination_from_node(index: usize, node: Value) -> Result<Destination, FormatErrorKind> {
    let malformed = |reason| FormatErrorKind::MalformedDestination { index, reason };

    let Value::Array(parts) = node else {
        return Err(malformed("not an array"));
    };

    let mut parts = parts.into_iter();
    let (url, target, owner) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (None, ..) => return Err(malformed("empty destination")),
        (Some(url), Some(owner), None, None) => (url, LinkTarget::Parent, owner),
        (Some(url), Some(flag), Some(owner), None) => {
            let Some(flag) = link_flag(&flag) else {
                return Err(malformed("link flag is not an integer"));
            };
            (url, LinkTarget::from_flag(flag), owner)
        }
        _ => return Err(malformed("expected [url, flag, owner]")),
    };

    let url = match url {
        Value::String(url) if !url.is_empty() => url,
        Value::String(_) => return Err(malformed("empty url")),
        _ => return Err(malformed("url is not a string")),
    };
    let Value::String(owner) = owner else {
        return Err(malformed("owner is not a string"));
    };

    Ok(Destination::new(url, target, owner))
}

/// JSON5 numbers may come back as floats; `1.0` is still flag `1`.
#[allow(clippy::cast_possible_truncation)]
fn link_flag(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => format!("boolean {}", flag),
        Value::Number(number) => format!("number {}", number),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

fn expected(what: &'static str, found: &Value) -> FormatErrorKind {
    FormatErrorKind::Expected {
        expected: what,
        found: describe(found),
    }
}
