//! Plain-text rendering of the HTML character references found in labels.
//!
//! Labels and owner labels are written for direct insertion into a web page,
//! so they carry references like `&lt;`, `&amp;` and `&#160;`. Terminal and
//! tool output wants the characters themselves.

use std::borrow::Cow;

/// Replaces HTML character references with the characters they name.
///
/// Unknown or malformed references are left untouched. Returns the input
/// borrowed when it contains no `&` at all.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').and_then(|end| {
            decode_reference(&candidate[1..end]).map(|ch| (ch, end))
        }) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
