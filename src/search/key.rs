//! Decoding of the generator's escaped search keys.
//!
//! Raw keys look like `kappa_5ftimes_5fp_9340`: every character outside
//! `[a-z0-9]` is written as `_` followed by two lowercase hex digits, and a
//! trailing `_<decimal>` carries the entry's numeric id. Keys are normalized
//! once, at load time, so lookups can compare bytes directly.

/// A raw search key split into its normalized token and numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub token: String,
    pub id: Option<u32>,
}

/// Splits off the id suffix, unescapes the remainder and lowercases it.
pub fn decode_key(raw: &str) -> DecodedKey {
    let (body, id) = split_id(raw);
    DecodedKey {
        token: unescape(body).to_lowercase(),
        id,
    }
}

/// Folds user-typed text the same way keys are folded at load time.
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

fn split_id(raw: &str) -> (&str, Option<u32>) {
    if let Some((body, suffix)) = raw.rsplit_once('_')
        && !suffix.is_empty()
        && suffix.bytes().all(|b| b.is_ascii_digit())
        && let Ok(id) = suffix.parse::<u32>()
    {
        return (body, Some(id));
    }
    (raw, None)
}

/// Replaces `_xx` hex escapes with the bytes they encode.
///
/// An underscore not followed by two lowercase hex digits is kept as-is, so
/// keys written by hand (`kerr_horizon_radius`) survive unchanged. Invalid
/// UTF-8 produced by the escapes is replaced rather than rejected.
pub fn unescape(body: &str) -> String {
    if !body.contains('_') {
        return body.to_string();
    }

    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
