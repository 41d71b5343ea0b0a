//! Index entry and destination types.

use crate::error::FormatErrorKind;
use crate::markup::decode_entities;
use crate::search::key::decode_key;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How the search widget opens a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkTarget {
    /// Replace the page hosting the search frame (generator flag `1`).
    Parent,
    /// Open in a new window (generator flag `0`).
    Blank,
}

impl LinkTarget {
    pub const fn from_flag(flag: i64) -> Self {
        if flag == 0 { Self::Blank } else { Self::Parent }
    }
}

/// A single documented location a key's label resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    url: String,
    target: LinkTarget,
    owner: String,
}

impl Destination {
    pub fn new(url: impl Into<String>, target: LinkTarget, owner: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target,
            owner: owner.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn target(&self) -> LinkTarget {
        self.target
    }

    /// Scope the symbol lives in, as markup (e.g. `std::map::key_comp()`).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn plain_owner(&self) -> Cow<'_, str> {
        decode_entities(&self.owner)
    }

    /// Whether the URL points outside the generated site (tag-file links).
    pub fn is_external(&self) -> bool {
        self.url.contains("://")
    }

    /// Resolves a site-relative URL against the root of the generated HTML.
    ///
    /// Shards live one directory below the site root, so their relative URLs
    /// start with `../`. External URLs are returned unchanged.
    pub fn resolve(&self, site_root: &str) -> String {
        if self.is_external() {
            return self.url.clone();
        }
        let relative = self.url.strip_prefix("../").unwrap_or(&self.url);
        if site_root.is_empty() {
            return relative.to_string();
        }
        format!("{}/{}", site_root.trim_end_matches('/'), relative)
    }
}

/// One (key → label + destinations) record.
///
/// Entries are immutable once built; the constructor enforces that the key
/// is non-empty and that at least one destination exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    key: String,
    id: Option<u32>,
    raw_key: String,
    label: String,
    destinations: Vec<Destination>,
}

impl Entry {
    /// Builds an entry from the generator's raw key, normalizing it.
    pub fn new(
        raw_key: impl Into<String>,
        label: impl Into<String>,
        destinations: Vec<Destination>,
    ) -> Result<Self, FormatErrorKind> {
        let raw_key = raw_key.into();
        let decoded = decode_key(&raw_key);
        if decoded.token.is_empty() {
            return Err(FormatErrorKind::EmptyKey);
        }
        if destinations.is_empty() {
            return Err(FormatErrorKind::EmptyDestinations);
        }

        Ok(Self {
            key: decoded.token,
            id: decoded.id,
            raw_key,
            label: label.into(),
            destinations,
        })
    }

    /// Normalized, lowercase search token.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Numeric id the generator appended to the raw key, if any.
    pub const fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn plain_label(&self) -> Cow<'_, str> {
        decode_entities(&self.label)
    }

    /// Never empty.
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn primary(&self) -> &Destination {
        &self.destinations[0]
    }

    /// True when the name resolves to several documented entities.
    pub fn is_overloaded(&self) -> bool {
        self.destinations.len() > 1
    }
}
