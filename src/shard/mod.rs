//! Shard files: naming, parsing and per-shard metadata.
//!
//! The generator partitions the search index into files named
//! `<category>_<hex bucket>.js` (`all_17.js`, `functions_a.js`). Names only
//! matter for ordering and for category filters; a shard named anything else
//! still loads.

mod parser;

use crate::error::FormatError;
use crate::types::Entry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

static BUCKET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)_([0-9a-f]+)$").expect("valid bucket regex"));

/// Symbol category a shard belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    All,
    Classes,
    Namespaces,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    EnumValues,
    Related,
    Defines,
    Groups,
    Pages,
    Concepts,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Classes => "classes",
            Self::Namespaces => "namespaces",
            Self::Files => "files",
            Self::Functions => "functions",
            Self::Variables => "variables",
            Self::Typedefs => "typedefs",
            Self::Enums => "enums",
            Self::EnumValues => "enumvalues",
            Self::Related => "related",
            Self::Defines => "defines",
            Self::Groups => "groups",
            Self::Pages => "pages",
            Self::Concepts => "concepts",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "classes" => Self::Classes,
            "namespaces" => Self::Namespaces,
            "files" => Self::Files,
            "functions" => Self::Functions,
            "variables" => Self::Variables,
            "typedefs" => Self::Typedefs,
            "enums" => Self::Enums,
            "enumvalues" => Self::EnumValues,
            "related" => Self::Related,
            "defines" => Self::Defines,
            "groups" => Self::Groups,
            "pages" => Self::Pages,
            "concepts" => Self::Concepts,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed shard file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardName {
    pub name: String,
    pub category: Category,
    pub bucket: Option<u32>,
}

impl ShardName {
    /// Interprets a file stem such as `functions_a`.
    pub fn parse(stem: &str) -> Self {
        if let Some(caps) = BUCKET_NAME.captures(stem)
            && let Ok(bucket) = u32::from_str_radix(&caps[2], 16)
        {
            return Self {
                name: stem.to_string(),
                category: caps[1].parse().unwrap_or(Category::Other(caps[1].to_string())),
                bucket: Some(bucket),
            };
        }

        Self {
            name: stem.to_string(),
            category: Category::Other(stem.to_string()),
            bucket: None,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        Self::parse(&stem)
    }

    /// Ordering used when merging shards: category, then bucket, then name.
    pub fn sort_key(&self) -> (&Category, Option<u32>, &str) {
        (&self.category, self.bucket, &self.name)
    }
}

impl fmt::Display for ShardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str("<unnamed>")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Metadata kept about every shard merged into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    pub name: ShardName,
    pub path: Option<PathBuf>,
    pub entries: usize,
}

/// A parsed shard: its metadata plus entries in source order.
#[derive(Debug, Clone)]
pub struct Shard {
    pub info: ShardInfo,
    pub entries: Vec<Entry>,
}

impl Shard {
    /// Parses shard text. Errors are tagged with the shard name when it has one.
    pub fn parse(name: ShardName, src: &str) -> Result<Self, FormatError> {
        let entries = parser::parse_entries(src).map_err(|err| {
            if name.name.is_empty() {
                err
            } else {
                err.in_shard(name.name.clone())
            }
        })?;

        Ok(Self {
            info: ShardInfo {
                name,
                path: None,
                entries: entries.len(),
            },
            entries,
        })
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.info.path = Some(path.into());
        self
    }
}
