//! Error handling types and utilities.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for index loading operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// A 1-based line/column location inside shard source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What exactly was wrong with a shard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("invalid shard syntax: {0}")]
    Syntax(String),

    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[error("entry is not an array")]
    EntryNotArray,

    #[error("entry is missing its key")]
    MissingKey,

    #[error("entry key is empty after decoding")]
    EmptyKey,

    #[error("entry is missing its label")]
    MissingLabel,

    #[error("entry is missing its destination list")]
    MissingDestinations,

    #[error("entry has an empty destination list")]
    EmptyDestinations,

    #[error("malformed destination #{index}: {reason}")]
    MalformedDestination { index: usize, reason: &'static str },
}

/// Error returned when shard text cannot be parsed into index entries.
///
/// Carries enough context to point at the offending input: the shard name
/// (when known), plus the zero-based entry index for entries that parsed but
/// do not fit the entry layout, or the source position for syntax errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    pub position: Option<Position>,
    pub entry: Option<usize>,
    pub shard: Option<String>,
}

impl FormatError {
    pub const fn new(kind: FormatErrorKind) -> Self {
        Self {
            kind,
            position: None,
            entry: None,
            shard: None,
        }
    }

    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub(crate) fn in_entry(mut self, entry: usize) -> Self {
        self.entry = Some(entry);
        self
    }

    pub(crate) fn in_shard(mut self, shard: impl Into<String>) -> Self {
        self.shard = Some(shard.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(shard) = &self.shard {
            write!(f, "shard '{}': ", shard)?;
        }
        match (self.entry, self.position) {
            (Some(entry), Some(position)) => write!(f, "entry {} at {}: ", entry, position)?,
            (Some(entry), None) => write!(f, "entry {}: ", entry)?,
            (None, Some(position)) => write!(f, "at {}: ", position)?,
            (None, None) => {}
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Any failure while loading shards or snapshots.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot cache error: {0}")]
    Cache(String),

    #[error("shard parsing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the format error if this failure was caused by malformed input.
    pub const fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }
}
