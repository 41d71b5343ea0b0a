//! Settings file handling.
//!
//! Settings come from `searchdata.toml` (in the working directory, or the
//! path given with `--config`). Command-line flags and environment variables
//! override individual fields after loading.

use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "searchdata.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the generated shard files
    pub search_dir: Option<PathBuf>,
    pub cache: CacheSettings,
    pub lookup: LookupSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Overrides the platform cache directory
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupSettings {
    pub default_limit: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            default_limit: crate::search::DEFAULT_LIMIT,
        }
    }
}

impl Settings {
    /// Loads settings from `explicit`, or from [`CONFIG_FILE`] if present.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using default settings", CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let mut settings: Self = toml::from_str(text)?;
        settings.search_dir = settings.search_dir.map(expand_path);
        settings.cache.dir = settings.cache.dir.map(expand_path);
        Ok(settings)
    }

    /// Directory snapshots are written to, or `None` when caching is off.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if !self.cache.enabled {
            return None;
        }
        self.cache
            .dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME"))))
    }
}

/// [`expand_tilde`] for paths; non-UTF-8 paths are returned as given.
pub fn expand_path(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(expand_tilde(text).into_owned()),
        None => path,
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// `~/foo` becomes `$HOME/foo` and `~` becomes `$HOME`; anything else is
/// returned unchanged, borrowed.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
