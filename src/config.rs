//! Layered configuration: defaults, then a TOML file, then environment variables.
//!
//! Command-line flags are applied on top by [`crate::cli`].

use crate::search::MatchMode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const ENV_SEARCH_DIR: &str = "DOXYSEARCH_SEARCH_DIR";
pub const ENV_CACHE_DIR: &str = "DOXYSEARCH_CACHE_DIR";
pub const ENV_NO_CACHE: &str = "DOXYSEARCH_NO_CACHE";
pub const ENV_LIMIT: &str = "DOXYSEARCH_LIMIT";

const APP_DIR: &str = "doxysearch";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Search directory used when a request names none
    pub search_dir: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub cache_enabled: bool,
    /// Loaded catalogs kept in memory
    pub catalog_capacity: usize,
    pub default_limit: usize,
    pub default_mode: MatchMode,
    /// Minimum Jaro-Winkler similarity for suggestions
    pub suggestion_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dir: None,
            cache_dir: default_cache_dir(),
            cache_enabled: true,
            catalog_capacity: 50,
            default_limit: 10,
            default_mode: MatchMode::Prefix,
            suggestion_threshold: 0.8,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// `$XDG_CONFIG_HOME/doxysearch/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Loads the file layer and the environment layer.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.normalize();
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `DOXYSEARCH_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SEARCH_DIR).filter(|v| !v.is_empty()) {
            self.search_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_NO_CACHE) {
            match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.cache_enabled = false,
                "" | "0" | "false" | "no" => {}
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_NO_CACHE,
                        value,
                    });
                }
            }
        }
        if let Some(value) = lookup(ENV_LIMIT) {
            self.default_limit = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_LIMIT,
                value,
            })?;
        }
        Ok(())
    }

    /// Expands `~` in configured paths.
    pub fn normalize(&mut self) {
        if let Some(dir) = &self.search_dir {
            self.search_dir = Some(expand_tilde_path(dir));
        }
        self.cache_dir = expand_tilde_path(&self.cache_dir);
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.catalog_capacity == 0 {
            return Err(ConfigError::Invalid("catalog_capacity must be at least 1".into()));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid("default_limit must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(ConfigError::Invalid(format!(
                "suggestion_threshold must be between 0 and 1, got {}",
                self.suggestion_threshold
            )));
        }
        Ok(())
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
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

fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(expand_tilde(text).as_ref()),
        None => path.to_path_buf(),
    }
}
