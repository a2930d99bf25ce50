//! Editor settings read from a TOML file.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::editor::{DEFAULT_HEIGHT, DEFAULT_PLACEHOLDER};
use crate::history::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Shown while the document is empty.
    pub placeholder: String,
    /// Rows the editing area asks for.
    pub height: u16,
    /// Undo steps kept per document.
    pub history_limit: usize,
    /// Widest line the renderer wraps to; wider terminals get padding.
    pub max_wrap_width: u16,
    pub status_timeout_secs: u64,
    /// Defaults to a `pagecraft/logs` directory under the system temp dir.
    pub log_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            height: DEFAULT_HEIGHT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_wrap_width: 100,
            status_timeout_secs: 4,
            log_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(path, &content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reads the explicit path if given, the default location otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("pagecraft").join("logs"))
    }
}

/// `$XDG_CONFIG_HOME/pagecraft/config.toml`, falling back to
/// `~/.config/pagecraft/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("pagecraft").join("config.toml"))
}
