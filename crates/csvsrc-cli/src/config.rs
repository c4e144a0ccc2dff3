//! Connection configuration loading.
//!
//! A connection file is TOML with the same keys as [`SourceConfig`]:
//!
//! ```toml
//! paths = ["~/exports/**/*.csv", "/data/archive/*.csv.gz"]
//! separator = ";"
//! comment = "#"
//! header = "auto"
//! on_error = "skip"
//! ```

use std::path::{Path, PathBuf};

use csvsrc_model::{FailurePolicy, HeaderPolicy, SourceConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Reads a connection file.
pub fn load_config(path: &Path) -> Result<SourceConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Command-line values that take precedence over the connection file.
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    /// Replaces the file's `paths` when non-empty.
    pub paths: Vec<String>,
    pub separator: Option<String>,
    pub comment: Option<String>,
    pub header: Option<HeaderPolicy>,
    pub on_error: Option<FailurePolicy>,
}

impl SourceOverrides {
    pub fn apply(self, mut config: SourceConfig) -> SourceConfig {
        if !self.paths.is_empty() {
            config.paths = self.paths;
        }
        if self.separator.is_some() {
            config.separator = self.separator;
        }
        if self.comment.is_some() {
            config.comment = self.comment;
        }
        if let Some(header) = self.header {
            config.header = header;
        }
        if let Some(on_error) = self.on_error {
            config.on_error = on_error;
        }
        config
    }
}

/// Loads the optional connection file and applies overrides on top.
pub fn resolve_config(
    file: Option<&Path>,
    overrides: SourceOverrides,
) -> Result<SourceConfig, ConfigError> {
    let base = match file {
        Some(path) => load_config(path)?,
        None => SourceConfig::default(),
    };
    Ok(overrides.apply(base))
}
