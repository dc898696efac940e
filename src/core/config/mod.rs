//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides
//! earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. An explicit path (the `--config` flag), which must exist
//! 2. `$GIT2P4_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/git2p4/config.toml`
//! 4. `~/.git2p4/config.toml` (canonical write location)
//!
//! Missing files are not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use git2p4::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("default branch: {}", config.default_branch());
//! println!("keep notes: {}", config.keep_notes());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, OutputDefaults};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied by accessor.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path of the file that was loaded, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (from the `--config` flag) must exist; the
    /// standard locations are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, or if any
    /// config file exists but cannot be read, parsed, or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (global, path) = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                (Self::read_file(path)?, Some(path.to_path_buf()))
            }
            None => Self::load_from_standard_locations()?,
        };
        global.validate()?;
        Ok(Self { global, path })
    }

    fn load_from_standard_locations() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        if let Ok(path) = std::env::var("GIT2P4_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("git2p4/config.toml");
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".git2p4/config.toml");
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    fn read_file(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The path of the loaded config file, if one was found.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Branch highlighted as the transfer trunk. Defaults to `main`.
    pub fn default_branch(&self) -> &str {
        self.global.default_branch.as_deref().unwrap_or("main")
    }

    /// Whether note changes are retained. Defaults to false.
    pub fn keep_notes(&self) -> bool {
        self.global.keep_notes.unwrap_or(false)
    }

    /// Whether output defaults to JSON. Defaults to false.
    pub fn json_default(&self) -> bool {
        self.global
            .output
            .as_ref()
            .and_then(|o| o.json)
            .unwrap_or(false)
    }

    /// Get the canonical path for the global config.
    ///
    /// Returns `~/.git2p4/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".git2p4/config.toml"))
    }

    /// Write the global config atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write (write
    /// to temp file, then rename) to prevent corruption.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WriteError` on any filesystem failure.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        Self::write_atomic(&path, config)?;
        Ok(path)
    }

    fn write_atomic(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let write = |temp: &Path| -> std::io::Result<()> {
            let mut file = fs::File::create(temp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(temp, path)
        };
        write(&temp_path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
