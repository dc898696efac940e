//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GIT2P4_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/git2p4/config.toml`
//! 3. `~/.git2p4/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the default branch must be a valid branch
//! name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RefName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_branch = "main"
/// keep_notes = false
///
/// [output]
/// json = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Branch highlighted as the transfer trunk in listings
    pub default_branch: Option<String>,

    /// Retain note changes on parsed commits
    pub keep_notes: Option<bool>,

    /// Output defaults
    pub output: Option<OutputDefaults>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.default_branch {
            RefName::new(format!("refs/heads/{branch}")).map_err(|_| {
                ConfigError::InvalidValue(format!("invalid default_branch '{branch}'"))
            })?;
        }
        Ok(())
    }
}

/// Output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDefaults {
    /// Emit machine-readable JSON without the `--json` flag
    pub json: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GlobalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_branch, None);
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
            default_branch = "trunk"
            keep_notes = true

            [output]
            json = true
        "#;
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_branch.as_deref(), Some("trunk"));
        assert_eq!(config.keep_notes, Some(true));
        assert_eq!(config.output.unwrap().json, Some(true));
        let config: GlobalConfig = toml::from_str("").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<GlobalConfig>("unknown_key = 1").is_err());
    }

    #[test]
    fn invalid_default_branch_fails_validation() {
        let config = GlobalConfig {
            default_branch: Some("bad..name".into()),
            ..GlobalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = GlobalConfig {
            default_branch: Some("main".into()),
            keep_notes: Some(false),
            output: Some(OutputDefaults { json: Some(true) }),
        };
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: GlobalConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
