//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>` or `$XDG_CONFIG_HOME/tldtally/tldtally.toml`
//! 3. Environment variables: `TLDTALLY_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{NoSeparatorPolicy, TldExtractor, DEFAULT_SEPARATOR};

/// Unified configuration for tldtally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Character splitting the TLD off a hostname (default: '.')
    pub separator: char,
    /// Handling of hostnames without a separator (default: reject)
    pub no_separator: NoSeparatorPolicy,
    /// Print line counters after the report
    pub summary: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            no_separator: NoSeparatorPolicy::default(),
            summary: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub separator: Option<char>,
    pub no_separator: Option<NoSeparatorPolicy>,
    pub summary: Option<bool>,
}

/// Get the XDG config directory for tldtally.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tldtally").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tldtally.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Extraction rules derived from these settings.
    pub fn extractor(&self) -> TldExtractor {
        TldExtractor::new(self.separator, self.no_separator)
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            separator: overlay.separator.unwrap_or(self.separator),
            no_separator: overlay.no_separator.unwrap_or(self.no_separator),
            summary: overlay.summary.unwrap_or(self.summary),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; replaces the global lookup and
    ///   must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        match config_file {
            Some(path) => {
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply TLDTALLY_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TLDTALLY").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("separator") {
            settings.separator = single_char(&val)?;
        }
        if let Ok(val) = config.get_string("no_separator") {
            settings.no_separator = val.parse().map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("summary") {
            settings.summary = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tldtally configuration
#
# Locations (by precedence, lowest to highest):
#   File:  ~/.config/tldtally/tldtally.toml  (or --config <path>)
#   Env:   TLDTALLY_* environment variables
#   Flags: command line options

# Character that separates the top-level domain from the rest of the hostname
# separator = "."

# Hostnames without a separator: "reject" skips them, "whole-hostname" counts
# the entire hostname as its own TLD
# no_separator = "reject"

# Print line counters (accepted, out of range, malformed) after the report
# summary = false
"#
        .to_string()
    }
}

fn single_char(val: &str) -> Result<char, ApplicationError> {
    let mut chars = val.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("separator must be a single character: {:?}", val),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_uses_dot_and_reject() {
        let settings = Settings::default();
        assert_eq!(settings.separator, '.');
        assert_eq!(settings.no_separator, NoSeparatorPolicy::Reject);
        assert!(!settings.summary);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let overlay = RawSettings {
            separator: None,
            no_separator: Some(NoSeparatorPolicy::WholeHostname),
            summary: None,
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.separator, '.');
        assert_eq!(merged.no_separator, NoSeparatorPolicy::WholeHostname);
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings {
            separator: ':',
            no_separator: NoSeparatorPolicy::WholeHostname,
            summary: true,
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("no_separator = \"whole-hostname\""), "{}", text);
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }

    #[test]
    fn given_multi_char_separator_when_validating_then_fails() {
        assert!(single_char("::").is_err());
        assert!(single_char("").is_err());
        assert_eq!(single_char("/").unwrap(), '/');
    }
}
