use std::path::PathBuf;

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::pack::PackingConfig;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Caption language, or a comma-separated fallback list
    pub caption_language: Option<String>,
    /// Maximum characters per block
    pub block_size: Option<usize>,
    pub include_timestamps: Option<bool>,
    /// Nest caption blocks under the source block instead of adding siblings
    pub indent_captions: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/ytblocks/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytblocks")
        .join("config.toml")
}

/// Per-invocation overrides, typically from command-line flags
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub caption_language: Option<String>,
    pub block_size: Option<usize>,
    pub include_timestamps: Option<bool>,
    pub indent_captions: Option<bool>,
}

/// Settings read at invocation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub languages: Vec<String>,
    pub packing: PackingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            languages: parse_languages(DEFAULT_LANGUAGE),
            packing: PackingConfig::default(),
        }
    }
}

impl Settings {
    /// Layer overrides over the config file over built-in defaults
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self> {
        let defaults = PackingConfig::default();

        let language = overrides
            .caption_language
            .as_deref()
            .or(config.caption_language.as_deref())
            .unwrap_or(DEFAULT_LANGUAGE);

        let max_block_chars = overrides
            .block_size
            .or(config.block_size)
            .unwrap_or(defaults.max_block_chars);
        if max_block_chars == 0 {
            bail!("block size must be a positive number of characters");
        }

        Ok(Self {
            languages: parse_languages(language),
            packing: PackingConfig {
                max_block_chars,
                include_timestamps: overrides
                    .include_timestamps
                    .or(config.include_timestamps)
                    .unwrap_or(defaults.include_timestamps),
                indent_under_source: overrides
                    .indent_captions
                    .or(config.indent_captions)
                    .unwrap_or(defaults.indent_under_source),
            },
        })
    }
}

/// Split a comma-separated language setting into an ordered preference list
pub fn parse_languages(setting: &str) -> Vec<String> {
    setting
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
caption_language = "es, en"
block_size = 500
include_timestamps = false
indent_captions = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.caption_language.as_deref(), Some("es, en"));
        assert_eq!(config.block_size, Some(500));
        assert_eq!(config.include_timestamps, Some(false));
        assert_eq!(config.indent_captions, Some(false));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.caption_language.is_none());
        assert!(config.block_size.is_none());
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(&Config::default(), &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.languages, vec!["en"]);
        assert_eq!(settings.packing.max_block_chars, 1000);
        assert!(settings.packing.include_timestamps);
        assert!(settings.packing.indent_under_source);
    }

    #[test]
    fn test_overrides_take_priority() {
        let config: Config = toml::from_str(
            r#"
caption_language = "fr"
block_size = 200
include_timestamps = false
"#,
        )
        .unwrap();
        let overrides = Overrides {
            caption_language: Some("de,en".to_string()),
            indent_captions: Some(false),
            ..Overrides::default()
        };

        let settings = Settings::resolve(&config, &overrides).unwrap();
        assert_eq!(settings.languages, vec!["de", "en"]);
        assert_eq!(settings.packing.max_block_chars, 200);
        assert!(!settings.packing.include_timestamps);
        assert!(!settings.packing.indent_under_source);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let overrides = Overrides {
            block_size: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::resolve(&Config::default(), &overrides).is_err());
    }

    #[test]
    fn test_parse_languages() {
        assert_eq!(parse_languages("en"), vec!["en"]);
        assert_eq!(parse_languages(" es , en ,fr"), vec!["es", "en", "fr"]);
        assert_eq!(parse_languages("en,en"), vec!["en", "en"]);
        assert_eq!(parse_languages("en,,"), vec!["en"]);
        assert!(parse_languages("").is_empty());
    }
}
