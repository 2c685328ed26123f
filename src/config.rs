// ABOUTME: Configuration for helper registration and engine behavior
// ABOUTME: Loads settings from YAML files and merges HBS_HELPERS_* environment overrides

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::helpers::HelperGroup;

const CONFIG_FILES: [&str; 3] = ["hbs-helpers.yaml", "hbs-helpers.yml", ".hbs-helpers.yaml"];

/// How rendered values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    #[default]
    Html,
    None,
}

impl FromStr for EscapeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(EscapeMode::Html),
            "none" => Ok(EscapeMode::None),
            other => bail!("unknown escape mode: {}", other),
        }
    }
}

impl fmt::Display for EscapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeMode::Html => f.write_str("html"),
            EscapeMode::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default = "default_groups")]
    pub groups: Vec<HelperGroup>,

    #[serde(default)]
    pub strict_mode: bool,

    #[serde(default)]
    pub escape: EscapeMode,

    /// Prepended to every helper name when registering.
    #[serde(default)]
    pub prefix: Option<String>,
}

fn default_groups() -> Vec<HelperGroup> {
    HelperGroup::ALL.to_vec()
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            strict_mode: false,
            escape: EscapeMode::Html,
            prefix: None,
        }
    }
}

impl HelperConfig {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file()?,
        };

        let mut config = if config_path.exists() {
            debug!("Loading helper configuration from {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_yaml(&contents)?
        } else {
            HelperConfig::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit rather than a mapping
        if contents.trim().is_empty() {
            return Ok(HelperConfig::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        for name in CONFIG_FILES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(path);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".hbs-helpers").join("config.yaml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Default path, may not exist
        Ok(PathBuf::from(CONFIG_FILES[0]))
    }

    /// Merge environment variables into configuration
    pub fn merge_env(&mut self) -> Result<()> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `var`, which maps a variable name to its value.
    pub fn merge_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(groups) = var("HBS_HELPERS_GROUPS") {
            self.groups = groups
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(HelperGroup::from_str)
                .collect::<std::result::Result<Vec<_>, _>>()?;
        }
        if let Some(strict) = var("HBS_HELPERS_STRICT") {
            self.strict_mode = parse_flag(&strict)?;
        }
        if let Some(escape) = var("HBS_HELPERS_ESCAPE") {
            self.escape = escape.parse()?;
        }
        if let Some(prefix) = var("HBS_HELPERS_PREFIX") {
            self.prefix = Some(prefix).filter(|p| !p.is_empty());
        }
        Ok(())
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("invalid boolean value: {}", other),
    }
}
