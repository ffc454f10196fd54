//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Project;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gear configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// AI collaborator settings
    pub ai: AiConfig,
}

/// Settings for the AI collaborator
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: Option<bool>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub api_key: Option<String>,
}

impl AiConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// API key from config, then `GEMINI_API_KEY`, then `API_KEY`
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    fn merge(&mut self, other: AiConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/gear/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (.gear/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.gear_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 3. Environment variables
        if let Ok(enabled) = std::env::var("GEAR_AI_ENABLED") {
            config.ai.enabled = parse_flag(&enabled);
        }
        if let Ok(model) = std::env::var("GEAR_AI_MODEL") {
            config.ai.model = Some(model);
        }
        if let Ok(endpoint) = std::env::var("GEAR_AI_ENDPOINT") {
            config.ai.endpoint = Some(endpoint);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let commented_out = contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
        if commented_out {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gear")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.ai.merge(other.ai);
    }
}

/// Parse a boolean-ish environment value
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_overrides() {
        let mut base = Config::default();
        let project: Config = serde_yml::from_str(
            "default_format: json\nai:\n  enabled: false\n  model: gemini-test\n",
        )
        .unwrap();
        base.merge(project);

        assert_eq!(base.default_format.as_deref(), Some("json"));
        assert!(!base.ai.enabled());
        assert_eq!(base.ai.model(), "gemini-test");
        assert_eq!(base.ai.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = Config {
            default_format: Some("yaml".into()),
            ai: AiConfig {
                timeout_secs: Some(5),
                ..AiConfig::default()
            },
        };
        base.merge(Config::default());
        assert_eq!(base.default_format.as_deref(), Some("yaml"));
        assert_eq!(base.ai.timeout_secs(), 5);
    }

    #[test]
    fn test_defaults() {
        let ai = AiConfig::default();
        assert!(ai.enabled());
        assert_eq!(ai.model(), DEFAULT_MODEL);
        assert_eq!(ai.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
