//! Application configuration.
//!
//! Loaded once at startup from a JSON file (`config.json` by default) and
//! passed by reference into the pipeline. Missing optional fields fall back
//! to serde defaults; the merged result is validated before use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level application configuration.
///
/// Field names mirror the JSON config file (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Directory-searchable identifier of the oversight person who is
    /// cc'd on every auto-created task and notified of creation.
    pub oversight_person: String,
    /// Minimum extraction confidence for a task to be auto-created.
    pub confidence_threshold: f64,
    /// Whether high-confidence tasks are auto-created at all.
    pub auto_create_high_confidence: bool,
    pub rules: RulesConfig,
}

/// Phrase-level rule sets.
///
/// Validated for shape but not yet consulted by extraction or routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesConfig {
    pub ignore_patterns: Vec<String>,
    pub always_include: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oversight_person: String::new(),
            confidence_threshold: 0.8,
            auto_create_high_confidence: true,
            rules: RulesConfig::default(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "just thinking out loud".to_string(),
                "maybe we should".to_string(),
                "I wonder if".to_string(),
            ],
            always_include: vec![
                "action item".to_string(),
                "todo".to_string(),
                "task".to_string(),
                "follow up".to_string(),
                "will do".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oversight_person.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "oversightPerson must be a non-empty directory identifier".to_string(),
            ));
        }
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(ConfigError::Invalid(
                "confidenceThreshold must be a number between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an extraction confidence score clears the configured bar.
    pub fn is_high_confidence(&self, score: f64) -> bool {
        score >= self.confidence_threshold
    }
}

impl RulesConfig {
    /// True when the text contains any configured ignore phrase.
    pub fn matches_ignore_pattern(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.ignore_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }

    /// True when the text contains any configured task indicator.
    pub fn contains_task_indicator(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.always_include
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }
}

/// Read a required environment variable.
pub fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("missing required environment variable: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_config() {
        let file = write_config(
            r#"{
                "oversightPerson": "boss@example.com",
                "confidenceThreshold": 0.75,
                "autoCreateHighConfidence": true,
                "rules": { "ignorePatterns": ["maybe"], "alwaysInclude": ["action item"] }
            }"#,
        );

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.oversight_person, "boss@example.com");
        assert_eq!(config.confidence_threshold, 0.75);
        assert_eq!(config.rules.ignore_patterns, vec!["maybe"]);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let file = write_config(r#"{ "oversightPerson": "boss@example.com" }"#);

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.confidence_threshold, 0.8);
        assert!(config.auto_create_high_confidence);
        assert!(!config.rules.always_include.is_empty());
    }

    #[test]
    fn rejects_missing_oversight_person() {
        let file = write_config(r#"{ "confidenceThreshold": 0.8 }"#);
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let file = write_config(
            r#"{ "oversightPerson": "boss@example.com", "confidenceThreshold": 1.5 }"#,
        );
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        assert!(matches!(
            AppConfig::load("/nonexistent/config.json"),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn rule_helpers_are_case_insensitive() {
        let rules = RulesConfig::default();
        assert!(rules.matches_ignore_pattern("Just Thinking Out Loud here"));
        assert!(rules.contains_task_indicator("we have an ACTION ITEM"));
        assert!(!rules.matches_ignore_pattern("let's ship it"));
    }

    #[test]
    fn high_confidence_uses_configured_threshold() {
        let config = AppConfig {
            confidence_threshold: 0.7,
            ..AppConfig::default()
        };
        assert!(config.is_high_confidence(0.7));
        assert!(!config.is_high_confidence(0.69));
    }
}
