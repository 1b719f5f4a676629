#![deny(unsafe_code)]

//! Configuration loading and validation for Canopy.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`EngineConfig`] type as the central configuration structure
//! shared by the engine and the reference host.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Selection behaviour.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Where the host reads the hierarchy listing from.
    #[serde(default)]
    pub hierarchy: HierarchyConfig,

    /// Where the host persists the clopen map between sessions.
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What happens when a new pick would exceed the selection capacity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Drop the longest-resident member (FIFO).
    #[default]
    EvictOldest,
    /// Drop every member and keep only the newest pick.
    ReplaceAll,
}

/// How clicks on leaves are interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickMode {
    /// Every click toggles membership; modifiers are ignored.
    #[default]
    Toggle,
    /// A plain click replaces the selection; a modified click adds to it.
    Modifier,
}

/// Selection configuration.
///
/// ## TOML Example
///
/// ```toml
/// [selection]
/// max_selections = 2
/// overflow = "evict-oldest"
/// click_mode = "toggle"
/// persist_leaves = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum number of selected leaves. Absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,

    /// Overflow policy applied when the capacity is exceeded.
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Click interpretation.
    #[serde(default)]
    pub click_mode: ClickMode,

    /// Mirror leaf membership into the clopen map.
    #[serde(default = "default_persist_leaves")]
    pub persist_leaves: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_selections: None,
            overflow: OverflowPolicy::default(),
            click_mode: ClickMode::default(),
            persist_leaves: default_persist_leaves(),
        }
    }
}

impl SelectionConfig {
    /// The configured capacity, or `None` when unbounded.
    ///
    /// A zero capacity is rejected by [`EngineConfig::validate`]; if one slips
    /// through it is treated as unbounded.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.max_selections.and_then(NonZeroUsize::new)
    }
}

fn default_persist_leaves() -> bool {
    true
}

/// Hierarchy source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Path to the JSON hierarchy listing.
    #[serde(default = "default_hierarchy_path")]
    pub path: String,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            path: default_hierarchy_path(),
        }
    }
}

fn default_hierarchy_path() -> String {
    "hierarchy.json".to_string()
}

/// Clopen map persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON file holding the clopen map.
    #[serde(default = "default_clopen_path")]
    pub clopen_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            clopen_path: default_clopen_path(),
        }
    }
}

fn default_clopen_path() -> String {
    "canopy-state.json".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = content.len(), "Loaded config file");
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.max_selections == Some(0) {
            return Err(ConfigError::Validation(
                "selection.max_selections must be at least 1 (omit it for unbounded)".to_string(),
            ));
        }
        if self.hierarchy.path.is_empty() {
            return Err(ConfigError::Validation(
                "hierarchy.path must not be empty".to_string(),
            ));
        }
        if self.state.clopen_path.is_empty() {
            return Err(ConfigError::Validation(
                "state.clopen_path must not be empty".to_string(),
            ));
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.selection.max_selections, None);
        assert_eq!(config.selection.overflow, OverflowPolicy::EvictOldest);
        assert_eq!(config.selection.click_mode, ClickMode::Toggle);
        assert!(config.selection.persist_leaves);
        assert_eq!(config.hierarchy.path, "hierarchy.json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config.selection.capacity(), None);
        assert_eq!(config.state.clopen_path, "canopy-state.json");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [selection]
            max_selections = 2
            overflow = "replace-all"
            click_mode = "modifier"
            persist_leaves = false

            [hierarchy]
            path = "/srv/data/hierarchy.json"

            [state]
            clopen_path = "/tmp/clopen.json"

            [logging]
            level = "debug"
        "#;
        let config = EngineConfig::parse(toml).unwrap();
        assert_eq!(config.selection.capacity(), NonZeroUsize::new(2));
        assert_eq!(config.selection.overflow, OverflowPolicy::ReplaceAll);
        assert_eq!(config.selection.click_mode, ClickMode::Modifier);
        assert!(!config.selection.persist_leaves);
        assert_eq!(config.hierarchy.path, "/srv/data/hierarchy.json");
        assert_eq!(config.state.clopen_path, "/tmp/clopen.json");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let toml = r#"
            [selection]
            max_selections = 0
        "#;
        let result = EngineConfig::parse(toml);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_overflow_policy_is_a_parse_error() {
        let toml = r#"
            [selection]
            overflow = "drop-newest"
        "#;
        let result = EngineConfig::parse(toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let toml = r#"
            [logging]
            level = "loud"
        "#;
        assert!(EngineConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_paths() {
        assert!(EngineConfig::parse("[hierarchy]\npath = \"\"\n").is_err());
        assert!(EngineConfig::parse("[state]\nclopen_path = \"\"\n").is_err());
    }

    #[test]
    fn test_roundtrip_through_toml_keeps_unbounded() {
        let config = EngineConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(!rendered.contains("max_selections"));
        let parsed = EngineConfig::parse(&rendered).unwrap();
        assert_eq!(parsed.selection.max_selections, None);
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[test_log::test(tokio::test)]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("canopy.toml");
        tokio::fs::write(&path, b"[selection]\nmax_selections = 3\n")
            .await
            .unwrap();

        let config = EngineConfig::load(&path).await.unwrap();
        assert_eq!(config.selection.max_selections, Some(3));
    }

    #[test_log::test(tokio::test)]
    async fn test_load_nonexistent_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/canopy.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test_log::test(tokio::test)]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = EngineConfig::load(&path).await;
        assert!(result.is_err());
    }

    // ── Error display ─────────────────────────────────────────────────

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
