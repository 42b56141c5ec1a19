//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `vanguard-config.yaml` next to
//! the binary. This module defines strongly-typed structs mirroring
//! the YAML structure and provides a loader that reads and validates
//! the file. Every field has a default matching the reference
//! deployment, so a missing file or empty document yields a working
//! configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its valid range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `vanguard-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WhitelistConfig {
    /// Accrual and eligibility settings.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Decay settings.
    #[serde(default)]
    pub decay: DecayConfig,

    /// Output artifact settings.
    #[serde(default)]
    pub whitelist: OutputConfig,

    /// Connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WhitelistConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure
    /// URLs:
    /// - `DATABASE_URL` overrides `infrastructure.database_url`
    /// - `VANGUARD_HOST_URL` overrides `infrastructure.host_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML,
    /// or [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are in their valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(reason: &str) -> ConfigError {
            ConfigError::Invalid {
                reason: reason.to_owned(),
            }
        }

        if self.progress.threshold == 0 {
            return Err(invalid("progress.threshold must be positive"));
        }
        if self.progress.progress_per_hour <= 0.0 {
            return Err(invalid("progress.progress_per_hour must be positive"));
        }
        if self.progress.sample_interval_seconds == 0 {
            return Err(invalid("progress.sample_interval_seconds must be positive"));
        }
        if self.decay.decay_per_hour < 0.0 {
            return Err(invalid("decay.decay_per_hour must not be negative"));
        }
        if self.decay.interval_seconds == 0 {
            return Err(invalid("decay.interval_seconds must be positive"));
        }
        if self.decay.after_hours < 0.0 {
            return Err(invalid("decay.after_hours must not be negative"));
        }
        if self.whitelist.update_minutes == 0 {
            return Err(invalid("whitelist.update_minutes must be positive"));
        }
        if self.whitelist.group_name.is_empty() {
            return Err(invalid("whitelist.group_name must not be empty"));
        }
        Ok(())
    }
}

/// Accrual and eligibility settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressConfig {
    /// Score at or above which a player qualifies for the whitelist.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Score awarded per hour of eligible squad leadership.
    #[serde(default = "default_progress_per_hour")]
    pub progress_per_hour: f64,

    /// Fixed roster sampling cadence in seconds.
    #[serde(default = "default_sample_interval_seconds")]
    pub sample_interval_seconds: u32,

    /// Minimum members (leader included) a squad needs before its
    /// leader earns credit.
    #[serde(default = "default_min_squad_members")]
    pub min_squad_members: usize,

    /// When true, leaders of locked squads earn nothing.
    #[serde(default = "default_true")]
    pub only_open_squads: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            progress_per_hour: default_progress_per_hour(),
            sample_interval_seconds: default_sample_interval_seconds(),
            min_squad_members: default_min_squad_members(),
            only_open_squads: true,
        }
    }
}

/// Decay settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecayConfig {
    /// Score removed per hour of inactivity once decay applies.
    #[serde(default = "default_decay_per_hour")]
    pub decay_per_hour: f64,

    /// Fixed decay cadence in seconds.
    #[serde(default = "default_decay_interval_seconds")]
    pub interval_seconds: u32,

    /// Hours a player may go without accruing before decay applies.
    #[serde(default = "default_decay_after_hours")]
    pub after_hours: f64,

    /// Minimum live player count for a decay tick to run at all.
    #[serde(default = "default_min_players_for_decay")]
    pub min_players: usize,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_per_hour: default_decay_per_hour(),
            interval_seconds: default_decay_interval_seconds(),
            after_hours: default_decay_after_hours(),
            min_players: default_min_players_for_decay(),
        }
    }
}

/// Output artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Path of the group file, absolute or relative to the working
    /// directory supplied by the host.
    #[serde(default = "default_whitelist_path")]
    pub path: String,

    /// Group name written into the artifact.
    #[serde(default = "default_group_name")]
    pub group_name: String,

    /// Materialization cadence in minutes.
    #[serde(default = "default_update_minutes")]
    pub update_minutes: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_whitelist_path(),
            group_name: default_group_name(),
            update_minutes: default_update_minutes(),
        }
    }
}

/// Connection strings for the record store and the host bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Record store URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Base URL of the host bridge (roster, queries, notifications).
    #[serde(default = "default_host_url")]
    pub host_url: String,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host_url: default_host_url(),
        }
    }
}

impl InfrastructureConfig {
    /// Apply environment variable overrides for deployment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(url) = std::env::var("VANGUARD_HOST_URL") {
            self.host_url = url;
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
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

const fn default_threshold() -> u32 {
    100
}

const fn default_progress_per_hour() -> f64 {
    50.0
}

const fn default_sample_interval_seconds() -> u32 {
    30
}

const fn default_min_squad_members() -> usize {
    3
}

const fn default_decay_per_hour() -> f64 {
    1.0
}

const fn default_decay_interval_seconds() -> u32 {
    600
}

const fn default_decay_after_hours() -> f64 {
    72.0
}

const fn default_min_players_for_decay() -> usize {
    40
}

fn default_whitelist_path() -> String {
    "whitelist/vanguard-reserve.cfg".to_owned()
}

fn default_group_name() -> String {
    "VanguardReserve".to_owned()
}

const fn default_update_minutes() -> u32 {
    5
}

fn default_database_url() -> String {
    "sqlite://vanguard.db".to_owned()
}

fn default_host_url() -> String {
    "http://127.0.0.1:8210".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WhitelistConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progress.threshold, 100);
        assert!((config.progress.progress_per_hour - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.progress.sample_interval_seconds, 30);
        assert_eq!(config.decay.min_players, 40);
        assert_eq!(config.whitelist.update_minutes, 5);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
progress:
  threshold: 200
  progress_per_hour: 25.0
  sample_interval_seconds: 60
  min_squad_members: 4
  only_open_squads: false

decay:
  decay_per_hour: 0.5
  interval_seconds: 300
  after_hours: 48.0
  min_players: 20

whitelist:
  path: "cfg/reserve.cfg"
  group_name: "Reserve"
  update_minutes: 10

infrastructure:
  database_url: "sqlite://test.db"
  host_url: "http://localhost:9000"

logging:
  level: "debug"
"#;

        let config = WhitelistConfig::parse(yaml).unwrap();
        assert_eq!(config.progress.threshold, 200);
        assert!(!config.progress.only_open_squads);
        assert_eq!(config.decay.min_players, 20);
        assert_eq!(config.whitelist.path, "cfg/reserve.cfg");
        assert_eq!(config.whitelist.group_name, "Reserve");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml_uses_defaults() {
        let yaml = "progress:\n  threshold: 150\n";
        let config = WhitelistConfig::parse(yaml).unwrap();

        assert_eq!(config.progress.threshold, 150);
        assert_eq!(config.progress.sample_interval_seconds, 30);
        assert_eq!(config.decay.interval_seconds, 600);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let yaml = "progress:\n  threshold: 0\n";
        let result = WhitelistConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_sampling_interval_is_rejected() {
        let yaml = "progress:\n  sample_interval_seconds: 0\n";
        let result = WhitelistConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn empty_group_name_is_rejected() {
        let yaml = "whitelist:\n  group_name: \"\"\n";
        let result = WhitelistConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = WhitelistConfig::parse(": not yaml {");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
