use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::output::OutputFormat;

/// Path used when no log source is given
pub const DEFAULT_LOG_FILE: &str = "/var/log/mail.log";

/// Default minimum number of connections for an address to be reported
pub const DEFAULT_THRESHOLD: u64 = 20;

/// Log source name that stands for standard input
pub const STDIN_SOURCE: &str = "-";

/// Configuration for a scan run
///
/// Built once at startup (defaults, then an optional TOML file, then
/// command-line overrides) and passed by reference afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Input source configuration
    pub input: InputConfig,
    /// Classification and reporting limits
    pub detection: DetectionConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Input source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Log files read in order; "-" reads standard input
    pub log_files: Vec<PathBuf>,
}

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum connection count for an address to appear in the report
    pub threshold: u64,
    /// Require every extracted address to parse as `Ipv4Addr`
    pub strict_addresses: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "jsonl"
    pub format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            log_files: vec![PathBuf::from(DEFAULT_LOG_FILE)],
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            threshold: DEFAULT_THRESHOLD,
            strict_addresses: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Check that the configuration describes a runnable scan
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.log_files.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one log file must be given".to_string(),
            ));
        }

        if let Some(empty) = self.input.log_files.iter().find(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "empty log file path in {:?}",
                empty
            )));
        }

        self.output_format()?;
        Ok(())
    }

    /// Parsed output format
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.output.format.parse()
    }
}
